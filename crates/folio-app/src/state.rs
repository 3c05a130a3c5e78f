// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::filter::{FilterState, toggle_member};
use crate::view::{PageState, ViewModel, derive_view};
use crate::{
    PageSize, PortfolioCountFilter, PortfolioType, Record, SortColumn, SortSpec,
    SubscriptionTier, VerificationStatus,
};

/// Location quick picks offered next to the location search box.
pub const LOCATION_PRESETS: [&str; 4] = ["United States", "India", "Canada", "Japan"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub load: LoadState,
    pub records: Vec<Record>,
    pub filters: FilterState,
    pub sort: Option<SortSpec>,
    pub page: PageState,
    pub filters_visible: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            load: LoadState::Loading,
            records: Vec::new(),
            filters: FilterState::default(),
            sort: None,
            page: PageState::default(),
            filters_visible: true,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    RecordsLoaded(Vec<Record>),
    FetchFailed(String),
    SetQuery(String),
    SetLocationQuery(String),
    ToggleLocationPreset(String),
    TogglePortfolioType(PortfolioType),
    TogglePortfolioVerification(VerificationStatus),
    ToggleIdVerification(VerificationStatus),
    ToggleSubscription(SubscriptionTier),
    SelectPortfolioCount(PortfolioCountFilter),
    SetMaxSizeKb(u32),
    ClearFilters,
    GoToPage(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SetPageSize(PageSize),
    CyclePageSize,
    CycleSortColumn,
    FlipSortDirection,
    ToggleFilterPanel,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RecordsLoaded(usize),
    FetchFailed(String),
    FiltersChanged,
    PageChanged(usize),
    PageSizeChanged(PageSize),
    SortChanged(Option<SortSpec>),
    FilterPanelToggled(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            page: PageState {
                current_page: 1,
                page_size,
            },
            ..Self::default()
        }
    }

    pub fn view(&self) -> ViewModel<'_> {
        derive_view(&self.records, &self.filters, self.sort, self.page)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::RecordsLoaded(records) => {
                if self.load != LoadState::Loading {
                    warn!("ignoring fetch result outside the loading state");
                    return Vec::new();
                }
                let count = records.len();
                self.records = records;
                self.load = LoadState::Ready;
                self.page.current_page = 1;
                info!(count, "records loaded");
                vec![AppEvent::RecordsLoaded(count)]
            }
            AppCommand::FetchFailed(message) => {
                if self.load != LoadState::Loading {
                    warn!("ignoring fetch failure outside the loading state");
                    return Vec::new();
                }
                warn!(%message, "record fetch failed");
                self.load = LoadState::Failed(message.clone());
                vec![AppEvent::FetchFailed(message)]
            }
            AppCommand::SetQuery(query) => {
                if self.filters.query == query {
                    return Vec::new();
                }
                self.filters.query = query;
                self.filters_changed()
            }
            AppCommand::SetLocationQuery(query) => {
                if self.filters.location_query == query {
                    return Vec::new();
                }
                self.filters.location_query = query;
                self.filters_changed()
            }
            AppCommand::ToggleLocationPreset(preset) => {
                if self.filters.location_query.contains(preset.as_str()) {
                    self.filters.location_query.clear();
                } else {
                    self.filters.location_query = preset;
                }
                self.filters_changed()
            }
            AppCommand::TogglePortfolioType(value) => {
                toggle_member(&mut self.filters.portfolio_types, value);
                self.filters_changed()
            }
            AppCommand::TogglePortfolioVerification(value) => {
                toggle_member(&mut self.filters.portfolio_verification, value);
                self.filters_changed()
            }
            AppCommand::ToggleIdVerification(value) => {
                toggle_member(&mut self.filters.id_verification, value);
                self.filters_changed()
            }
            AppCommand::ToggleSubscription(value) => {
                toggle_member(&mut self.filters.subscriptions, value);
                self.filters_changed()
            }
            AppCommand::SelectPortfolioCount(value) => {
                self.filters.portfolio_count = if self.filters.portfolio_count == Some(value) {
                    None
                } else {
                    Some(value)
                };
                self.filters_changed()
            }
            AppCommand::SetMaxSizeKb(value) => {
                let value = value.min(crate::filter::MAX_SIZE_KB);
                if self.filters.max_size_kb == value {
                    return Vec::new();
                }
                self.filters.max_size_kb = value;
                self.filters_changed()
            }
            AppCommand::ClearFilters => {
                self.filters = FilterState::default();
                let mut events = self.filters_changed();
                events.push(self.set_status("filters cleared"));
                events
            }
            AppCommand::GoToPage(page) => self.go_to_page(page),
            AppCommand::NextPage => self.go_to_page(self.page.current_page.saturating_add(1)),
            AppCommand::PrevPage => self.go_to_page(self.page.current_page.saturating_sub(1)),
            AppCommand::FirstPage => self.go_to_page(1),
            AppCommand::LastPage => {
                let last = self.view().total_pages;
                self.go_to_page(last)
            }
            AppCommand::SetPageSize(page_size) => self.set_page_size(page_size),
            AppCommand::CyclePageSize => self.set_page_size(self.page.page_size.next()),
            AppCommand::CycleSortColumn => {
                self.sort = match self.sort {
                    None => Some(SortSpec {
                        column: SortColumn::ALL[0],
                        direction: Default::default(),
                    }),
                    Some(current) => SortColumn::ALL
                        .iter()
                        .position(|column| *column == current.column)
                        .and_then(|index| SortColumn::ALL.get(index + 1))
                        .map(|column| SortSpec {
                            column: *column,
                            direction: current.direction,
                        }),
                };
                self.page.current_page = 1;
                vec![AppEvent::SortChanged(self.sort)]
            }
            AppCommand::FlipSortDirection => {
                let Some(current) = self.sort else {
                    return vec![self.set_status("no sort column; press s first")];
                };
                self.sort = Some(SortSpec {
                    direction: current.direction.flipped(),
                    ..current
                });
                self.page.current_page = 1;
                vec![AppEvent::SortChanged(self.sort)]
            }
            AppCommand::ToggleFilterPanel => {
                self.filters_visible = !self.filters_visible;
                vec![AppEvent::FilterPanelToggled(self.filters_visible)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn filters_changed(&mut self) -> Vec<AppEvent> {
        self.page.current_page = 1;
        debug!(active = self.filters.active_count(), "filters changed");
        vec![AppEvent::FiltersChanged]
    }

    fn go_to_page(&mut self, page: usize) -> Vec<AppEvent> {
        let total = self.view().total_pages;
        if page < 1 || page > total || page == self.page.current_page {
            return Vec::new();
        }
        self.page.current_page = page;
        debug!(page, total, "page changed");
        vec![AppEvent::PageChanged(page)]
    }

    fn set_page_size(&mut self, page_size: PageSize) -> Vec<AppEvent> {
        self.page = PageState {
            current_page: 1,
            page_size,
        };
        vec![AppEvent::PageSizeChanged(page_size)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, LoadState};
    use crate::{
        PageSize, PortfolioCountFilter, Record, SortColumn, SortDirection, SortSpec,
        SubscriptionTier,
    };

    fn records(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|index| {
                let mut record = Record::new(format!("r{index}"));
                record.member_name = Some(format!("Member {index}"));
                record.subscription = Some(if index % 2 == 0 {
                    SubscriptionTier::Premium
                } else {
                    SubscriptionTier::Basic
                });
                record.portfolio_count = Some((index % 5) as i64);
                record.size_kb = Some(100.0 * index as f64);
                record
            })
            .collect()
    }

    fn loaded(count: usize) -> AppState {
        let mut state = AppState::default();
        state.dispatch(AppCommand::RecordsLoaded(records(count)));
        state
    }

    #[test]
    fn starts_loading_then_becomes_ready() {
        let mut state = AppState::default();
        assert_eq!(state.load, LoadState::Loading);

        let events = state.dispatch(AppCommand::RecordsLoaded(records(3)));
        assert_eq!(events, vec![AppEvent::RecordsLoaded(3)]);
        assert_eq!(state.load, LoadState::Ready);
        assert_eq!(state.records.len(), 3);
    }

    #[test]
    fn fetch_failure_replaces_loading_with_error() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::FetchFailed("boom".to_owned()));
        assert_eq!(events, vec![AppEvent::FetchFailed("boom".to_owned())]);
        assert_eq!(state.load, LoadState::Failed("boom".to_owned()));
        assert!(state.records.is_empty());
    }

    #[test]
    fn fetch_outcomes_are_accepted_only_once() {
        let mut state = loaded(2);
        assert!(
            state
                .dispatch(AppCommand::FetchFailed("late".to_owned()))
                .is_empty()
        );
        assert!(
            state
                .dispatch(AppCommand::RecordsLoaded(records(9)))
                .is_empty()
        );
        assert_eq!(state.load, LoadState::Ready);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn go_to_page_ignores_out_of_range_targets() {
        let mut state = loaded(25);
        assert_eq!(state.view().total_pages, 3);

        assert!(state.dispatch(AppCommand::GoToPage(0)).is_empty());
        assert!(state.dispatch(AppCommand::GoToPage(4)).is_empty());
        assert_eq!(state.page.current_page, 1);

        assert_eq!(
            state.dispatch(AppCommand::GoToPage(3)),
            vec![AppEvent::PageChanged(3)]
        );
        assert!(state.dispatch(AppCommand::NextPage).is_empty());
        assert_eq!(state.page.current_page, 3);

        state.dispatch(AppCommand::PrevPage);
        assert_eq!(state.page.current_page, 2);
        state.dispatch(AppCommand::FirstPage);
        assert_eq!(state.page.current_page, 1);
        assert!(state.dispatch(AppCommand::PrevPage).is_empty());
        state.dispatch(AppCommand::LastPage);
        assert_eq!(state.page.current_page, 3);
    }

    #[test]
    fn navigation_is_a_no_op_without_results() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::GoToPage(1)).is_empty());
        assert!(state.dispatch(AppCommand::LastPage).is_empty());
        assert_eq!(state.page.current_page, 1);
    }

    #[test]
    fn filter_changes_reset_to_first_page() {
        let mut state = loaded(40);
        state.dispatch(AppCommand::GoToPage(2));
        assert_eq!(state.page.current_page, 2);

        // Still plenty of matches for page 2, but the page resets anyway.
        state.dispatch(AppCommand::ToggleSubscription(SubscriptionTier::Premium));
        assert_eq!(state.page.current_page, 1);
        assert_eq!(state.view().matching_records, 20);

        state.dispatch(AppCommand::GoToPage(2));
        state.dispatch(AppCommand::SetQuery("member".to_owned()));
        assert_eq!(state.page.current_page, 1);

        state.dispatch(AppCommand::GoToPage(2));
        state.dispatch(AppCommand::SetMaxSizeKb(3_000));
        assert_eq!(state.page.current_page, 1);
    }

    #[test]
    fn unchanged_text_filters_do_not_emit_events() {
        let mut state = loaded(3);
        assert_eq!(
            state.dispatch(AppCommand::SetQuery("x".to_owned())),
            vec![AppEvent::FiltersChanged]
        );
        assert!(state.dispatch(AppCommand::SetQuery("x".to_owned())).is_empty());
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut state = loaded(30);
        state.dispatch(AppCommand::GoToPage(3));
        let events = state.dispatch(AppCommand::SetPageSize(PageSize::Five));
        assert_eq!(events, vec![AppEvent::PageSizeChanged(PageSize::Five)]);
        assert_eq!(state.page.current_page, 1);
        assert_eq!(state.view().total_pages, 6);

        state.dispatch(AppCommand::CyclePageSize);
        assert_eq!(state.page.page_size, PageSize::Ten);
    }

    #[test]
    fn portfolio_count_selection_toggles_off() {
        let mut state = loaded(10);
        state.dispatch(AppCommand::SelectPortfolioCount(
            PortfolioCountFilter::AtLeast(4),
        ));
        assert_eq!(
            state.filters.portfolio_count,
            Some(PortfolioCountFilter::AtLeast(4))
        );
        assert_eq!(state.view().matching_records, 2);

        state.dispatch(AppCommand::SelectPortfolioCount(
            PortfolioCountFilter::Exactly(1),
        ));
        assert_eq!(
            state.filters.portfolio_count,
            Some(PortfolioCountFilter::Exactly(1))
        );

        state.dispatch(AppCommand::SelectPortfolioCount(
            PortfolioCountFilter::Exactly(1),
        ));
        assert_eq!(state.filters.portfolio_count, None);
    }

    #[test]
    fn location_preset_sets_and_clears_the_location_query() {
        let mut state = loaded(1);
        state.dispatch(AppCommand::ToggleLocationPreset("India".to_owned()));
        assert_eq!(state.filters.location_query, "India");

        state.dispatch(AppCommand::ToggleLocationPreset("Canada".to_owned()));
        assert_eq!(state.filters.location_query, "Canada");

        state.dispatch(AppCommand::ToggleLocationPreset("Canada".to_owned()));
        assert!(state.filters.location_query.is_empty());
    }

    #[test]
    fn size_threshold_is_capped_at_the_slider_maximum() {
        let mut state = loaded(1);
        assert!(state.dispatch(AppCommand::SetMaxSizeKb(90_000)).is_empty());
        assert_eq!(state.filters.max_size_kb, 50_000);
    }

    #[test]
    fn sort_cycles_through_columns_then_off() {
        let mut state = loaded(3);
        state.dispatch(AppCommand::CycleSortColumn);
        assert_eq!(
            state.sort,
            Some(SortSpec {
                column: SortColumn::MemberName,
                direction: SortDirection::Asc,
            })
        );

        state.dispatch(AppCommand::FlipSortDirection);
        assert_eq!(
            state.sort.map(|sort| sort.direction),
            Some(SortDirection::Desc)
        );

        for _ in 1..SortColumn::ALL.len() {
            state.dispatch(AppCommand::CycleSortColumn);
        }
        assert_eq!(
            state.sort.map(|sort| sort.column),
            Some(SortColumn::Subscription)
        );
        state.dispatch(AppCommand::CycleSortColumn);
        assert_eq!(state.sort, None);
    }

    #[test]
    fn flip_without_sort_sets_status() {
        let mut state = loaded(3);
        let events = state.dispatch(AppCommand::FlipSortDirection);
        assert!(matches!(events.as_slice(), [AppEvent::StatusUpdated(_)]));
        assert_eq!(state.sort, None);
    }

    #[test]
    fn clear_filters_restores_defaults() {
        let mut state = loaded(5);
        state.dispatch(AppCommand::SetQuery("member".to_owned()));
        state.dispatch(AppCommand::SetMaxSizeKb(10));
        state.dispatch(AppCommand::ClearFilters);
        assert_eq!(state.filters, crate::FilterState::default());
        assert_eq!(state.status_line.as_deref(), Some("filters cleared"));
    }

    #[test]
    fn filter_panel_toggles() {
        let mut state = AppState::default();
        assert!(state.filters_visible);
        assert_eq!(
            state.dispatch(AppCommand::ToggleFilterPanel),
            vec![AppEvent::FilterPanelToggled(false)]
        );
        assert!(!state.filters_visible);
    }
}
