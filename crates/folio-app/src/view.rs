// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::filter::{FilterState, filter_records};
use crate::pagination::{PageMarker, page_slice, pagination_range, total_pages};
use crate::{PageSize, Record, SortColumn, SortDirection, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: PageSize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: PageSize::default(),
        }
    }
}

/// Everything the table and the pagination bar need for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<'a> {
    pub rows: Vec<&'a Record>,
    pub total_records: usize,
    pub matching_records: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: PageSize,
    pub pagination: Vec<PageMarker>,
    /// 1-indexed position of the first visible row within the matches.
    pub first_row: usize,
    pub last_row: usize,
}

impl ViewModel<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub fn derive_view<'a>(
    records: &'a [Record],
    filters: &FilterState,
    sort: Option<SortSpec>,
    page: PageState,
) -> ViewModel<'a> {
    let mut matches = filter_records(records, filters);
    if let Some(sort) = sort {
        sort_records(&mut matches, sort);
    }

    let size = page.page_size.get();
    let pages = total_pages(matches.len(), size);
    let rows = page_slice(&matches, page.current_page, size).to_vec();
    let first_row = if rows.is_empty() {
        0
    } else {
        page.current_page.saturating_sub(1) * size + 1
    };
    let last_row = if rows.is_empty() {
        0
    } else {
        first_row + rows.len() - 1
    };

    ViewModel {
        total_records: records.len(),
        matching_records: matches.len(),
        current_page: page.current_page,
        total_pages: pages,
        page_size: page.page_size,
        pagination: pagination_range(page.current_page, pages),
        first_row,
        last_row,
        rows,
    }
}

/// Stable sort; rows missing the sort value stay at the bottom in both directions.
pub fn sort_records(records: &mut [&Record], sort: SortSpec) {
    records.sort_by(
        |left, right| match (sort_key(left, sort.column), sort_key(right, sort.column)) {
            (Some(left), Some(right)) => {
                let ordering = left.compare(&right);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    );
}

enum SortKey {
    Text(String),
    Number(f64),
    Rank(usize),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Rank(left), Self::Rank(right)) => left.cmp(right),
            _ => Ordering::Equal,
        }
    }
}

fn sort_key(record: &Record, column: SortColumn) -> Option<SortKey> {
    match column {
        SortColumn::MemberName => record
            .member_name
            .as_deref()
            .map(|value| SortKey::Text(value.to_lowercase())),
        SortColumn::Username => record
            .username
            .as_deref()
            .map(|value| SortKey::Text(value.to_lowercase())),
        SortColumn::Location => record
            .location
            .as_deref()
            .map(|value| SortKey::Text(value.to_lowercase())),
        SortColumn::PortfolioCount => record
            .portfolio_count
            .map(|value| SortKey::Number(value as f64)),
        SortColumn::Size => record
            .size_kb
            .filter(|value| !value.is_nan())
            .map(SortKey::Number),
        SortColumn::IdVerification => record
            .id_verification
            .map(|value| SortKey::Rank(value as usize)),
        SortColumn::PortfolioVerification => record
            .portfolio_verification
            .map(|value| SortKey::Rank(value as usize)),
        SortColumn::Subscription => record
            .subscription
            .map(|value| SortKey::Rank(value as usize)),
    }
}
