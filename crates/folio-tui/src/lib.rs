// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use folio_app::{
    AppCommand, AppEvent, AppState, LOCATION_PRESETS, LoadState, MAX_SIZE_KB, PageMarker,
    PortfolioCountFilter, PortfolioType, Record, SortColumn, SortDirection, SubscriptionTier,
    VerificationStatus, ViewModel,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info};

const TITLE: &str = "Portfolio Database";
const EMPTY_RESULTS: &str = "No users found matching your criteria.";
const ROW_MENU: &str = "⋮";
const SIZE_STEP_KB: u32 = 1_000;
const SIZE_JUMP_KB: u32 = 10_000;
const SLIDER_WIDTH: usize = 10;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Where records come from. The default `spawn_fetch` runs inline; real
/// runtimes move the fetch onto a worker thread.
pub trait RecordSource {
    fn fetch_records(&mut self) -> Result<Vec<Record>>;

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self.fetch_records().map_err(|error| error.to_string());
        tx.send(InternalEvent::FetchFinished(outcome))
            .map_err(|_| anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    FetchFinished(std::result::Result<Vec<Record>, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Table,
    Filters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Search,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputState {
    target: InputTarget,
    /// Value to restore when the edit is abandoned with Esc.
    original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOption {
    PortfolioType(PortfolioType),
    PortfolioVerification(VerificationStatus),
    IdVerification(VerificationStatus),
    PortfolioCount(PortfolioCountFilter),
    MaxSize,
    LocationPreset(&'static str),
    Subscription(SubscriptionTier),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: Focus,
    selected_row: usize,
    filter_cursor: usize,
    input: Option<InputState>,
    status_token: u64,
}

pub fn run_app<R: RecordSource>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    info!("terminal front end started");
    if let Err(error) = runtime.spawn_fetch(internal_tx.clone()) {
        state.dispatch(AppCommand::FetchFailed(format!(
            "Error fetching data: {error}"
        )));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(false) => {}
            Ok(true) => match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            },
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::FetchFinished(Ok(records)) => {
                let events = state.dispatch(AppCommand::RecordsLoaded(records));
                if let Some(AppEvent::RecordsLoaded(count)) = events.first() {
                    let message = loaded_status(*count, OffsetDateTime::now_utc());
                    emit_status(state, view_data, tx, message);
                }
                sync_selection(state, view_data);
            }
            InternalEvent::FetchFinished(Err(message)) => {
                state.dispatch(AppCommand::FetchFailed(message));
            }
        }
    }
}

fn loaded_status(count: usize, at: OffsetDateTime) -> String {
    let clock = at
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default();
    let noun = if count == 1 { "record" } else { "records" };
    format!("loaded {count} {noun} at {clock} UTC")
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Runs one command and arms the status timer for any status it produced.
fn apply(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    sync_selection(state, view_data);
    events
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    apply(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

fn sync_selection(state: &AppState, view_data: &mut ViewData) {
    let visible = state.view().rows.len();
    view_data.selected_row = view_data.selected_row.min(visible.saturating_sub(1));
    if !state.filters_visible {
        view_data.focus = Focus::Table;
    }
}

/// Returns true when the app should exit.
fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.input.is_some() {
        handle_input_key(state, view_data, internal_tx, key);
        return false;
    }

    if state.load != LoadState::Ready {
        return matches!(key.code, KeyCode::Char('q') | KeyCode::Esc);
    }

    if view_data.focus == Focus::Filters && handle_filter_key(state, view_data, internal_tx, key)
    {
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => begin_input(state, view_data, InputTarget::Search),
        KeyCode::Char('L') => begin_input(state, view_data, InputTarget::Location),
        KeyCode::Char('f') => {
            let events = apply(state, view_data, internal_tx, AppCommand::ToggleFilterPanel);
            if let Some(AppEvent::FilterPanelToggled(visible)) = events.first() {
                let message = if *visible {
                    "filters shown"
                } else {
                    "filters hidden"
                };
                emit_status(state, view_data, internal_tx, message);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => {
            if !state.filters_visible {
                emit_status(state, view_data, internal_tx, "filters hidden; press f");
            } else {
                view_data.focus = match view_data.focus {
                    Focus::Table => Focus::Filters,
                    Focus::Filters => Focus::Table,
                };
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let visible = state.view().rows.len();
            if view_data.selected_row + 1 < visible {
                view_data.selected_row += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('[') | KeyCode::Left => {
            apply(state, view_data, internal_tx, AppCommand::PrevPage);
        }
        KeyCode::Char(']') | KeyCode::Right => {
            apply(state, view_data, internal_tx, AppCommand::NextPage);
        }
        KeyCode::Char('g') => {
            apply(state, view_data, internal_tx, AppCommand::FirstPage);
        }
        KeyCode::Char('G') => {
            apply(state, view_data, internal_tx, AppCommand::LastPage);
        }
        KeyCode::Char('p') => {
            apply(state, view_data, internal_tx, AppCommand::CyclePageSize);
            let message = format!("{} per page", state.page.page_size.get());
            emit_status(state, view_data, internal_tx, message);
        }
        KeyCode::Char('s') => {
            apply(state, view_data, internal_tx, AppCommand::CycleSortColumn);
            emit_status(state, view_data, internal_tx, sort_status(state));
        }
        KeyCode::Char('S') => {
            let events = apply(state, view_data, internal_tx, AppCommand::FlipSortDirection);
            if matches!(events.first(), Some(AppEvent::SortChanged(_))) {
                emit_status(state, view_data, internal_tx, sort_status(state));
            }
        }
        KeyCode::Char('x') => {
            apply(state, view_data, internal_tx, AppCommand::ClearFilters);
        }
        _ => {}
    }
    false
}

fn sort_status(state: &AppState) -> String {
    match state.sort {
        Some(sort) => format!(
            "sorted by {} {}",
            sort.column.label(),
            direction_label(sort.direction)
        ),
        None => "sort cleared".to_owned(),
    }
}

fn direction_label(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    }
}

fn begin_input(state: &AppState, view_data: &mut ViewData, target: InputTarget) {
    let original = match target {
        InputTarget::Search => state.filters.query.clone(),
        InputTarget::Location => state.filters.location_query.clone(),
    };
    debug!(?target, "editing text filter");
    view_data.input = Some(InputState { target, original });
}

fn handle_input_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(input) = view_data.input.clone() else {
        return;
    };
    let current = match input.target {
        InputTarget::Search => state.filters.query.clone(),
        InputTarget::Location => state.filters.location_query.clone(),
    };

    let next = match key.code {
        KeyCode::Enter => {
            view_data.input = None;
            return;
        }
        KeyCode::Esc => {
            view_data.input = None;
            input.original
        }
        KeyCode::Backspace => {
            let mut text = current;
            text.pop();
            text
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => String::new(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut text = current;
            text.push(ch);
            text
        }
        _ => return,
    };

    let command = match input.target {
        InputTarget::Search => AppCommand::SetQuery(next),
        InputTarget::Location => AppCommand::SetLocationQuery(next),
    };
    apply(state, view_data, internal_tx, command);
}

fn filter_options() -> Vec<FilterOption> {
    let mut options = Vec::new();
    options.extend(PortfolioType::ALL.map(FilterOption::PortfolioType));
    options.extend(VerificationStatus::ALL.map(FilterOption::PortfolioVerification));
    options.extend(VerificationStatus::ALL.map(FilterOption::IdVerification));
    options.extend(PortfolioCountFilter::OPTIONS.map(FilterOption::PortfolioCount));
    options.push(FilterOption::MaxSize);
    options.extend(LOCATION_PRESETS.map(FilterOption::LocationPreset));
    options.extend(SubscriptionTier::ALL.map(FilterOption::Subscription));
    options
}

fn focused_option(view_data: &ViewData) -> Option<FilterOption> {
    filter_options().get(view_data.filter_cursor).copied()
}

/// Keys that mean something different while the filter panel has focus.
/// Returns false to fall through to the global bindings.
fn handle_filter_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let option_count = filter_options().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.filter_cursor + 1 < option_count {
                view_data.filter_cursor += 1;
            }
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.filter_cursor = view_data.filter_cursor.saturating_sub(1);
            true
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            match focused_option(view_data).and_then(toggle_command) {
                Some(command) => {
                    apply(state, view_data, internal_tx, command);
                }
                None => emit_status(state, view_data, internal_tx, "use h/l to adjust size"),
            }
            true
        }
        KeyCode::Char(ch @ ('h' | 'l' | 'H' | 'L'))
            if focused_option(view_data) == Some(FilterOption::MaxSize) =>
        {
            let step = if ch.is_ascii_uppercase() {
                SIZE_JUMP_KB
            } else {
                SIZE_STEP_KB
            };
            let current = state.filters.max_size_kb;
            let next = if ch.eq_ignore_ascii_case(&'l') {
                current.saturating_add(step).min(MAX_SIZE_KB)
            } else {
                current.saturating_sub(step)
            };
            apply(state, view_data, internal_tx, AppCommand::SetMaxSizeKb(next));
            true
        }
        _ => false,
    }
}

fn toggle_command(option: FilterOption) -> Option<AppCommand> {
    Some(match option {
        FilterOption::PortfolioType(value) => AppCommand::TogglePortfolioType(value),
        FilterOption::PortfolioVerification(value) => {
            AppCommand::TogglePortfolioVerification(value)
        }
        FilterOption::IdVerification(value) => AppCommand::ToggleIdVerification(value),
        FilterOption::PortfolioCount(value) => AppCommand::SelectPortfolioCount(value),
        FilterOption::MaxSize => return None,
        FilterOption::LocationPreset(preset) => {
            AppCommand::ToggleLocationPreset(preset.to_owned())
        }
        FilterOption::Subscription(value) => AppCommand::ToggleSubscription(value),
    })
}

fn option_checked(state: &AppState, option: FilterOption) -> bool {
    let filters = &state.filters;
    match option {
        FilterOption::PortfolioType(value) => filters.portfolio_types.contains(&value),
        FilterOption::PortfolioVerification(value) => {
            filters.portfolio_verification.contains(&value)
        }
        FilterOption::IdVerification(value) => filters.id_verification.contains(&value),
        FilterOption::PortfolioCount(value) => filters.portfolio_count == Some(value),
        FilterOption::MaxSize => filters.max_size_kb < MAX_SIZE_KB,
        FilterOption::LocationPreset(preset) => filters.location_query.contains(preset),
        FilterOption::Subscription(value) => filters.subscriptions.contains(&value),
    }
}

fn option_label(state: &AppState, option: FilterOption) -> String {
    let checked = option_checked(state, option);
    let mark = match option {
        FilterOption::PortfolioCount(_) if checked => "(•)",
        FilterOption::PortfolioCount(_) => "( )",
        FilterOption::MaxSize => "",
        _ if checked => "[x]",
        _ => "[ ]",
    };
    match option {
        FilterOption::PortfolioType(value) => format!("{mark} {}", value.as_str()),
        FilterOption::PortfolioVerification(value) | FilterOption::IdVerification(value) => {
            format!("{mark} {}", value.as_str())
        }
        FilterOption::PortfolioCount(value) => format!("{mark} {}", value.label()),
        FilterOption::MaxSize => size_slider(state.filters.max_size_kb),
        FilterOption::LocationPreset(preset) => format!("{mark} {preset}"),
        FilterOption::Subscription(value) => format!("{mark} {}", value.as_str()),
    }
}

fn size_slider(max_size_kb: u32) -> String {
    let filled = (max_size_kb as usize * SLIDER_WIDTH).div_ceil(MAX_SIZE_KB as usize);
    let filled = filled.min(SLIDER_WIDTH);
    format!(
        "[{}{}] ≤ {max_size_kb} KB",
        "█".repeat(filled),
        "░".repeat(SLIDER_WIDTH - filled)
    )
}

/// One panel line: text, whether it is a heading, whether the cursor is on it.
type PanelLine = (String, bool, bool);

fn option_group(option: FilterOption) -> (usize, &'static str) {
    match option {
        FilterOption::PortfolioType(_) => (0, "Portfolio Type"),
        FilterOption::PortfolioVerification(_) => (1, "Portfolio Verification"),
        FilterOption::IdVerification(_) => (1, "ID Verification"),
        FilterOption::PortfolioCount(_) => (1, "Number of Portfolios"),
        FilterOption::MaxSize => (2, "Size"),
        FilterOption::LocationPreset(_) => (2, "Location"),
        FilterOption::Subscription(_) => (3, "Subscription"),
    }
}

fn filter_panel_columns(state: &AppState, view_data: &ViewData) -> [Vec<PanelLine>; 4] {
    let focused = (view_data.focus == Focus::Filters).then_some(view_data.filter_cursor);
    let mut columns: [Vec<PanelLine>; 4] = Default::default();
    let mut previous_group = "";

    for (index, option) in filter_options().into_iter().enumerate() {
        let (column, group) = option_group(option);
        if group != previous_group {
            let heading = match option {
                FilterOption::LocationPreset(_) => {
                    format!("{group}: {}", state.filters.location_query)
                }
                _ => group.to_owned(),
            };
            columns[column].push((heading, true, false));
            previous_group = group;
        }
        columns[column].push((
            option_label(state, option),
            false,
            focused == Some(index),
        ));
    }
    columns
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state, view_data))
        .block(Block::default().title(TITLE).borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    match &state.load {
        LoadState::Loading => {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(loading, layout[1]);
        }
        LoadState::Failed(message) => {
            let failed = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("error"));
            frame.render_widget(failed, layout[1]);
        }
        LoadState::Ready => render_ready(frame, layout[1], state, view_data),
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout[2]);
}

fn render_ready(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let view = state.view();
    let columns = filter_panel_columns(state, view_data);
    let panel_height = if state.filters_visible {
        columns.iter().map(Vec::len).max().unwrap_or_default() as u16 + 2
    } else {
        0
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(panel_height),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    if state.filters_visible {
        render_filter_panel(frame, layout[0], columns, view_data);
    }
    render_table(frame, layout[1], state, &view, view_data);

    let pagination = Paragraph::new(Line::from(pagination_spans(&view)))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(pagination, layout[2]);
}

fn render_filter_panel(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    columns: [Vec<PanelLine>; 4],
    view_data: &ViewData,
) {
    let border_style = if view_data.focus == Focus::Filters {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title("filters")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);
    for (column, cell) in columns.into_iter().zip(cells.iter()) {
        let lines = column
            .into_iter()
            .map(|(text, heading, focused)| {
                let mut style = Style::default();
                if heading {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if focused {
                    style = style.fg(Color::Black).bg(Color::Cyan);
                }
                Line::from(Span::styled(text, style))
            })
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), *cell);
    }
}

const TABLE_HEADERS: [&str; 9] = [
    "Member Name",
    "Username",
    "No. of Portfolios",
    "ID Verification",
    "Portfolio Verification",
    "Location",
    "Size",
    "Subscription",
    "",
];

fn header_label(index: usize, state: &AppState) -> String {
    let label = TABLE_HEADERS[index];
    let Some(sort) = state.sort else {
        return label.to_owned();
    };
    let sorted_index = match sort.column {
        SortColumn::MemberName => 0,
        SortColumn::Username => 1,
        SortColumn::PortfolioCount => 2,
        SortColumn::IdVerification => 3,
        SortColumn::PortfolioVerification => 4,
        SortColumn::Location => 5,
        SortColumn::Size => 6,
        SortColumn::Subscription => 7,
    };
    if sorted_index != index {
        return label.to_owned();
    }
    let arrow = match sort.direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    };
    format!("{label} {arrow}")
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &ViewModel<'_>,
    view_data: &ViewData,
) {
    let widths = [
        Constraint::Percentage(18),
        Constraint::Percentage(12),
        Constraint::Percentage(8),
        Constraint::Percentage(12),
        Constraint::Percentage(12),
        Constraint::Percentage(16),
        Constraint::Percentage(9),
        Constraint::Percentage(10),
        Constraint::Length(1),
    ];
    let header = Row::new((0..TABLE_HEADERS.len()).map(|index| {
        Cell::from(header_label(index, state)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let block = Block::default()
        .title(format!("members ({})", view.matching_records))
        .borders(Borders::ALL);

    if view.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        frame.render_widget(Table::new(Vec::<Row>::new(), widths).header(header), sections[0]);
        let placeholder = Paragraph::new(EMPTY_RESULTS)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, sections[1]);
        return;
    }

    let rows = view.rows.iter().enumerate().map(|(index, record)| {
        let row = Row::new(record_cells(record));
        if view_data.focus == Focus::Table && index == view_data.selected_row {
            row.style(Style::default().bg(Color::DarkGray))
        } else {
            row
        }
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn record_cells(record: &Record) -> Vec<Cell<'static>> {
    let name = format!(
        "({}) {}",
        record.avatar_initial(),
        record.member_name.as_deref().unwrap_or_default()
    );
    vec![
        Cell::from(name),
        Cell::from(record.username.clone().unwrap_or_default()),
        Cell::from(
            record
                .portfolio_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
        ),
        badge_cell(record.id_verification),
        badge_cell(record.portfolio_verification),
        Cell::from(record.location.clone().unwrap_or_default()),
        Cell::from(record.size_label()),
        Cell::from(
            record
                .subscription
                .map(|tier| tier.as_str().to_owned())
                .unwrap_or_default(),
        ),
        Cell::from(ROW_MENU).style(Style::default().fg(Color::DarkGray)),
    ]
}

fn badge_cell(status: Option<VerificationStatus>) -> Cell<'static> {
    let text = status.map(VerificationStatus::as_str).unwrap_or("-");
    Cell::from(text).style(Style::default().fg(badge_color(status)))
}

fn badge_color(status: Option<VerificationStatus>) -> Color {
    match status {
        Some(VerificationStatus::Verified) => Color::Green,
        Some(VerificationStatus::InProgress) => Color::Yellow,
        Some(VerificationStatus::NotVerified) => Color::Red,
        None => Color::DarkGray,
    }
}

fn pagination_spans(view: &ViewModel<'_>) -> Vec<Span<'static>> {
    let enabled = Style::default();
    let disabled = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(
        "‹ prev ",
        if view.has_prev() { enabled } else { disabled },
    )];
    for marker in &view.pagination {
        match marker {
            PageMarker::Page(page) if *page == view.current_page => spans.push(Span::styled(
                format!("[{page}] "),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            PageMarker::Page(page) => spans.push(Span::raw(format!("{page} "))),
            PageMarker::Ellipsis => spans.push(Span::styled("... ", disabled)),
        }
    }
    spans.push(Span::styled(
        "next ›",
        if view.has_next() { enabled } else { disabled },
    ));
    spans.push(Span::raw(format!(
        "   per page: {}   showing {}-{} of {}",
        view.page_size.get(),
        view.first_row,
        view.last_row,
        view.matching_records
    )));
    spans
}

fn header_text(state: &AppState, view_data: &ViewData) -> String {
    let editing_search = matches!(
        view_data.input,
        Some(InputState {
            target: InputTarget::Search,
            ..
        })
    );
    let cursor = if editing_search { "▏" } else { "" };
    let query = &state.filters.query;
    let search = if query.is_empty() && !editing_search {
        "search: press / to search".to_owned()
    } else {
        format!("search: {query}{cursor}")
    };
    if state.load != LoadState::Ready {
        return search;
    }
    let view = state.view();
    format!(
        "{search}   {} of {} members",
        view.matching_records, view.total_records
    )
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = match (&view_data.input, view_data.focus) {
        (Some(input), _) => {
            let mode = match input.target {
                InputTarget::Search => "SEARCH",
                InputTarget::Location => "LOCATION",
            };
            (mode, "type to filter | enter keep | esc revert | ctrl+u clear")
        }
        (None, Focus::Filters) => (
            "FILTERS",
            "j/k move | space toggle | h/l H/L size | tab table | x clear | q",
        ),
        (None, Focus::Table) => (
            "TABLE",
            "/ search | L location | f filters | tab panel | [ ] g G pages | p size | s/S sort | q",
        ),
    };
    let mode = match &state.load {
        LoadState::Loading => "LOADING",
        LoadState::Failed(_) => "ERROR",
        LoadState::Ready => mode,
    };
    let hints = if state.load == LoadState::Ready {
        hints
    } else {
        "q quit"
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EMPTY_RESULTS, Focus, InputTarget, InternalEvent, RecordSource, ViewData,
        filter_options, filter_panel_columns, handle_key_event, header_label, loaded_status,
        pagination_spans, process_internal_events, render, size_slider, status_text,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use folio_app::{
        AppState, LoadState, MAX_SIZE_KB, PageSize, PortfolioType, Record, SortColumn,
        SubscriptionTier, VerificationStatus,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use time::macros::datetime;

    struct TestRuntime {
        records: Vec<Record>,
        fail_with: Option<String>,
    }

    impl RecordSource for TestRuntime {
        fn fetch_records(&mut self) -> Result<Vec<Record>> {
            match &self.fail_with {
                Some(message) => Err(anyhow!(message.clone())),
                None => Ok(self.records.clone()),
            }
        }
    }

    fn sample_records(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|index| {
                let mut record = Record::new(format!("id-{index}"));
                record.member_name = Some(format!("Member {index:02}"));
                record.username = Some(format!("user{index}"));
                record.portfolio_type = Some(if index % 2 == 0 {
                    PortfolioType::Creative
                } else {
                    PortfolioType::Personal
                });
                record.id_verification = Some(VerificationStatus::Verified);
                record.subscription = Some(SubscriptionTier::Basic);
                record.location = Some("Tokyo, Japan".to_owned());
                record.portfolio_count = Some(2);
                record.size_kb = Some(index as f64 * 100.0);
                record
            })
            .collect()
    }

    fn ready_state(count: usize) -> AppState {
        let mut state = AppState::default();
        state.dispatch(folio_app::AppCommand::RecordsLoaded(sample_records(count)));
        state
    }

    fn view_data_for_test() -> ViewData {
        ViewData::default()
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(state: &mut AppState, view_data: &mut ViewData, code: KeyCode) -> bool {
        handle_key_event(state, view_data, &internal_tx(), key(code))
    }

    fn type_text(state: &mut AppState, view_data: &mut ViewData, text: &str) {
        for ch in text.chars() {
            press(state, view_data, KeyCode::Char(ch));
        }
    }

    fn rendered_text(state: &AppState, view_data: &ViewData) -> Result<String> {
        let backend = TestBackend::new(160, 48);
        let mut terminal = Terminal::new(backend)?;
        terminal.draw(|frame| render(frame, state, view_data))?;
        Ok(terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect())
    }

    #[test]
    fn fetch_outcome_moves_state_out_of_loading() {
        let mut state = AppState::default();
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();
        let mut runtime = TestRuntime {
            records: sample_records(3),
            fail_with: None,
        };
        runtime
            .spawn_fetch(tx.clone())
            .expect("fetch event should send");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert_eq!(state.load, LoadState::Ready);
        assert_eq!(state.records.len(), 3);
        let status = state.status_line.clone().unwrap_or_default();
        assert!(status.starts_with("loaded 3 records at "));
    }

    #[test]
    fn fetch_failure_surfaces_message() {
        let mut state = AppState::default();
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();
        let mut runtime = TestRuntime {
            records: Vec::new(),
            fail_with: Some("Error fetching data: HTTP error! status: 500".to_owned()),
        };
        runtime
            .spawn_fetch(tx.clone())
            .expect("fetch event should send");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert_eq!(
            state.load,
            LoadState::Failed("Error fetching data: HTTP error! status: 500".to_owned())
        );
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut state = ready_state(1);
        let mut view_data = view_data_for_test();
        view_data.status_token = 2;
        state.status_line = Some("current".to_owned());
        let (tx, rx) = mpsc::channel();

        tx.send(InternalEvent::ClearStatus { token: 1 })
            .expect("send should succeed");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert_eq!(state.status_line.as_deref(), Some("current"));

        tx.send(InternalEvent::ClearStatus { token: 2 })
            .expect("send should succeed");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn loaded_status_formats_clock_time() {
        let at = datetime!(2026-03-01 09:05:07 UTC);
        assert_eq!(loaded_status(1, at), "loaded 1 record at 09:05:07 UTC");
        assert_eq!(loaded_status(42, at), "loaded 42 records at 09:05:07 UTC");
    }

    #[test]
    fn only_quit_keys_work_while_loading() {
        let mut state = AppState::default();
        let mut view_data = view_data_for_test();
        assert!(!press(&mut state, &mut view_data, KeyCode::Char('x')));
        assert!(!press(&mut state, &mut view_data, KeyCode::Char('/')));
        assert_eq!(view_data.input, None);
        assert!(press(&mut state, &mut view_data, KeyCode::Char('q')));
    }

    #[test]
    fn ctrl_q_quits_from_any_mode() {
        let mut state = ready_state(2);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('/'));
        assert!(handle_key_event(
            &mut state,
            &mut view_data,
            &internal_tx(),
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        ));
    }

    #[test]
    fn search_typing_filters_live_and_resets_page() {
        let mut state = ready_state(30);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char(']'));
        assert_eq!(state.page.current_page, 2);

        press(&mut state, &mut view_data, KeyCode::Char('/'));
        type_text(&mut state, &mut view_data, "member 1");
        assert_eq!(state.filters.query, "member 1");
        assert_eq!(state.page.current_page, 1);
        // "Member 10" through "Member 19".
        assert_eq!(state.view().matching_records, 10);

        // 'q' is text while editing, not quit.
        assert!(!press(&mut state, &mut view_data, KeyCode::Char('q')));
        assert_eq!(state.filters.query, "member 1q");
        press(&mut state, &mut view_data, KeyCode::Backspace);
        press(&mut state, &mut view_data, KeyCode::Enter);
        assert_eq!(view_data.input, None);
        assert_eq!(state.filters.query, "member 1");
    }

    #[test]
    fn escape_reverts_the_edit() {
        let mut state = ready_state(5);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('L'));
        assert!(matches!(
            view_data.input.as_ref().map(|input| input.target),
            Some(InputTarget::Location)
        ));
        type_text(&mut state, &mut view_data, "india");
        assert_eq!(state.filters.location_query, "india");
        press(&mut state, &mut view_data, KeyCode::Esc);
        assert_eq!(state.filters.location_query, "");
        assert_eq!(view_data.input, None);
    }

    #[test]
    fn page_keys_navigate_and_stop_at_the_ends() {
        let mut state = ready_state(25);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('['));
        assert_eq!(state.page.current_page, 1);
        press(&mut state, &mut view_data, KeyCode::Char('G'));
        assert_eq!(state.page.current_page, 3);
        press(&mut state, &mut view_data, KeyCode::Right);
        assert_eq!(state.page.current_page, 3);
        press(&mut state, &mut view_data, KeyCode::Left);
        assert_eq!(state.page.current_page, 2);
        press(&mut state, &mut view_data, KeyCode::Char('g'));
        assert_eq!(state.page.current_page, 1);
    }

    #[test]
    fn page_size_cycles_and_reports_status() {
        let mut state = ready_state(25);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('p'));
        assert_eq!(state.page.page_size, PageSize::Twenty);
        assert_eq!(state.status_line.as_deref(), Some("20 per page"));
        assert!(view_data.status_token > 0);
    }

    #[test]
    fn sort_keys_cycle_columns_and_flip_direction() {
        let mut state = ready_state(3);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('S'));
        assert_eq!(
            state.status_line.as_deref(),
            Some("no sort column; press s first")
        );

        press(&mut state, &mut view_data, KeyCode::Char('s'));
        assert_eq!(
            state.sort.map(|sort| sort.column),
            Some(SortColumn::ALL[0])
        );
        press(&mut state, &mut view_data, KeyCode::Char('S'));
        let status = state.status_line.clone().unwrap_or_default();
        assert!(status.ends_with("desc"), "{status}");
        assert_eq!(header_label(0, &state), "Member Name ▼");
        assert_eq!(header_label(1, &state), "Username");
    }

    #[test]
    fn row_cursor_stays_within_the_visible_page() {
        let mut state = ready_state(12);
        let mut view_data = view_data_for_test();
        for _ in 0..20 {
            press(&mut state, &mut view_data, KeyCode::Char('j'));
        }
        assert_eq!(view_data.selected_row, 9);

        press(&mut state, &mut view_data, KeyCode::Char(']'));
        assert_eq!(view_data.selected_row, 1);
        press(&mut state, &mut view_data, KeyCode::Char('k'));
        press(&mut state, &mut view_data, KeyCode::Char('k'));
        assert_eq!(view_data.selected_row, 0);
    }

    #[test]
    fn filter_panel_toggles_options_under_the_cursor() {
        let mut state = ready_state(10);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Tab);
        assert_eq!(view_data.focus, Focus::Filters);

        // Cursor starts on the first portfolio type.
        press(&mut state, &mut view_data, KeyCode::Char(' '));
        assert!(state.filters.portfolio_types.contains(&PortfolioType::ALL[0]));
        press(&mut state, &mut view_data, KeyCode::Enter);
        assert!(state.filters.portfolio_types.is_empty());

        // In the panel j/k move the option cursor, not the table row.
        press(&mut state, &mut view_data, KeyCode::Char('j'));
        assert_eq!(view_data.filter_cursor, 1);
        assert_eq!(view_data.selected_row, 0);

        press(&mut state, &mut view_data, KeyCode::Tab);
        assert_eq!(view_data.focus, Focus::Table);
    }

    #[test]
    fn size_option_adjusts_bound_with_h_and_l() {
        let mut state = ready_state(10);
        let mut view_data = view_data_for_test();
        view_data.focus = Focus::Filters;
        view_data.filter_cursor = filter_options()
            .iter()
            .position(|option| *option == super::FilterOption::MaxSize)
            .expect("size option present");

        press(&mut state, &mut view_data, KeyCode::Char('h'));
        assert_eq!(state.filters.max_size_kb, MAX_SIZE_KB - 1_000);
        press(&mut state, &mut view_data, KeyCode::Char('H'));
        assert_eq!(state.filters.max_size_kb, MAX_SIZE_KB - 11_000);
        press(&mut state, &mut view_data, KeyCode::Char('L'));
        press(&mut state, &mut view_data, KeyCode::Char('L'));
        assert_eq!(state.filters.max_size_kb, MAX_SIZE_KB);
        assert_eq!(view_data.input, None);

        press(&mut state, &mut view_data, KeyCode::Char(' '));
        assert_eq!(
            state.status_line.as_deref(),
            Some("use h/l to adjust size")
        );
    }

    #[test]
    fn hiding_the_panel_returns_focus_to_the_table() {
        let mut state = ready_state(3);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Tab);
        press(&mut state, &mut view_data, KeyCode::Char('f'));
        assert!(!state.filters_visible);
        assert_eq!(view_data.focus, Focus::Table);
        assert_eq!(state.status_line.as_deref(), Some("filters hidden"));

        press(&mut state, &mut view_data, KeyCode::Tab);
        assert_eq!(view_data.focus, Focus::Table);
    }

    #[test]
    fn clear_key_resets_every_filter() {
        let mut state = ready_state(10);
        let mut view_data = view_data_for_test();
        press(&mut state, &mut view_data, KeyCode::Char('/'));
        type_text(&mut state, &mut view_data, "zzz");
        press(&mut state, &mut view_data, KeyCode::Enter);
        assert_eq!(state.view().matching_records, 0);

        press(&mut state, &mut view_data, KeyCode::Char('x'));
        assert_eq!(state.view().matching_records, 10);
        assert_eq!(state.status_line.as_deref(), Some("filters cleared"));
    }

    #[test]
    fn panel_columns_group_options_under_headings() {
        let mut state = ready_state(1);
        state.filters.location_query = "India".to_owned();
        let columns = filter_panel_columns(&state, &view_data_for_test());

        let headings = |column: usize| {
            columns[column]
                .iter()
                .filter(|(_, heading, _)| *heading)
                .map(|(text, _, _)| text.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(headings(0), vec!["Portfolio Type"]);
        assert_eq!(
            headings(1),
            vec![
                "Portfolio Verification",
                "ID Verification",
                "Number of Portfolios"
            ]
        );
        assert_eq!(headings(2), vec!["Size", "Location: India"]);
        assert_eq!(headings(3), vec!["Subscription"]);
        assert!(
            columns[2]
                .iter()
                .any(|(text, _, _)| text == "[x] India")
        );
        assert!(
            columns[1]
                .iter()
                .any(|(text, _, _)| text == "( ) 4 or more")
        );
    }

    #[test]
    fn size_slider_tracks_the_bound() {
        assert_eq!(size_slider(MAX_SIZE_KB), "[██████████] ≤ 50000 KB");
        assert_eq!(size_slider(0), "[░░░░░░░░░░] ≤ 0 KB");
        assert_eq!(size_slider(25_000), "[█████░░░░░] ≤ 25000 KB");
    }

    #[test]
    fn pagination_bar_marks_current_page_and_range() {
        let mut state = ready_state(137);
        state.dispatch(folio_app::AppCommand::GoToPage(5));
        let view = state.view();
        let text = pagination_spans(&view)
            .iter()
            .map(|span| span.content.to_string())
            .collect::<String>();
        assert!(text.starts_with("‹ prev 1 ... 3 4 [5] 6 ... 14 next ›"), "{text}");
        assert!(text.ends_with("per page: 10   showing 41-50 of 137"), "{text}");
    }

    #[test]
    fn status_text_reflects_mode() {
        let mut state = ready_state(1);
        let mut view_data = view_data_for_test();
        assert!(status_text(&state, &view_data).starts_with("TABLE | "));
        view_data.focus = Focus::Filters;
        assert!(status_text(&state, &view_data).starts_with("FILTERS | "));
        state.status_line = Some("hello".to_owned());
        assert!(status_text(&state, &view_data).starts_with("FILTERS | hello | "));

        let loading = AppState::default();
        assert_eq!(status_text(&loading, &view_data), "LOADING | q quit");
    }

    #[test]
    fn render_shows_loading_then_error_screens() -> Result<()> {
        let mut state = AppState::default();
        let view_data = view_data_for_test();
        assert!(rendered_text(&state, &view_data)?.contains("Loading..."));

        state.dispatch(folio_app::AppCommand::FetchFailed(
            "Failed to fetch users.".to_owned(),
        ));
        let text = rendered_text(&state, &view_data)?;
        assert!(text.contains("Failed to fetch users."));
        assert!(!text.contains("Member Name"));
        Ok(())
    }

    #[test]
    fn render_shows_placeholder_row_when_nothing_matches() -> Result<()> {
        let mut state = ready_state(4);
        state.dispatch(folio_app::AppCommand::SetQuery("nobody".to_owned()));
        let text = rendered_text(&state, &view_data_for_test())?;
        assert!(text.contains(EMPTY_RESULTS));
        assert!(text.contains("showing 0-0 of 0"));
        Ok(())
    }

    #[test]
    fn render_draws_rows_with_badges_and_sizes() -> Result<()> {
        let state = ready_state(3);
        let text = rendered_text(&state, &view_data_for_test())?;
        assert!(text.contains("Portfolio Database"));
        assert!(text.contains("(M) Member 01"));
        assert!(text.contains("Verified"));
        assert!(text.contains("300 KB"));
        assert!(text.contains("3 of 3 members"));
        assert!(text.contains("Portfolio Type"));
        Ok(())
    }
}
