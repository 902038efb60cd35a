// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airq_app::{
    AppCommand, AppEvent, AppState, AqiCategory, CellGrid, LocationId, LocationSource,
    MeasurementField, MeasurementRow, Pollutants, PredictionOutcome, PredictionRequest,
    PredictionResponse, RequestSeq, ResponseView, Section, calculate_aqi,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const IN_FLIGHT_LABEL: &str = "predicting...";
const NO_FORECAST_LABEL: &str = "no forecast yet";
const UNPARSED_AQI: &str = "-";

/// Host services the event loop needs. `spawn_prediction` must not block
/// the loop in production; the default runs inline, which keeps test
/// runtimes simple.
pub trait AppRuntime {
    fn catalog(&self) -> &dyn LocationSource;
    fn run_prediction(&mut self, request: &PredictionRequest) -> Result<PredictionResponse>;
    fn spawn_prediction(
        &mut self,
        seq: RequestSeq,
        request: PredictionRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = PredictionOutcome::from_result(seq, self.run_prediction(&request));
        tx.send(InternalEvent::Prediction(PredictionEvent::Settled {
            seq,
            outcome,
        }))
        .map_err(|_| anyhow::anyhow!("prediction event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionEvent {
    Settled {
        seq: RequestSeq,
        outcome: PredictionOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Prediction(PredictionEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CursorState {
    row: usize,
    field: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: CursorState,
    editing: bool,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(
            state,
            runtime.catalog(),
            &mut view_data,
            &internal_tx,
            &internal_rx,
        );

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    catalog: &dyn LocationSource,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(catalog, AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Prediction(PredictionEvent::Settled { seq, outcome }) => {
                let events = state.dispatch(catalog, AppCommand::SettlePrediction { seq, outcome });
                if events.contains(&AppEvent::PredictionRendered { seq, success: false }) {
                    emit_status(state, catalog, view_data, tx, "prediction failed; see log");
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    catalog: &dyn LocationSource,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(catalog, AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Dispatches `command` and carries out the side effects its events ask
/// the host for.
fn dispatch_command<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(runtime.catalog(), command);
    for event in events {
        match event {
            AppEvent::LocationChanged { rows, .. } => {
                view_data.editing = false;
                view_data.cursor.row = view_data.cursor.row.min(rows.saturating_sub(1));
            }
            AppEvent::PredictionRequested(submission) => {
                let seq = submission.seq;
                if let Err(error) =
                    runtime.spawn_prediction(seq, submission.request, internal_tx.clone())
                {
                    tracing::warn!(%seq, error = %format!("{error:#}"), "prediction not sent");
                    state.dispatch(
                        runtime.catalog(),
                        AppCommand::SettlePrediction {
                            seq,
                            outcome: PredictionOutcome::Failure,
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.editing {
        handle_edit_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if state.pending_location.is_some() {
        match key.code {
            KeyCode::Char('y') => {
                dispatch_command(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::ConfirmDiscard,
                );
                return false;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                dispatch_command(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::CancelDiscard,
                );
                return false;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab => {
            let next = match state.sections.active() {
                Section::Enterprise => Section::Individual,
                Section::Individual => Section::Enterprise,
            };
            select_section(state, runtime, view_data, internal_tx, next);
        }
        KeyCode::Char('1') => {
            select_section(state, runtime, view_data, internal_tx, Section::Enterprise);
        }
        KeyCode::Char('2') => {
            select_section(state, runtime, view_data, internal_tx, Section::Individual);
        }
        KeyCode::Char(']') => cycle_location(state, runtime, view_data, internal_tx, 1),
        KeyCode::Char('[') => cycle_location(state, runtime, view_data, internal_tx, -1),
        KeyCode::Char('p') => {
            dispatch_command(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::SubmitPrediction,
            );
        }
        _ if state.sections.is_visible(Section::Enterprise) => {
            handle_table_key(state, runtime, view_data, internal_tx, key);
        }
        _ => {}
    }
    false
}

fn select_section<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    section: Section,
) {
    dispatch_command(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SelectSection(section),
    );
}

fn cycle_location<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let locations = runtime.catalog().locations();
    let Some(next) = next_location(
        &locations,
        state.location.as_ref().map(|location| &location.id),
        delta,
    ) else {
        emit_status(
            state,
            runtime.catalog(),
            view_data,
            internal_tx,
            "no locations available",
        );
        return;
    };
    dispatch_command(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SelectLocation(next),
    );
}

fn next_location(
    locations: &[LocationId],
    current: Option<&LocationId>,
    delta: isize,
) -> Option<LocationId> {
    if locations.is_empty() {
        return None;
    }
    let position = current.and_then(|id| locations.iter().position(|candidate| candidate == id));
    let index = match position {
        Some(position) => (position as isize + delta).rem_euclid(locations.len() as isize),
        None if delta < 0 => locations.len() as isize - 1,
        None => 0,
    };
    locations.get(index as usize).cloned()
}

fn handle_table_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let rows = state.table.row_count();
    let fields = MeasurementField::ALL.len();
    let cursor = &mut view_data.cursor;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            cursor.row = (cursor.row + 1).min(rows.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => cursor.row = cursor.row.saturating_sub(1),
        KeyCode::Char('l') | KeyCode::Right => {
            cursor.field = (cursor.field + 1).min(fields - 1);
        }
        KeyCode::Char('h') | KeyCode::Left => cursor.field = cursor.field.saturating_sub(1),
        KeyCode::Char('g') => cursor.row = 0,
        KeyCode::Char('G') => cursor.row = rows.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('i') => {
            if rows == 0 {
                emit_status(
                    state,
                    runtime.catalog(),
                    view_data,
                    internal_tx,
                    "nothing to edit",
                );
            } else {
                view_data.editing = true;
            }
        }
        _ => {}
    }
}

/// Every keystroke writes the whole cell through to the table so a
/// submission always sees the text on screen.
fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let CursorState { row, field } = view_data.cursor;
    let Some(field) = MeasurementField::ALL.get(field).copied() else {
        view_data.editing = false;
        return;
    };
    let Some(current) = state.table.read(row, field).map(str::to_owned) else {
        view_data.editing = false;
        return;
    };

    let value = match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_data.editing = false;
            return;
        }
        KeyCode::Backspace => {
            let mut value = current;
            value.pop();
            value
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => String::new(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut value = current;
            value.push(ch);
            value
        }
        _ => return,
    };
    dispatch_command(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::EditCell { row, field, value },
    );
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = Section::ALL
        .iter()
        .position(|section| state.sections.is_visible(*section))
        .unwrap_or(0);
    let titles = Section::ALL
        .iter()
        .map(|section| section.label())
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(header_title(state))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.sections.active() {
        Section::Enterprise => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(5)])
                .split(layout[1]);
            render_table(frame, body[0], state, view_data);
            let forecast = Paragraph::new(forecast_lines(state))
                .block(Block::default().title("forecast").borders(Borders::ALL));
            frame.render_widget(forecast, body[1]);
        }
        Section::Individual => {
            let mut lines = summary_text(state)
                .lines()
                .map(|line| Line::from(line.to_owned()))
                .collect::<Vec<_>>();
            lines.push(Line::default());
            lines.extend(forecast_lines(state));
            let summary = Paragraph::new(lines)
                .block(Block::default().title("summary").borders(Borders::ALL));
            frame.render_widget(summary, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_title(state: &AppState) -> String {
    match &state.location {
        Some(location) => format!("airq | {}", location.name),
        None => "airq".to_owned(),
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let header_cells = MeasurementField::ALL
        .iter()
        .map(|field| field.label())
        .chain(std::iter::once("AQI"))
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let rows = state.table.rows().iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.cursor.row;
        let mut cells = MeasurementField::ALL
            .iter()
            .enumerate()
            .map(|(field_index, field)| {
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && field_index == view_data.cursor.field {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(if view_data.editing {
                            Color::Yellow
                        } else {
                            Color::Cyan
                        })
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(row.get(*field).to_owned()).style(style)
            })
            .collect::<Vec<_>>();
        cells.push(
            Cell::from(row_aqi_label(row)).style(Style::default().add_modifier(Modifier::DIM)),
        );
        Row::new(cells)
    });

    let mut widths = vec![Constraint::Length(10)];
    widths.extend(vec![Constraint::Min(5); MeasurementField::ALL.len()]);

    let title = if state.table.is_dirty() {
        "readings (edited)"
    } else {
        "readings"
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn row_aqi_label(row: &MeasurementRow) -> String {
    calculate_aqi(&Pollutants::from_row(row))
        .map_or_else(|| UNPARSED_AQI.to_owned(), |aqi| aqi.to_string())
}

fn forecast_lines(state: &AppState) -> Vec<Line<'static>> {
    if state.renderer.in_flight() {
        return vec![Line::from(Span::styled(
            IN_FLIGHT_LABEL,
            Style::default().fg(Color::Cyan),
        ))];
    }
    match state.renderer.view() {
        ResponseView::Empty => vec![Line::from(NO_FORECAST_LABEL)],
        ResponseView::Failure => vec![Line::from(Span::styled(
            state.renderer.text(),
            Style::default().fg(Color::Red),
        ))],
        ResponseView::Success(view) => {
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if let Some(color) = view.font_color.as_deref().and_then(parse_color) {
                style = style.fg(color);
            }
            if let Some(color) = view.background_color.as_deref().and_then(parse_color) {
                style = style.bg(color);
            }
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("Prediction for {}: AQI will be ", view.date)),
                Span::styled(view.aqi.clone(), style),
            ])];
            if let Some(location) = &view.location {
                lines.push(Line::from(format!("location: {location}")));
            }
            if let Some(url) = &view.image_url {
                lines.push(Line::from(format!("image: {url}")));
            }
            lines
        }
    }
}

fn summary_text(state: &AppState) -> String {
    let Some(location) = &state.location else {
        return "no location selected; press ] to pick one".to_owned();
    };
    let mut out = format!("Location: {}\n", location.name);
    match location.current_aqi {
        Some(aqi) => match AqiCategory::from_aqi(aqi) {
            Some(category) => {
                out.push_str(&format!("Current AQI: {aqi} ({})\n", category.label()));
                out.push_str(category.health_note());
            }
            None => out.push_str(&format!("Current AQI: {aqi}")),
        },
        None => out.push_str("Current AQI: unknown"),
    }
    out
}

/// Accepts CSS-style names and `#rgb` / `#rrggbb`.
fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    match value.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "green" => Some(Color::Rgb(0, 228, 0)),
        "yellow" => Some(Color::Rgb(255, 255, 0)),
        "orange" => Some(Color::Rgb(255, 126, 0)),
        "red" => Some(Color::Rgb(255, 0, 0)),
        "purple" => Some(Color::Rgb(143, 63, 151)),
        "maroon" => Some(Color::Rgb(126, 0, 35)),
        "gray" | "grey" => Some(Color::Gray),
        "blue" => Some(Color::Blue),
        _ => None,
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let mut parts = hex.chars().map(|ch| channel(&format!("{ch}{ch}")));
            Some(Color::Rgb(parts.next()??, parts.next()??, parts.next()??))
        }
        6 => Some(Color::Rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = if view_data.editing { "EDIT" } else { "NAV" };
    let default = match (view_data.editing, state.sections.active()) {
        (true, _) => "type to edit | backspace | ctrl+u clear | enter/esc done".to_owned(),
        (false, Section::Enterprise) => {
            "j/k/h/l move | enter edit | p predict | [/] location | tab section | ? help | q quit"
                .to_owned()
        }
        (false, Section::Individual) => {
            "p predict | [/] location | tab section | ? help | q quit".to_owned()
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: q or ctrl+q quit | ? help | tab switch section | 1 enterprise | 2 individual\n\
location: ] next | [ previous | y/n answer discard prompt\n\
table: j/k rows | h/l columns | g/G first/last row | enter or i edit\n\
edit: type to write through | backspace | ctrl+u clear | enter/esc done\n\
forecast: p predict from the current table"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
