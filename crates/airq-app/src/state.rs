// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::catalog::LocationSource;
use crate::ids::{LocationId, RequestSeq};
use crate::model::MeasurementField;
use crate::orchestrator::{Orchestrator, PredictionOutcome, Settlement, Submission};
use crate::render::{PredictionView, ResponseRenderer};
use crate::table::DisplayTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Enterprise,
    Individual,
}

impl Section {
    pub const ALL: [Self; 2] = [Self::Enterprise, Self::Individual];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Individual => "individual",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Enterprise => "Enterprise",
            Self::Individual => "Individual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enterprise" => Some(Self::Enterprise),
            "individual" => Some(Self::Individual),
            _ => None,
        }
    }
}

/// Exactly one section is visible; holding a single value keeps "both" and
/// "neither" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionToggle {
    active: Section,
}

impl SectionToggle {
    pub const fn new(initial: Section) -> Self {
        Self { active: initial }
    }

    /// Returns whether the visible section changed.
    pub fn select(&mut self, section: Section) -> bool {
        let changed = self.active != section;
        self.active = section;
        changed
    }

    pub fn select_enterprise(&mut self) -> bool {
        self.select(Section::Enterprise)
    }

    pub fn select_individual(&mut self) -> bool {
        self.select(Section::Individual)
    }

    pub const fn active(self) -> Section {
        self.active
    }

    pub fn is_visible(self, section: Section) -> bool {
        self.active == section
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedLocation {
    pub id: LocationId,
    pub name: String,
    /// `None` when the catalog has no entry for `id`.
    pub current_aqi: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub sections: SectionToggle,
    pub location: Option<SelectedLocation>,
    pub table: DisplayTable,
    pub orchestrator: Orchestrator,
    pub renderer: ResponseRenderer,
    /// Ask before a location switch drops table edits.
    pub confirm_discard: bool,
    pub pending_location: Option<LocationId>,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SelectSection(Section),
    SelectLocation(LocationId),
    ConfirmDiscard,
    CancelDiscard,
    EditCell {
        row: usize,
        field: MeasurementField,
        value: String,
    },
    SubmitPrediction,
    SettlePrediction {
        seq: RequestSeq,
        outcome: PredictionOutcome,
    },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SectionChanged(Section),
    LocationChanged {
        id: LocationId,
        rows: usize,
        found: bool,
    },
    DiscardConfirmationRequired(LocationId),
    CellEdited {
        row: usize,
        field: MeasurementField,
    },
    /// The host must send this request and report back with
    /// [`AppCommand::SettlePrediction`].
    PredictionRequested(Submission),
    PredictionRendered {
        seq: RequestSeq,
        success: bool,
    },
    StalePredictionDropped(RequestSeq),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(initial: Section, confirm_discard: bool) -> Self {
        Self {
            sections: SectionToggle::new(initial),
            confirm_discard,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, catalog: &dyn LocationSource, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SelectSection(section) => {
                if self.sections.select(section) {
                    tracing::debug!(section = section.as_str(), "section changed");
                    vec![AppEvent::SectionChanged(section)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::SelectLocation(id) => {
                if self.confirm_discard && self.table.is_dirty() {
                    self.pending_location = Some(id.clone());
                    vec![
                        AppEvent::DiscardConfirmationRequired(id),
                        self.set_status("unsaved edits: y to discard, n to keep"),
                    ]
                } else {
                    self.apply_location(catalog, id)
                }
            }
            AppCommand::ConfirmDiscard => match self.pending_location.take() {
                Some(id) => self.apply_location(catalog, id),
                None => Vec::new(),
            },
            AppCommand::CancelDiscard => match self.pending_location.take() {
                Some(_) => vec![self.set_status("edits kept")],
                None => Vec::new(),
            },
            AppCommand::EditCell { row, field, value } => {
                match self.table.edit_cell(row, field, value) {
                    Ok(()) => vec![AppEvent::CellEdited { row, field }],
                    Err(error) => vec![self.set_status(&error.to_string())],
                }
            }
            AppCommand::SubmitPrediction => {
                self.renderer.begin();
                let city = self
                    .location
                    .as_ref()
                    .map_or("", |location| location.id.as_str());
                let submission = self.orchestrator.submit(city, &self.table);
                vec![AppEvent::PredictionRequested(submission)]
            }
            AppCommand::SettlePrediction { seq, outcome } => self.settle(seq, outcome),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn apply_location(&mut self, catalog: &dyn LocationSource, id: LocationId) -> Vec<AppEvent> {
        self.pending_location = None;
        let entry = self.table.select_location(catalog, &id);
        let found = entry.is_some();
        if !found {
            tracing::debug!(location = %id, "location not in catalog");
        }
        self.location = Some(match entry {
            Some(entry) => SelectedLocation {
                id: id.clone(),
                name: entry.name,
                current_aqi: Some(entry.current_aqi),
            },
            None => SelectedLocation {
                name: id.fallback_name(),
                id: id.clone(),
                current_aqi: None,
            },
        });
        vec![AppEvent::LocationChanged {
            id,
            rows: self.table.rows().len(),
            found,
        }]
    }

    fn settle(&mut self, seq: RequestSeq, outcome: PredictionOutcome) -> Vec<AppEvent> {
        let rendered = match &outcome {
            PredictionOutcome::Success(response) => Some(PredictionView::from_response(
                response,
                self.location.as_ref().map(|location| location.name.as_str()),
            )),
            PredictionOutcome::Failure => None,
        };
        match self.orchestrator.settle(seq, outcome) {
            Settlement::Stale => vec![AppEvent::StalePredictionDropped(seq)],
            Settlement::Accepted => {
                let success = rendered.is_some();
                match rendered {
                    Some(view) => self.renderer.show_success(view),
                    None => self.renderer.show_failure(),
                }
                vec![AppEvent::PredictionRendered { seq, success }]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
