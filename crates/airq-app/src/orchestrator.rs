// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::ids::RequestSeq;
use crate::model::{PredictionRequest, PredictionResponse};
use crate::table::DisplayTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionOutcome {
    Success(PredictionResponse),
    Failure,
}

impl PredictionOutcome {
    /// Collapses any transport or decode error into [`Self::Failure`]. The
    /// error itself only goes to the log.
    pub fn from_result(seq: RequestSeq, result: anyhow::Result<PredictionResponse>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(error) => {
                tracing::warn!(%seq, error = %format!("{error:#}"), "prediction failed");
                Self::Failure
            }
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PredictionPhase {
    #[default]
    Idle,
    InFlight {
        seq: RequestSeq,
    },
    Settled(PredictionOutcome),
}

/// A request ready to send, tagged with the sequence number its
/// settlement must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub seq: RequestSeq,
    pub request: PredictionRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Accepted,
    /// A newer submission exists (or this one already settled); the outcome
    /// was dropped.
    Stale,
}

/// Tracks prediction cycles. Every submission gets a fresh, increasing
/// [`RequestSeq`]; only the newest one may settle the visible phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orchestrator {
    phase: PredictionPhase,
    last_seq: Option<RequestSeq>,
    outstanding: BTreeSet<RequestSeq>,
}

impl Orchestrator {
    pub fn submit(&mut self, city: &str, table: &DisplayTable) -> Submission {
        let seq = self
            .last_seq
            .map_or(RequestSeq::new(1), RequestSeq::next);
        self.last_seq = Some(seq);
        self.outstanding.insert(seq);
        self.phase = PredictionPhase::InFlight { seq };

        let request = PredictionRequest {
            city: city.to_owned(),
            weather_data: table.snapshot(),
        };
        tracing::info!(
            %seq,
            city,
            rows = request.weather_data.len(),
            outstanding = self.outstanding.len(),
            "prediction submitted"
        );
        Submission { seq, request }
    }

    pub fn settle(&mut self, seq: RequestSeq, outcome: PredictionOutcome) -> Settlement {
        let was_outstanding = self.outstanding.remove(&seq);
        if !was_outstanding || self.phase != (PredictionPhase::InFlight { seq }) {
            tracing::debug!(%seq, latest = ?self.last_seq, "dropping stale prediction");
            return Settlement::Stale;
        }

        tracing::info!(%seq, success = outcome.is_success(), "prediction settled");
        self.phase = PredictionPhase::Settled(outcome);
        Settlement::Accepted
    }

    pub fn phase(&self) -> &PredictionPhase {
        &self.phase
    }

    /// Requests sent but not yet settled, stale ones included.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, PredictionPhase::InFlight { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{Orchestrator, PredictionOutcome, PredictionPhase, Settlement};
    use crate::catalog::StaticCatalog;
    use crate::ids::{LocationId, RequestSeq};
    use crate::model::{MeasurementField, PredictionResponse};
    use crate::table::DisplayTable;
    use anyhow::{Result, anyhow};
    use time::macros::date;

    fn paris_table() -> DisplayTable {
        let catalog = StaticCatalog::builtin(date!(2024 - 05 - 01));
        let mut table = DisplayTable::default();
        table.select_location(&catalog, &LocationId::from("paris"));
        table
    }

    fn response(date: &str) -> PredictionResponse {
        PredictionResponse {
            date: Some(date.to_owned()),
            ..PredictionResponse::default()
        }
    }

    #[test]
    fn submit_enters_in_flight_with_fresh_seq() {
        let table = paris_table();
        let mut orchestrator = Orchestrator::default();
        assert_eq!(orchestrator.phase(), &PredictionPhase::Idle);

        let first = orchestrator.submit("paris", &table);
        let second = orchestrator.submit("paris", &table);
        assert_eq!(first.seq, RequestSeq::new(1));
        assert_eq!(second.seq, RequestSeq::new(2));
        assert_eq!(
            orchestrator.phase(),
            &PredictionPhase::InFlight { seq: second.seq }
        );
        assert_eq!(orchestrator.outstanding(), 2);
    }

    #[test]
    fn request_is_frozen_at_submission() -> Result<()> {
        let mut table = paris_table();
        let mut orchestrator = Orchestrator::default();

        table.edit_cell(0, MeasurementField::So2, "5")?;
        let submission = orchestrator.submit("paris", &table);
        table.edit_cell(0, MeasurementField::So2, "6")?;

        assert_eq!(submission.request.city, "paris");
        assert_eq!(submission.request.weather_data[0].so2, "5");
        assert_eq!(submission.request.weather_data.len(), 3);
        Ok(())
    }

    #[test]
    fn newest_submission_wins_when_older_settles_last() {
        let table = paris_table();
        let mut orchestrator = Orchestrator::default();
        let first = orchestrator.submit("paris", &table);
        let second = orchestrator.submit("paris", &table);

        let accepted = orchestrator.settle(
            second.seq,
            PredictionOutcome::Success(response("second")),
        );
        let dropped = orchestrator.settle(first.seq, PredictionOutcome::Success(response("first")));

        assert_eq!(accepted, Settlement::Accepted);
        assert_eq!(dropped, Settlement::Stale);
        assert_eq!(
            orchestrator.phase(),
            &PredictionPhase::Settled(PredictionOutcome::Success(response("second")))
        );
        assert_eq!(orchestrator.outstanding(), 0);
    }

    #[test]
    fn older_settlement_does_not_end_newer_cycle() {
        let table = paris_table();
        let mut orchestrator = Orchestrator::default();
        let first = orchestrator.submit("paris", &table);
        let second = orchestrator.submit("paris", &table);

        assert_eq!(
            orchestrator.settle(first.seq, PredictionOutcome::Failure),
            Settlement::Stale
        );
        assert!(orchestrator.is_in_flight());
        assert_eq!(
            orchestrator.settle(second.seq, PredictionOutcome::Failure),
            Settlement::Accepted
        );
        assert_eq!(
            orchestrator.phase(),
            &PredictionPhase::Settled(PredictionOutcome::Failure)
        );
    }

    #[test]
    fn duplicate_and_unknown_settlements_are_stale() {
        let table = paris_table();
        let mut orchestrator = Orchestrator::default();
        let only = orchestrator.submit("paris", &table);

        assert_eq!(
            orchestrator.settle(RequestSeq::new(99), PredictionOutcome::Failure),
            Settlement::Stale
        );
        assert_eq!(
            orchestrator.settle(only.seq, PredictionOutcome::Failure),
            Settlement::Accepted
        );
        assert_eq!(
            orchestrator.settle(only.seq, PredictionOutcome::Success(response("late"))),
            Settlement::Stale
        );
    }

    #[test]
    fn errors_become_failures() {
        let outcome = PredictionOutcome::from_result(
            RequestSeq::new(1),
            Err(anyhow!("connection refused")),
        );
        assert_eq!(outcome, PredictionOutcome::Failure);
        assert!(
            PredictionOutcome::from_result(RequestSeq::new(2), Ok(response("x"))).is_success()
        );
    }
}
