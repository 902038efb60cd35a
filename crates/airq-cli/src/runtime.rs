// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airq_app::{
    LocationSource, PredictionOutcome, PredictionRequest, PredictionResponse, RequestSeq,
};
use airq_client::Client;
use airq_tui::{InternalEvent, PredictionEvent};
use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;

/// Production runtime: each prediction runs on its own thread against the
/// forecast service.
pub struct PredictRuntime<C> {
    catalog: C,
    client: Client,
}

impl<C: LocationSource> PredictRuntime<C> {
    pub fn new(catalog: C, client: Client) -> Self {
        Self { catalog, client }
    }
}

impl<C: LocationSource> airq_tui::AppRuntime for PredictRuntime<C> {
    fn catalog(&self) -> &dyn LocationSource {
        &self.catalog
    }

    fn run_prediction(&mut self, request: &PredictionRequest) -> Result<PredictionResponse> {
        self.client.predict(request)
    }

    fn spawn_prediction(
        &mut self,
        seq: RequestSeq,
        request: PredictionRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        tracing::info!(%seq, url = %client.predict_url(), "sending prediction");
        thread::Builder::new()
            .name(format!("predict-{}", seq.get()))
            .spawn(move || {
                let outcome = PredictionOutcome::from_result(seq, client.predict(&request));
                if tx
                    .send(InternalEvent::Prediction(PredictionEvent::Settled {
                        seq,
                        outcome,
                    }))
                    .is_err()
                {
                    tracing::debug!(%seq, "ui gone before prediction settled");
                }
            })
            .context("spawn prediction worker")?;
        Ok(())
    }
}
