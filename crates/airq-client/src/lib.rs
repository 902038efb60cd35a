// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airq_app::{PredictionRequest, PredictionResponse};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const PREDICT_PATH: &str = "/predict";

/// Blocking client for the forecast service. Cheap to clone; clones share
/// the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        validate_base_url(&base_url)?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn predict_url(&self) -> String {
        format!("{}{PREDICT_PATH}", self.base_url)
    }

    /// Sends one prediction request. No retries.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let url = self.predict_url();
        tracing::debug!(%url, city = %request.city, rows = request.weather_data.len(), "POST predict");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read prediction response")?;
        serde_json::from_str(&body).context("decode prediction response")
    }
}

pub fn validate_base_url(base_url: &str) -> Result<()> {
    if base_url.is_empty() {
        bail!("service.base_url must not be empty");
    }
    let parsed = Url::parse(base_url)
        .with_context(|| format!("service.base_url {base_url:?} is not a valid URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("service.base_url must use http or https, got {other:?}"),
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("prediction service at {base_url} timed out ({error})");
    }
    anyhow!("cannot reach prediction service at {base_url} -- is it running? ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}
