// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airq_app::{AqiCategory, LocationEntry, LocationId, MeasurementRecord, PredictionRequest};
use airq_app::{Pollutants, StaticCatalog, calculate_aqi};
use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use time::macros::{date, format_description};
use time::{Date, Duration as DateDuration};

/// Pinned "today" so fixture dates are stable.
pub const TODAY: Date = date!(2024 - 05 - 01);

pub fn builtin_catalog() -> StaticCatalog {
    StaticCatalog::builtin(TODAY)
}

/// A one-location catalog whose records carry `so2` values from `so2`,
/// oldest first, with every other reading zero.
pub fn so2_catalog(id: &str, so2: &[f64]) -> StaticCatalog {
    let count = so2.len() as i64;
    let records = so2
        .iter()
        .enumerate()
        .map(|(index, value)| MeasurementRecord {
            date: TODAY.saturating_sub(DateDuration::days(count - 1 - index as i64)),
            dew_point: 0.0,
            wind_speed: 0.0,
            max_temp: 0.0,
            min_temp: 0.0,
            precipitation: 0.0,
            co: 0.0,
            no2: 0.0,
            o3: 0.0,
            pm10: 0.0,
            pm25: 0.0,
            so2: *value,
        })
        .collect();
    StaticCatalog::new(vec![LocationEntry {
        id: LocationId::from(id),
        name: LocationId::from(id).fallback_name(),
        current_aqi: 0,
        records,
    }])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl ScriptedReply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }
}

/// Mimics the real service: forecasts the AQI of the newest row for the
/// following day and colors it by EPA category.
pub fn forecast_reply(request: &PredictionRequest) -> ScriptedReply {
    let Some(latest) = request.weather_data.last() else {
        return ScriptedReply::status(422, r#"{"error":"weatherData is empty"}"#);
    };
    let Some(aqi) = calculate_aqi(&Pollutants::from_row(latest)) else {
        return ScriptedReply::status(422, r#"{"error":"no pollutant readings"}"#);
    };
    let Some(category) = AqiCategory::from_aqi(aqi) else {
        return ScriptedReply::status(422, r#"{"error":"aqi out of range"}"#);
    };

    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(latest.date.trim(), &format)
        .ok()
        .and_then(Date::next_day)
        .and_then(|next| next.format(&format).ok())
        .unwrap_or_else(|| "unknown".to_owned());

    let body = serde_json::json!({
        "date": date,
        "aqi": format!("{aqi} ({})", category.label()),
        "healthyColor": category.color(),
        "fontColor": category.font_color(),
        "imageUrl": format!("/img/{}-{aqi}.png", request.city),
    });
    ScriptedReply::json(body.to_string())
}

/// A `POST /predict` server on an ephemeral port that answers a fixed
/// number of requests. Each reply is sent from its own thread after its
/// delay, so replies can settle out of arrival order.
pub struct MockPredictService {
    base_url: String,
    handle: JoinHandle<Result<Vec<PredictionRequest>>>,
}

impl MockPredictService {
    pub fn start<F>(expected: usize, responder: F) -> Result<Self>
    where
        F: Fn(&PredictionRequest) -> ScriptedReply + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || -> Result<Vec<PredictionRequest>> {
            let mut received = Vec::with_capacity(expected);
            let mut workers = Vec::with_capacity(expected);
            for _ in 0..expected {
                let mut request = server.recv().context("receive mock request")?;
                let mut body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut body)
                    .context("read mock request body")?;
                let parsed: PredictionRequest =
                    serde_json::from_str(&body).context("decode mock request body")?;

                let reply = responder(&parsed);
                received.push(parsed);
                workers.push(thread::spawn(move || -> Result<()> {
                    thread::sleep(reply.delay);
                    let header =
                        tiny_http::Header::from_bytes("Content-Type", "application/json")
                            .map_err(|()| anyhow!("build content type header"))?;
                    let response = tiny_http::Response::from_string(reply.body)
                        .with_status_code(reply.status)
                        .with_header(header);
                    request.respond(response).context("send mock response")
                }));
            }
            for worker in workers {
                worker
                    .join()
                    .map_err(|_| anyhow!("mock responder panicked"))??;
            }
            Ok(received)
        });

        Ok(Self { base_url, handle })
    }

    /// Answers every request with [`forecast_reply`].
    pub fn forecasting(expected: usize) -> Result<Self> {
        Self::start(expected, forecast_reply)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for every expected request to be answered and returns them in
    /// arrival order.
    pub fn finish(self) -> Result<Vec<PredictionRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))?
    }
}
