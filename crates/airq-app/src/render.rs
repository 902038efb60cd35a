// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::PredictionResponse;

pub const FAILURE_MESSAGE: &str = "Failed to get prediction.";
pub const MISSING_PLACEHOLDER: &str = "n/a";

/// A successful forecast with the placeholder rules already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionView {
    /// Location selected when the response arrived.
    pub location: Option<String>,
    pub date: String,
    pub aqi: String,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
    pub image_url: Option<String>,
}

impl PredictionView {
    pub fn from_response(response: &PredictionResponse, location: Option<&str>) -> Self {
        Self {
            location: location.map(str::to_owned),
            date: response
                .date
                .clone()
                .unwrap_or_else(|| MISSING_PLACEHOLDER.to_owned()),
            aqi: response
                .aqi
                .as_ref()
                .map_or_else(|| MISSING_PLACEHOLDER.to_owned(), ToString::to_string),
            font_color: response.font_color.clone(),
            background_color: response.healthy_color.clone(),
            image_url: response.image_url.clone(),
        }
    }

    pub fn result_line(&self) -> String {
        format!("Prediction for {}: AQI will be {}", self.date, self.aqi)
    }

    /// HTML fragment for web hosts: the result line with a colored AQI
    /// label, followed by the image if one was returned.
    pub fn markup(&self) -> String {
        let mut style = Vec::new();
        if let Some(color) = &self.font_color {
            style.push(format!("color: {};", escape_html(color)));
        }
        style.push("font-weight: bold;".to_owned());
        if let Some(color) = &self.background_color {
            style.push(format!("background-color: {};", escape_html(color)));
        }

        let mut out = format!(
            "Prediction for {}: AQI will be <span style=\"{}\">{}</span>",
            escape_html(&self.date),
            style.join(" "),
            escape_html(&self.aqi),
        );
        if let Some(url) = &self.image_url {
            out.push_str(&format!(
                "\n<img src=\"{}\" alt=\"Prediction Image\" />",
                escape_html(url)
            ));
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseView {
    #[default]
    Empty,
    Success(PredictionView),
    Failure,
}

/// What the forecast panel shows, plus the in-flight indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseRenderer {
    view: ResponseView,
    in_flight: bool,
}

impl ResponseRenderer {
    pub fn begin(&mut self) {
        self.view = ResponseView::Empty;
        self.in_flight = true;
    }

    pub fn show_success(&mut self, view: PredictionView) {
        self.view = ResponseView::Success(view);
        self.in_flight = false;
    }

    pub fn show_failure(&mut self) {
        self.view = ResponseView::Failure;
        self.in_flight = false;
    }

    pub fn view(&self) -> &ResponseView {
        &self.view
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn text(&self) -> String {
        match &self.view {
            ResponseView::Empty => String::new(),
            ResponseView::Success(view) => view.result_line(),
            ResponseView::Failure => FAILURE_MESSAGE.to_owned(),
        }
    }

    pub fn markup(&self) -> String {
        match &self.view {
            ResponseView::Empty => String::new(),
            ResponseView::Success(view) => view.markup(),
            ResponseView::Failure => FAILURE_MESSAGE.to_owned(),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{FAILURE_MESSAGE, PredictionView, ResponseRenderer, ResponseView};
    use crate::model::PredictionResponse;
    use anyhow::Result;

    #[test]
    fn success_markup_carries_colors_and_image() -> Result<()> {
        let response: PredictionResponse = serde_json::from_str(
            r##"{"date":"2024-05-01","aqi":42,"fontColor":"#000","healthyColor":"#0f0","imageUrl":"/img/42.png"}"##,
        )?;
        let view = PredictionView::from_response(&response, Some("Paris"));

        assert_eq!(view.result_line(), "Prediction for 2024-05-01: AQI will be 42");
        let markup = view.markup();
        assert!(markup.contains(
            "<span style=\"color: #000; font-weight: bold; background-color: #0f0;\">42</span>"
        ));
        assert!(markup.contains("<img src=\"/img/42.png\" alt=\"Prediction Image\" />"));
        Ok(())
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let view = PredictionView::from_response(&PredictionResponse::default(), None);
        assert_eq!(view.result_line(), "Prediction for n/a: AQI will be n/a");

        let markup = view.markup();
        assert!(markup.contains("<span style=\"font-weight: bold;\">n/a</span>"));
        assert!(!markup.contains("<img"));
    }

    #[test]
    fn markup_escapes_service_text() {
        let view = PredictionView::from_response(
            &PredictionResponse {
                date: Some("<b>tomorrow</b>".to_owned()),
                ..PredictionResponse::default()
            },
            None,
        );
        assert!(view.markup().starts_with("Prediction for &lt;b&gt;tomorrow&lt;/b&gt;:"));
    }

    #[test]
    fn begin_clears_previous_outcome() {
        let mut renderer = ResponseRenderer::default();
        renderer.show_failure();
        assert_eq!(renderer.text(), FAILURE_MESSAGE);

        renderer.begin();
        assert!(renderer.in_flight());
        assert_eq!(renderer.view(), &ResponseView::Empty);
        assert_eq!(renderer.text(), "");

        renderer.show_failure();
        assert!(!renderer.in_flight());
        assert_eq!(renderer.markup(), FAILURE_MESSAGE);
    }
}
