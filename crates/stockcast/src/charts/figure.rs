//! Plotly figure documents

use crate::error::Result;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A Plotly figure: trace list plus layout, serialized as `{data, layout}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn new(layout: Value) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn add_trace(&mut self, trace: Value) {
        self.data.push(trace);
    }

    /// Trace with the given `name`, if any
    pub fn trace(&self, name: &str) -> Option<&Value> {
        self.data.iter().find(|t| t["name"] == name)
    }

    pub fn has_trace(&self, name: &str) -> bool {
        self.trace(name).is_some()
    }

    pub fn title(&self) -> &str {
        self.layout["title"]["text"].as_str().unwrap_or("Chart")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Standalone page that renders the figure with plotly.js
    pub fn to_html(&self) -> Result<String> {
        // Keep the payload from closing the script element early.
        let payload = self.to_json()?.replace("</", "<\\/");
        let title = escape_html(self.title());

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body style="margin:0;background:{DARK_BACKGROUND}">
<div id="chart" style="width:100%;height:100vh"></div>
<script>
const figure = {payload};
Plotly.newPlot("chart", figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#
        ))
    }

    /// Write `<stem>.json` and `<stem>.html` into `dir`
    pub fn write(&self, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;
        let json_path = dir.join(format!("{stem}.json"));
        let html_path = dir.join(format!("{stem}.html"));
        fs::write(&json_path, self.to_json()?)?;
        fs::write(&html_path, self.to_html()?)?;
        Ok((json_path, html_path))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) const DARK_BACKGROUND: &str = "#111111";

/// Colors and fonts for a dark chart
pub(crate) fn dark_theme() -> Value {
    json!({
        "paper_bgcolor": DARK_BACKGROUND,
        "plot_bgcolor": DARK_BACKGROUND,
        "font": {"color": "#f2f5fa"},
        "colorway": ["#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3"],
    })
}

/// Merge `overrides` into the dark theme, key by key at the top level
pub(crate) fn themed_layout(overrides: Value) -> Value {
    let mut layout = dark_theme();
    if let (Some(base), Value::Object(extra)) = (layout.as_object_mut(), overrides) {
        base.extend(extra);
    }
    layout
}

pub(crate) fn axis_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Missing values become JSON null so Plotly leaves a gap
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// The next `count` weekdays after `last`
pub fn business_days_after(last: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    let mut days = Vec::with_capacity(count);
    let mut day = last;
    while days.len() < count {
        day += Duration::days(1);
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn figure() -> Figure {
        let mut figure = Figure::new(themed_layout(json!({"title": {"text": "AAPL <Price>"}})));
        figure.add_trace(json!({"type": "scatter", "name": "Close", "x": ["2024-01-02"], "y": [1.0]}));
        figure
    }

    #[test]
    fn test_figure_json_shape() {
        let value: Value = serde_json::from_str(&figure().to_json().unwrap()).unwrap();
        assert_eq!(value["data"][0]["name"], "Close");
        assert_eq!(value["layout"]["paper_bgcolor"], DARK_BACKGROUND);
        assert!(figure().has_trace("Close"));
        assert!(!figure().has_trace("Volume"));
    }

    #[test]
    fn test_html_embeds_figure() {
        let mut figure = figure();
        figure.add_trace(json!({"name": "</script><b>"}));
        let html = figure.to_html().unwrap();

        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<title>AAPL &lt;Price&gt;</title>"));
        assert!(html.contains("Plotly.newPlot"));
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn test_write_creates_both_files() {
        let dir = tempdir().unwrap();
        let (json_path, html_path) = figure().write(&dir.path().join("out"), "aapl_price").unwrap();

        assert!(json_path.ends_with("aapl_price.json"));
        let saved: Figure = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(saved, figure());
        assert!(fs::read_to_string(html_path).unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // Thursday 2024-01-04
        let thursday = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        let days: Vec<String> = business_days_after(thursday, 3)
            .into_iter()
            .map(axis_date)
            .collect();
        assert_eq!(days, vec!["2024-01-05", "2024-01-08", "2024-01-09"]);
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
    }
}
