//! Candlestick chart with trend lines and forecast overlay

use super::figure::{Figure, axis_date, business_days_after, finite, themed_layout};
use crate::analysis::{Forecast, TrendLine, TrendLines};
use crate::models::PriceSeries;
use serde_json::{Value, json};

pub const RESISTANCE_TRACE: &str = "Resistance Trend";
pub const SUPPORT_TRACE: &str = "Support Trend";
pub const FORECAST_TRACE: &str = "Median Forecast";
pub const BAND_TRACE: &str = "Forecast Range (95% CI)";
pub const CONNECTOR_TRACE: &str = "Forecast Connector";

/// Price chart for `symbol`.
///
/// Trend lines are drawn over the last `window` samples. The forecast
/// overlay is added only when `forecast` is given.
pub fn price_chart(
    symbol: &str,
    series: &PriceSeries,
    trends: &TrendLines,
    forecast: Option<&Forecast>,
    window: usize,
) -> Figure {
    let mut figure = Figure::new(layout(symbol));
    let dates: Vec<String> = series.dates().into_iter().map(axis_date).collect();
    let bars = series.bars();

    figure.add_trace(json!({
        "type": "candlestick",
        "name": "OHLC",
        "x": dates,
        "open": bars.iter().map(|b| finite(b.open)).collect::<Vec<_>>(),
        "high": bars.iter().map(|b| finite(b.high)).collect::<Vec<_>>(),
        "low": bars.iter().map(|b| finite(b.low)).collect::<Vec<_>>(),
        "close": bars.iter().map(|b| finite(b.close)).collect::<Vec<_>>(),
        "increasing": {"line": {"color": "#00ff88"}},
        "decreasing": {"line": {"color": "#ff4444"}},
    }));

    if let Some(line) = &trends.resistance {
        if let Some(trace) = trend_trace(line, &dates, window, RESISTANCE_TRACE, "red") {
            figure.add_trace(trace);
        }
    }
    if let Some(line) = &trends.support {
        if let Some(trace) = trend_trace(line, &dates, window, SUPPORT_TRACE, "green") {
            figure.add_trace(trace);
        }
    }

    if let (Some(forecast), Some(last)) = (forecast, series.last()) {
        add_forecast(&mut figure, forecast, last.date, last.close);
    }

    figure
}

fn trend_trace(
    line: &TrendLine,
    dates: &[String],
    window: usize,
    name: &str,
    color: &str,
) -> Option<Value> {
    let ((start, start_price), (end, end_price)) = line.segment(dates.len(), window)?;
    Some(json!({
        "type": "scatter",
        "mode": "lines",
        "name": name,
        "x": [dates[start], dates[end]],
        "y": [start_price, end_price],
        "line": {"color": color, "width": 2, "dash": "dash"},
        "showlegend": true,
    }))
}

fn add_forecast(
    figure: &mut Figure,
    forecast: &Forecast,
    last_date: chrono::DateTime<chrono::Utc>,
    last_close: f64,
) {
    let Some(first) = forecast.points.first() else {
        return;
    };
    let future: Vec<String> = business_days_after(last_date, forecast.points.len())
        .into_iter()
        .map(axis_date)
        .collect();

    figure.add_trace(json!({
        "type": "scatter",
        "mode": "lines",
        "name": FORECAST_TRACE,
        "x": future,
        "y": forecast.prices(),
        "line": {"color": "orange", "width": 3},
        "showlegend": true,
    }));

    // Closed polygon: upper bounds forward, lower bounds back.
    let band_x: Vec<&String> = future.iter().chain(future.iter().rev()).collect();
    let band_y: Vec<f64> = forecast
        .points
        .iter()
        .map(|p| p.interval.upper)
        .chain(forecast.points.iter().rev().map(|p| p.interval.lower))
        .collect();
    figure.add_trace(json!({
        "type": "scatter",
        "name": BAND_TRACE,
        "x": band_x,
        "y": band_y,
        "fill": "toself",
        "fillcolor": "rgba(255, 165, 0, 0.3)",
        "line": {"color": "rgba(255, 165, 0, 0)"},
        "showlegend": true,
    }));

    figure.add_trace(json!({
        "type": "scatter",
        "mode": "lines",
        "name": CONNECTOR_TRACE,
        "x": [axis_date(last_date), future[0]],
        "y": [finite(last_close), first.price],
        "line": {"color": "orange", "width": 2, "dash": "dot"},
        "showlegend": false,
    }));
}

fn layout(symbol: &str) -> Value {
    themed_layout(json!({
        "title": {
            "text": format!("{symbol}: Candlestick Chart with Trend Lines and Forecast"),
            "x": 0.5,
            "font": {"size": 18},
        },
        "height": 700,
        "showlegend": true,
        "legend": {
            "yanchor": "top",
            "y": 0.99,
            "xanchor": "left",
            "x": 0.01,
            "bgcolor": "rgba(0,0,0,0.5)",
        },
        "xaxis": {
            "title": {"text": "Date"},
            "type": "date",
            "rangeslider": {"visible": false},
        },
        "yaxis": {
            "title": {"text": "Price ($)"},
            "fixedrange": false,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Forecaster, TrendDetector};
    use crate::models::test_support::series_from_closes;
    use std::f64::consts::PI;

    fn wave_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 * 0.2 + 8.0 * (i as f64 * PI / 10.0).sin())
            .collect();
        series_from_closes(&closes)
    }

    #[test]
    fn test_full_price_chart() {
        let series = wave_series(120);
        let trends = TrendDetector::default().detect(&series);
        let forecast = Forecaster::default().forecast(&series).unwrap();

        let figure = price_chart("AAPL", &series, &trends, Some(&forecast), 100);

        assert_eq!(figure.data[0]["type"], "candlestick");
        assert_eq!(figure.data[0]["x"].as_array().unwrap().len(), 120);
        assert!(figure.has_trace(RESISTANCE_TRACE));
        assert!(figure.has_trace(SUPPORT_TRACE));

        let resistance = figure.trace(RESISTANCE_TRACE).unwrap();
        assert_eq!(resistance["line"]["dash"], "dash");
        // Drawn across the last 100 of 120 samples.
        assert_eq!(resistance["x"][0], figure.data[0]["x"][20]);

        let median = figure.trace(FORECAST_TRACE).unwrap();
        assert_eq!(median["y"].as_array().unwrap().len(), 15);
        assert_eq!(figure.trace(BAND_TRACE).unwrap()["x"].as_array().unwrap().len(), 30);

        let connector = figure.trace(CONNECTOR_TRACE).unwrap();
        assert_eq!(connector["x"][0], figure.data[0]["x"][119]);
        assert_eq!(connector["x"][1], median["x"][0]);
        assert!(figure.title().starts_with("AAPL"));
    }

    #[test]
    fn test_no_forecast_overlay() {
        let series = wave_series(60);
        let trends = TrendDetector::default().detect(&series);
        let figure = price_chart("MSFT", &series, &trends, None, 100);

        assert!(!figure.has_trace(FORECAST_TRACE));
        assert!(!figure.has_trace(BAND_TRACE));
        assert!(!figure.has_trace(CONNECTOR_TRACE));
    }

    #[test]
    fn test_short_series_has_candles_only() {
        let series = series_from_closes(&[10.0, 11.0, 12.0, 11.5, 12.5]);
        let trends = TrendDetector::default().detect(&series);
        let figure = price_chart("TSLA", &series, &trends, None, 100);

        assert_eq!(figure.data.len(), 1);
    }

    #[test]
    fn test_missing_values_serialize_as_null() {
        let mut bars = series_from_closes(&[10.0, 11.0]).bars().to_vec();
        bars[1].open = f64::NAN;
        let series = PriceSeries::new(bars).unwrap();
        let figure = price_chart("X", &series, &TrendLines::default(), None, 100);

        assert!(figure.data[0]["open"][1].is_null());
        assert_eq!(figure.data[0]["close"][1], 11.0);
    }
}
