//! Three-panel momentum chart: price with EMAs, RSI, MACD

use super::figure::{Figure, axis_date, finite, themed_layout};
use crate::analysis::Momentum;
use crate::models::PriceSeries;
use serde_json::{Value, json};

// Row domains for heights 0.5 / 0.25 / 0.25 with 0.03 spacing, top to bottom.
const ROW_DOMAINS: [[f64; 2]; 3] = [[0.53, 1.0], [0.265, 0.5], [0.0, 0.235]];
const ROW_TITLES: [&str; 3] = ["Price with Moving Averages", "RSI", "MACD"];

pub fn indicator_chart(symbol: &str, series: &PriceSeries, momentum: &Momentum) -> Figure {
    let mut figure = Figure::new(layout(symbol));
    let dates: Vec<String> = series.dates().into_iter().map(axis_date).collect();

    figure.add_trace(line(&dates, &values(&series.closes()), "Close Price", "#1f77b4", 2, 1));
    figure.add_trace(line(&dates, &values(&momentum.ema_fast), "EMA 12", "orange", 1, 1));
    figure.add_trace(line(&dates, &values(&momentum.ema_slow), "EMA 26", "red", 1, 1));

    let rsi: Vec<Option<f64>> = momentum.rsi.iter().map(|v| v.and_then(finite)).collect();
    figure.add_trace(line(&dates, &rsi, "RSI", "purple", 2, 2));

    figure.add_trace(line(&dates, &values(&momentum.macd), "MACD", "blue", 2, 3));
    figure.add_trace(line(&dates, &values(&momentum.signal), "Signal", "red", 2, 3));

    let colors: Vec<&str> = momentum
        .histogram
        .iter()
        .map(|v| if *v >= 0.0 { "green" } else { "red" })
        .collect();
    figure.add_trace(json!({
        "type": "bar",
        "name": "MACD Histogram",
        "x": dates,
        "y": values(&momentum.histogram),
        "marker": {"color": colors},
        "opacity": 0.6,
        "xaxis": "x3",
        "yaxis": "y3",
    }));

    figure
}

fn values(v: &[f64]) -> Vec<Option<f64>> {
    v.iter().copied().map(finite).collect()
}

fn line(dates: &[String], y: &[Option<f64>], name: &str, color: &str, width: u32, row: usize) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "name": name,
        "x": dates,
        "y": y,
        "line": {"color": color, "width": width},
        "xaxis": axis_ref("x", row),
        "yaxis": axis_ref("y", row),
    })
}

/// Plotly's axis naming per row: `x`, `x2`, `x3` (likewise `xaxis2`, ...)
fn axis_ref(axis: &str, row: usize) -> String {
    if row == 1 {
        axis.to_string()
    } else {
        format!("{axis}{row}")
    }
}

/// Horizontal reference line across a row
fn hline(y: f64, row: usize, dash: &str, color: &str) -> Value {
    json!({
        "type": "line",
        "xref": format!("{} domain", axis_ref("x", row)),
        "yref": axis_ref("y", row),
        "x0": 0,
        "x1": 1,
        "y0": y,
        "y1": y,
        "line": {"dash": dash, "color": color},
    })
}

fn layout(symbol: &str) -> Value {
    let mut layout = json!({
        "title": {"text": format!("{symbol}: Advanced Technical Indicators")},
        "height": 800,
        "showlegend": true,
        "shapes": [
            hline(70.0, 2, "dash", "red"),
            hline(30.0, 2, "dash", "green"),
            hline(50.0, 2, "dot", "gray"),
            hline(0.0, 3, "solid", "gray"),
        ],
        "annotations": ROW_TITLES
            .iter()
            .zip(ROW_DOMAINS)
            .map(|(title, domain)| json!({
                "text": title,
                "showarrow": false,
                "xref": "paper",
                "yref": "paper",
                "x": 0.5,
                "y": domain[1],
                "xanchor": "center",
                "yanchor": "bottom",
            }))
            .collect::<Vec<_>>(),
    });

    // Rows share the bottom x axis; only it shows tick labels.
    for (i, domain) in ROW_DOMAINS.iter().enumerate() {
        let row = i + 1;
        let x_axis = if row == 3 {
            json!({"anchor": "y3", "domain": [0.0, 1.0], "type": "date"})
        } else {
            json!({
                "anchor": axis_ref("y", row),
                "domain": [0.0, 1.0],
                "matches": "x3",
                "showticklabels": false,
            })
        };
        let y_axis = json!({"anchor": axis_ref("x", row), "domain": domain});
        layout[axis_ref("xaxis", row)] = x_axis;
        layout[axis_ref("yaxis", row)] = y_axis;
    }
    layout["yaxis2"]["range"] = json!([0, 100]);

    themed_layout(layout)
}
