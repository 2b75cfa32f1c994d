//! Support and resistance trend lines from local extrema

use super::regression::linear_fit;
use crate::models::PriceSeries;
use serde::{Deserialize, Serialize};

/// Neighbours on each side an extremum must beat
pub const EXTREMA_ORDER: usize = 5;

/// Most recent extrema used to fit a line
pub const MAX_ANCHORS: usize = 3;

/// Trailing samples a trend line is drawn across
pub const DISPLAY_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    Support,
    Resistance,
}

/// A fitted line `price = slope * index + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub kind: TrendKind,
    pub slope: f64,
    pub intercept: f64,
    /// `(index, close)` of the extrema the line was fitted through
    pub anchors: Vec<(usize, f64)>,
}

impl TrendLine {
    pub fn value_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// End points of the line over the last `min(window, len)` samples
    pub fn segment(&self, len: usize, window: usize) -> Option<((usize, f64), (usize, f64))> {
        let end = len.checked_sub(1)?;
        let start = len.saturating_sub(window);
        Some(((start, self.value_at(start)), (end, self.value_at(end))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendLines {
    pub support: Option<TrendLine>,
    pub resistance: Option<TrendLine>,
}

impl TrendLines {
    pub fn is_empty(&self) -> bool {
        self.support.is_none() && self.resistance.is_none()
    }
}

/// Detects trend lines through recent local highs and lows
#[derive(Debug, Clone, Copy)]
pub struct TrendDetector {
    pub order: usize,
    pub max_anchors: usize,
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self {
            order: EXTREMA_ORDER,
            max_anchors: MAX_ANCHORS,
        }
    }
}

impl TrendDetector {
    pub fn detect(&self, series: &PriceSeries) -> TrendLines {
        self.detect_closes(&series.closes())
    }

    pub fn detect_closes(&self, closes: &[f64]) -> TrendLines {
        TrendLines {
            support: self.fit(closes, TrendKind::Support),
            resistance: self.fit(closes, TrendKind::Resistance),
        }
    }

    fn fit(&self, closes: &[f64], kind: TrendKind) -> Option<TrendLine> {
        let extrema = local_extrema(closes, self.order, kind);
        let recent = &extrema[extrema.len().saturating_sub(self.max_anchors)..];
        if recent.len() < 2 {
            return None;
        }

        let xs: Vec<f64> = recent.iter().map(|&i| i as f64).collect();
        let ys: Vec<f64> = recent.iter().map(|&i| closes[i]).collect();
        let (slope, intercept) = linear_fit(&xs, &ys)?;

        Some(TrendLine {
            kind,
            slope,
            intercept,
            anchors: recent.iter().map(|&i| (i, closes[i])).collect(),
        })
    }
}

/// Indices whose close is strictly above (resistance) or below (support)
/// every other close within `order` samples on either side.
///
/// The window is clipped at the series bounds, which means the first and
/// last samples are never extrema.
pub fn local_extrema(closes: &[f64], order: usize, kind: TrendKind) -> Vec<usize> {
    let n = closes.len();
    if n < 3 || order == 0 {
        return Vec::new();
    }

    let beats = |a: f64, b: f64| match kind {
        TrendKind::Resistance => a > b,
        TrendKind::Support => a < b,
    };

    (1..n - 1)
        .filter(|&i| {
            let lo = i.saturating_sub(order);
            let hi = (i + order).min(n - 1);
            (lo..=hi)
                .filter(|&j| j != i)
                .all(|j| beats(closes[i], closes[j]))
        })
        .collect()
}
