//! Price series, history periods and the cached stock snapshot

use crate::error::{Result, StockError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One trading period (OHLCV)
///
/// Missing values serialize as JSON `null` and read back as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    #[serde(deserialize_with = "nan_if_null")]
    pub open: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub high: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub low: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub close: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub volume: f64,
}

fn nan_if_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Date-ordered price history with strictly increasing, unique dates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting by date. Duplicate dates are rejected.
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self> {
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(StockError::InvalidHistory(format!(
                "duplicate bar for {}",
                pair[0].date.to_rfc3339()
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

/// History window accepted by the market data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 9] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Whether the window always reaches back at least one year
    pub fn covers_one_year(self) -> bool {
        matches!(
            self,
            Period::OneYear | Period::TwoYears | Period::FiveYears | Period::TenYears | Period::Max
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(StockError::InvalidPeriod(s))
    }
}

/// Price history as stored in a snapshot.
///
/// The cache writes the encoded JSON text form; structured records are
/// accepted too so snapshots built in memory need no round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    Encoded(String),
    Records(Vec<PriceBar>),
}

impl HistoryPayload {
    /// Encode a series into its textual cache form
    pub fn encode(series: &PriceSeries) -> Result<Self> {
        Ok(Self::Encoded(serde_json::to_string(series.bars())?))
    }

    /// Decode back into an ordered series
    pub fn decode(&self) -> Result<PriceSeries> {
        match self {
            Self::Records(bars) => PriceSeries::new(bars.clone()),
            Self::Encoded(text) => {
                let value: serde_json::Value = serde_json::from_str(text)?;
                match value {
                    serde_json::Value::Array(rows) => PriceSeries::new(
                        serde_json::from_value(serde_json::Value::Array(rows))?,
                    ),
                    serde_json::Value::Object(columns) => decode_columns(columns),
                    other => Err(StockError::InvalidHistory(format!(
                        "expected array or object, found {other}"
                    ))),
                }
            }
        }
    }
}

type Column = BTreeMap<String, Option<f64>>;

/// Column-oriented frame: `{"Close": {"<date>": value, ...}, ...}`.
/// Dates are ISO-8601 strings or epoch milliseconds; nulls become NaN.
fn decode_columns(columns: serde_json::Map<String, serde_json::Value>) -> Result<PriceSeries> {
    let mut frame: BTreeMap<String, Column> = BTreeMap::new();
    for (name, column) in columns {
        frame.insert(name.to_ascii_lowercase(), serde_json::from_value(column)?);
    }

    let close = frame
        .get("close")
        .ok_or_else(|| StockError::InvalidHistory("missing Close column".to_string()))?;

    let value_at = |column: &str, key: &str, fallback: f64| -> f64 {
        frame
            .get(column)
            .and_then(|c| c.get(key))
            .map_or(fallback, |v| v.unwrap_or(f64::NAN))
    };

    let mut bars = Vec::with_capacity(close.len());
    for (key, close_value) in close {
        let close_value = close_value.unwrap_or(f64::NAN);
        bars.push(PriceBar {
            date: parse_frame_date(key)?,
            open: value_at("open", key, close_value),
            high: value_at("high", key, close_value),
            low: value_at("low", key, close_value),
            close: close_value,
            volume: value_at("volume", key, 1.0),
        });
    }

    PriceSeries::new(bars)
}

fn parse_frame_date(key: &str) -> Result<DateTime<Utc>> {
    if let Ok(millis) = key.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| StockError::InvalidHistory(format!("timestamp out of range: {key}")));
    }
    DateTime::parse_from_rfc3339(key)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StockError::InvalidHistory(format!("bad date {key}: {e}")))
}

/// Snapshot fields plus history for one (symbol, period).
///
/// Field names on the wire follow the quote-summary naming used by the
/// cache files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(rename = "fiftyTwoWeekHigh")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "fiftyTwoWeekLow")]
    pub fifty_two_week_low: Option<f64>,
    pub history: HistoryPayload,
}

impl StockSnapshot {
    /// Decode the history into an ordered series
    pub fn series(&self) -> Result<PriceSeries> {
        self.history.decode()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Daily bars starting 2024-01-02 with the given closes and constant volume
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }
}
