//! Momentum indicators for the indicator chart

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use ta::{
    Next,
    indicators::{ExponentialMovingAverage, SimpleMovingAverage},
};

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;
pub const RSI_PERIOD: usize = 14;

/// Indicator columns aligned with the input closes.
///
/// `rsi` is `None` until a full window of price changes exists, and where
/// the window has neither gains nor losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
}

impl Momentum {
    pub fn compute(closes: &[f64]) -> Result<Self> {
        let mut fast = ema(FAST_PERIOD)?;
        let mut slow = ema(SLOW_PERIOD)?;
        let mut signal_ema = ema(SIGNAL_PERIOD)?;

        let n = closes.len();
        let mut ema_fast = Vec::with_capacity(n);
        let mut ema_slow = Vec::with_capacity(n);
        let mut macd = Vec::with_capacity(n);
        let mut signal = Vec::with_capacity(n);
        let mut histogram = Vec::with_capacity(n);

        for &close in closes {
            let e_fast = fast.next(close);
            let e_slow = slow.next(close);
            let line = e_fast - e_slow;
            let sig = signal_ema.next(line);

            ema_fast.push(e_fast);
            ema_slow.push(e_slow);
            macd.push(line);
            signal.push(sig);
            histogram.push(line - sig);
        }

        Ok(Self {
            ema_fast,
            ema_slow,
            macd,
            signal,
            histogram,
            rsi: rsi(closes, RSI_PERIOD)?,
        })
    }
}

fn ema(period: usize) -> Result<ExponentialMovingAverage> {
    ExponentialMovingAverage::new(period).map_err(|e| StockError::IndicatorError(e.to_string()))
}

/// RSI from simple rolling means of gains and losses
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut gains = SimpleMovingAverage::new(period)
        .map_err(|e| StockError::IndicatorError(e.to_string()))?;
    let mut losses = SimpleMovingAverage::new(period)
        .map_err(|e| StockError::IndicatorError(e.to_string()))?;

    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return Ok(out);
    }
    out.push(None);

    for (i, w) in closes.windows(2).enumerate() {
        let change = w[1] - w[0];
        let avg_gain = gains.next(change.max(0.0));
        let avg_loss = losses.next((-change).max(0.0));

        // Index i + 1 has seen i + 1 changes.
        if i + 1 < period || !change.is_finite() {
            out.push(None);
            continue;
        }
        out.push(match (avg_gain, avg_loss) {
            (g, l) if l > 0.0 => Some(100.0 - 100.0 / (1.0 + g / l)),
            (g, _) if g > 0.0 => Some(100.0),
            _ => None,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_are_aligned() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + f64::from(i % 9)).collect();
        let m = Momentum::compute(&closes).unwrap();

        assert_eq!(m.ema_fast.len(), 50);
        assert_eq!(m.macd.len(), 50);
        assert_eq!(m.rsi.len(), 50);
        for i in 0..50 {
            assert!((m.macd[i] - (m.ema_fast[i] - m.ema_slow[i])).abs() < 1e-12);
            assert!((m.histogram[i] - (m.macd[i] - m.signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ema_starts_at_first_close() {
        let m = Momentum::compute(&[10.0, 20.0]).unwrap();
        assert_eq!(m.ema_fast[0], 10.0);
        // k = 2 / 13
        assert!((m.ema_fast[1] - (10.0 + 10.0 * 2.0 / 13.0)).abs() < 1e-12);
        assert_eq!(m.macd[0], 0.0);
    }

    #[test]
    fn test_rsi_warmup_and_extremes() {
        let rising: Vec<f64> = (0..20).map(f64::from).collect();
        let values = rsi(&rising, 14).unwrap();
        assert!(values[..14].iter().all(Option::is_none));
        assert_eq!(values[14], Some(100.0));

        let flat = vec![5.0; 20];
        assert!(rsi(&flat, 14).unwrap().iter().all(Option::is_none));
        assert!(rsi(&[], 14).unwrap().is_empty());
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // Alternating +1 / -1: equal average gain and loss.
        let closes: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let values = rsi(&closes, 14).unwrap();
        assert!((values[20].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (f64::from(i) * 0.7).sin() * 5.0 + f64::from(i) * 0.1)
            .collect();
        for value in rsi(&closes, 14).unwrap().into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}
