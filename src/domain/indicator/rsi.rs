//! RSI (Relative Strength Index) indicator.
//!
//! Average gain and average loss are trailing n-period simple means of the
//! zero-clamped positive and negative close-to-close deltas.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If avg_loss == 0 and avg_gain == 0 (flat window): RSI = 50
//!
//! Warmup: first n slots are unavailable (n deltas need n+1 closes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

/// RSI reported for a window with no price movement at all.
pub const FLAT_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    let mut values = vec![None; closes.len()];

    if period > 0 && closes.len() > period {
        let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
        let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

        // gains[j] is the delta ending at close j+1.
        for end in period..closes.len() {
            let from = end - period;
            let avg_gain = gains[from..end].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[from..end].iter().sum::<f64>() / period as f64;
            values[end] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { FLAT_RSI } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
