//! Exponential Moving Average indicator.
//!
//! alpha = 2/(n+1). Recursive form, seeded with the first defined input s:
//! EMA[s] = X[s], EMA[i] = EMA[i-1] + alpha*(X[i] - EMA[i-1]).
//! Written in the incremental form so a constant input stays exactly constant.
//! The seed slot itself is reported unavailable, so over a close series the
//! EMA is undefined only at position 0.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_ema(closes: &[f64], span: usize) -> IndicatorSeries {
    let input: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values: ema_values(&input, span),
    }
}

/// EMA over a series that may itself start with unavailable slots
/// (used for the MACD signal line).
///
/// Unavailable inputs after the seed produce unavailable outputs and leave
/// the running average untouched.
pub(crate) fn ema_values(input: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; input.len()];
    if span == 0 {
        return values;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema: Option<f64> = None;

    for (i, x) in input.iter().enumerate() {
        let Some(x) = *x else { continue };
        match ema {
            None => ema = Some(x),
            Some(prev) => {
                let next = prev + alpha * (x - prev);
                ema = Some(next);
                values[i] = Some(next);
            }
        }
    }

    values
}
