//! Moving-average and momentum indicators over close-price series.
//!
//! All functions take a plain `&[f64]` slice; pull closes out of candles
//! first (see [`close_series`]). Outputs are shorter than the input by the
//! indicator's warm-up: the first SMA/EMA value corresponds to input index
//! `period - 1`, the first RSI value to input index `period`, and the first
//! MACD value to input index `slow_period - 1`.

use crate::{Ohlc, PatternError, Result};

/// MACD output series. `macd` starts at input index `slow_period - 1`;
/// `signal` and `histogram` start `signal_period - 1` entries later.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Extract the close series from a slice of candles.
pub fn close_series<T: Ohlc>(candles: &[T]) -> Vec<f64> {
    candles.iter().map(|c| c.close()).collect()
}

/// Simple moving average. Returns one value per full window; an input
/// shorter than `period` yields an empty series.
pub fn sma(data: &[f64], period: usize) -> Result<Vec<f64>> {
    validate_period("period", period)?;
    if data.len() < period {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(data.len() - period + 1);
    let mut window_sum: f64 = data[..period].iter().sum();
    out.push(window_sum / period as f64);
    for i in period..data.len() {
        window_sum += data[i] - data[i - period];
        out.push(window_sum / period as f64);
    }
    Ok(out)
}

/// Exponential moving average with smoothing `2 / (period + 1)`, seeded with
/// the SMA of the first `period` values.
pub fn ema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    validate_period("period", period)?;
    if data.len() < period {
        return Ok(Vec::new());
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len() - period + 1);
    let mut value: f64 = data[..period].iter().sum::<f64>() / period as f64;
    out.push(value);
    for &sample in &data[period..] {
        value = alpha * sample + (1.0 - alpha) * value;
        out.push(value);
    }
    Ok(out)
}

/// MACD: fast EMA minus slow EMA, an EMA of that difference as the signal
/// line, and their gap as the histogram.
pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdOutput> {
    validate_period("fast_period", fast_period)?;
    validate_period("slow_period", slow_period)?;
    validate_period("signal_period", signal_period)?;
    if fast_period >= slow_period {
        return Err(PatternError::InvalidConfig(format!(
            "fast_period ({fast_period}) must be shorter than slow_period ({slow_period})"
        )));
    }

    let fast_ema = ema(data, fast_period)?;
    let slow_ema = ema(data, slow_period)?;

    // Both series end at the last input sample; the slow one starts later.
    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow)| fast_ema[i + offset] - slow)
        .collect();

    let signal_line = ema(&macd_line, signal_period)?;
    let histogram: Vec<f64> = signal_line
        .iter()
        .enumerate()
        .map(|(i, signal)| macd_line[i + signal_period - 1] - signal)
        .collect();

    Ok(MacdOutput {
        macd: macd_line,
        signal: signal_line,
        histogram,
    })
}

/// Relative strength index with Wilder smoothing. The first output value
/// corresponds to input index `period`; an input of `period + 1` samples
/// yields exactly one value.
pub fn rsi(data: &[f64], period: usize) -> Result<Vec<f64>> {
    validate_period("period", period)?;
    if data.len() <= period {
        return Ok(Vec::new());
    }

    let gains_losses: Vec<(f64, f64)> = data
        .windows(2)
        .map(|pair| {
            let delta = pair[1] - pair[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .collect();

    let mut avg_gain: f64 =
        gains_losses[..period].iter().map(|&(g, _)| g).sum::<f64>() / period as f64;
    let mut avg_loss: f64 =
        gains_losses[..period].iter().map(|&(_, l)| l).sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(data.len() - period);
    out.push(rsi_value(avg_gain, avg_loss));
    for &(gain, loss) in &gains_losses[period..] {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    Ok(out)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

fn validate_period(name: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(PatternError::InvalidConfig(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(())
}
