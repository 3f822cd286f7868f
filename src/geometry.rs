//! Candle geometry: normalized shape metrics derived from one OHLC sample,
//! plus the validation guard that keeps malformed candles out of the matchers.

use crate::Ohlc;

/// A body smaller than this fraction of the total range counts as a doji.
pub const DOJI_BODY_RATIO: f64 = 0.1;

/// Normalized shape metrics for a single candle. Derived on demand, never
/// persisted.
///
/// Percentage fields are fractions of the total range and are defined as 0
/// when the range is 0, so matchers never see non-finite values. Raw OHLC is
/// carried along so matchers can be pure functions of geometries alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleGeometry {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `|close - open|`
    pub body: f64,
    /// `high - max(open, close)`
    pub upper_shadow: f64,
    /// `min(open, close) - low`
    pub lower_shadow: f64,
    /// `high - low`
    pub total_range: f64,
    pub is_green: bool,
    pub is_red: bool,
    pub is_doji: bool,
    /// `body / total_range`, 0 when the range is 0.
    pub body_pct: f64,
    /// `upper_shadow / total_range`, 0 when the range is 0.
    pub upper_pct: f64,
    /// `lower_shadow / total_range`, 0 when the range is 0.
    pub lower_pct: f64,
}

impl CandleGeometry {
    /// Compute the shape metrics of one candle. Pure and total: a zero range
    /// yields zero for every percentage field rather than NaN.
    pub fn of<T: Ohlc>(candle: &T) -> Self {
        let (open, high, low, close) = (
            candle.open(),
            candle.high(),
            candle.low(),
            candle.close(),
        );
        let body = (close - open).abs();
        let upper_shadow = high - open.max(close);
        let lower_shadow = open.min(close) - low;
        let total_range = high - low;
        let pct = |part: f64| {
            if total_range > 0.0 {
                part / total_range
            } else {
                0.0
            }
        };

        Self {
            open,
            high,
            low,
            close,
            body,
            upper_shadow,
            lower_shadow,
            total_range,
            is_green: close > open,
            is_red: close < open,
            is_doji: body < DOJI_BODY_RATIO * total_range,
            body_pct: pct(body),
            upper_pct: pct(upper_shadow),
            lower_pct: pct(lower_shadow),
        }
    }

    /// Midpoint of the real body.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }
}

/// Validation guard: true iff all four prices are finite and the OHLC
/// envelope invariant holds: `high >= max(open, close)`,
/// `low <= min(open, close)`, `high > low`.
///
/// Invalid candles are excluded from detection at their position but do not
/// abort a scan; neighbors are still evaluated where possible.
pub fn is_valid<T: Ohlc>(candle: &T) -> bool {
    let (o, h, l, c) = (candle.open(), candle.high(), candle.low(), candle.close());
    if !(o.is_finite() && h.is_finite() && l.is_finite() && c.is_finite()) {
        return false;
    }
    h >= o.max(c) && l <= o.min(c) && h > l
}
