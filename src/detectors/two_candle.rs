//! Two-candle pattern matchers: bullish/bearish engulfing and tweezer
//! top/bottom. All of them are strict conjunctions over the adjacent pair.

use super::CONFIDENCE_CEILING;
use crate::{PatternDetector, PatternKind, Result, Window};

impl_with_defaults!(
    BullishEngulfingDetector,
    BearishEngulfingDetector,
    TweezerTopDetector,
    TweezerBottomDetector,
);

/// Tweezer confidence never exceeds this; matching extremes alone are a
/// weaker signal than a full engulfing body.
const TWEEZER_CEILING: f64 = 0.9;

// ============================================================
// ENGULFING PATTERNS
// ============================================================

/// Bullish Engulfing: a green body that opens below the prior red close and
/// closes above the prior red open, with a meaningfully larger body.
#[derive(Debug, Clone)]
pub struct BullishEngulfingDetector {
    /// Current body must exceed this multiple of the previous body.
    pub min_engulf_ratio: f64,
}

impl Default for BullishEngulfingDetector {
    fn default() -> Self {
        Self {
            min_engulf_ratio: 1.1,
        }
    }
}

impl PatternDetector for BullishEngulfingDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::BullishEngulfing
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let (prev, curr) = (window.prev, window.current);

        if !(prev.is_red && curr.is_green) {
            return None;
        }
        if !(curr.open < prev.close && curr.close > prev.open) {
            return None;
        }
        if curr.body <= self.min_engulf_ratio * prev.body {
            return None;
        }

        // prev.is_red guarantees a non-zero previous body
        let engulf_ratio = curr.body / prev.body;
        let mut confidence: f64 = 0.8;
        if engulf_ratio > 1.5 {
            confidence += 0.1;
        }
        if engulf_ratio > 2.0 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_engulf_ratio(self.min_engulf_ratio)
    }
}

/// Bearish Engulfing: exact mirror of the bullish variant, red engulfing
/// green.
#[derive(Debug, Clone)]
pub struct BearishEngulfingDetector {
    /// Current body must exceed this multiple of the previous body.
    pub min_engulf_ratio: f64,
}

impl Default for BearishEngulfingDetector {
    fn default() -> Self {
        Self {
            min_engulf_ratio: 1.1,
        }
    }
}

impl PatternDetector for BearishEngulfingDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::BearishEngulfing
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let (prev, curr) = (window.prev, window.current);

        if !(prev.is_green && curr.is_red) {
            return None;
        }
        if !(curr.open > prev.close && curr.close < prev.open) {
            return None;
        }
        if curr.body <= self.min_engulf_ratio * prev.body {
            return None;
        }

        let engulf_ratio = curr.body / prev.body;
        let mut confidence: f64 = 0.8;
        if engulf_ratio > 1.5 {
            confidence += 0.1;
        }
        if engulf_ratio > 2.0 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_engulf_ratio(self.min_engulf_ratio)
    }
}

// ============================================================
// TWEEZER PATTERNS
// ============================================================

/// Tweezer Top: two candles with matching highs, a green candle followed by
/// a red one closing below the first close.
#[derive(Debug, Clone)]
pub struct TweezerTopDetector {
    /// Relative tolerance for "matching" highs (fraction of the average high).
    pub tolerance: f64,
}

impl Default for TweezerTopDetector {
    fn default() -> Self {
        Self { tolerance: 0.002 }
    }
}

impl PatternDetector for TweezerTopDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::TweezerTop
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let (prev, curr) = (window.prev, window.current);

        let avg_high = (prev.high + curr.high) / 2.0;
        let diff = (prev.high - curr.high).abs();
        let tolerance = self.tolerance * avg_high;

        let matched = diff <= tolerance
            && prev.is_green
            && curr.is_red
            && curr.close < prev.close;
        if !matched {
            return None;
        }

        let mut confidence: f64 = 0.75;
        if diff <= tolerance / 2.0 {
            confidence += 0.1;
        }
        if curr.body > prev.body {
            confidence += 0.05;
        }
        Some(confidence.min(TWEEZER_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_tolerance(self.tolerance)
    }
}

/// Tweezer Bottom: mirror of the tweezer top on the lows. Bullish.
#[derive(Debug, Clone)]
pub struct TweezerBottomDetector {
    /// Relative tolerance for "matching" lows (fraction of the average low).
    pub tolerance: f64,
}

impl Default for TweezerBottomDetector {
    fn default() -> Self {
        Self { tolerance: 0.002 }
    }
}

impl PatternDetector for TweezerBottomDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::TweezerBottom
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let (prev, curr) = (window.prev, window.current);

        let avg_low = (prev.low + curr.low) / 2.0;
        let diff = (prev.low - curr.low).abs();
        let tolerance = self.tolerance * avg_low;

        let matched = diff <= tolerance
            && prev.is_red
            && curr.is_green
            && curr.close > prev.close;
        if !matched {
            return None;
        }

        let mut confidence: f64 = 0.75;
        if diff <= tolerance / 2.0 {
            confidence += 0.1;
        }
        if curr.body > prev.body {
            confidence += 0.05;
        }
        Some(confidence.min(TWEEZER_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_tolerance(self.tolerance)
    }
}

fn validate_engulf_ratio(ratio: f64) -> Result<()> {
    if !ratio.is_finite() || ratio < 1.0 {
        return Err(crate::PatternError::InvalidConfig(format!(
            "min_engulf_ratio must be a finite number >= 1.0, got {ratio}"
        )));
    }
    Ok(())
}

fn validate_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(crate::PatternError::InvalidConfig(format!(
            "tolerance must be a positive finite number, got {tolerance}"
        )));
    }
    Ok(())
}
