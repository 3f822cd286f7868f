//! Three-candle pattern matchers: morning/evening star and three white
//! soldiers / three black crows.
//!
//! The star patterns accept 4 of 6 conditions; the trend patterns accept 6 of
//! 8. These only fire when a full three-candle window of valid data exists.

use super::{conditions_met, CONFIDENCE_CEILING};
use crate::geometry::CandleGeometry;
use crate::{PatternDetector, PatternKind, Ratio, Window};

impl_with_defaults!(
    MorningStarDetector,
    EveningStarDetector,
    ThreeWhiteSoldiersDetector,
    ThreeBlackCrowsDetector,
);

/// Conditions required out of the star patterns' six.
const STAR_CONDITIONS_REQUIRED: usize = 4;

/// Conditions required out of the soldier/crow patterns' eight.
const TREND_CONDITIONS_REQUIRED: usize = 6;

/// Soldiers and crows cap below the global ceiling; three candles of steady
/// follow-through is still not gap-confirmed.
const TREND_CEILING: f64 = 0.9;

/// Relative close-to-close gains closer than this count as steady progression.
const STEADY_GAIN_TOLERANCE: f64 = 0.01;

// ============================================================
// STAR PATTERNS
// ============================================================

/// Morning Star: a long red candle, a small-bodied star below it, then a
/// green candle recovering past the first body's midpoint.
#[derive(Debug, Clone)]
pub struct MorningStarDetector {
    /// Upper bound on the star candle's body fraction.
    pub max_star_body_pct: Ratio,
}

impl Default for MorningStarDetector {
    fn default() -> Self {
        Self {
            max_star_body_pct: Ratio::new_const(0.3),
        }
    }
}

impl PatternDetector for MorningStarDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::MorningStar
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let first = window.prev2?;
        let star = window.prev;
        let third = window.current;

        let met = conditions_met(&[
            first.is_red,
            star.body_pct < self.max_star_body_pct.get(),
            third.is_green,
            star.high < first.close,
            third.open > star.high,
            third.close > first.midpoint(),
        ]);
        if met < STAR_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.7 + 0.05 * (met - STAR_CONDITIONS_REQUIRED) as f64;
        if star.is_doji {
            confidence += 0.1;
        }
        if third.body > first.body {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }
}

/// Evening Star: mirror of the morning star. A long green candle, a small
/// star above it, then a red candle dropping past the first body's midpoint.
#[derive(Debug, Clone)]
pub struct EveningStarDetector {
    /// Upper bound on the star candle's body fraction.
    pub max_star_body_pct: Ratio,
}

impl Default for EveningStarDetector {
    fn default() -> Self {
        Self {
            max_star_body_pct: Ratio::new_const(0.3),
        }
    }
}

impl PatternDetector for EveningStarDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::EveningStar
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let first = window.prev2?;
        let star = window.prev;
        let third = window.current;

        let met = conditions_met(&[
            first.is_green,
            star.body_pct < self.max_star_body_pct.get(),
            third.is_red,
            star.low > first.close,
            third.open < star.low,
            third.close < first.midpoint(),
        ]);
        if met < STAR_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.7 + 0.05 * (met - STAR_CONDITIONS_REQUIRED) as f64;
        if star.is_doji {
            confidence += 0.1;
        }
        if third.body > first.body {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }
}

// ============================================================
// TREND PATTERNS
// ============================================================

/// Three White Soldiers: three green candles with rising opens and closes
/// and dominant bodies.
#[derive(Debug, Clone)]
pub struct ThreeWhiteSoldiersDetector {
    /// Body fraction all three candles must exceed for the joint condition.
    pub min_body_pct: Ratio,
}

impl Default for ThreeWhiteSoldiersDetector {
    fn default() -> Self {
        Self {
            min_body_pct: Ratio::new_const(0.6),
        }
    }
}

impl PatternDetector for ThreeWhiteSoldiersDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::ThreeWhiteSoldiers
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let first = window.prev2?;
        let second = window.prev;
        let third = window.current;

        let strong_bodies = [first, second, third]
            .iter()
            .all(|g| g.body_pct > self.min_body_pct.get());
        let met = conditions_met(&[
            first.is_green,
            second.is_green,
            third.is_green,
            second.close > first.close,
            third.close > second.close,
            second.open > first.open,
            third.open > second.open,
            strong_bodies,
        ]);
        if met < TREND_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.75 + 0.03 * (met - TREND_CONDITIONS_REQUIRED) as f64;
        if steady_progression(first, second, third) {
            confidence += 0.1;
        }
        Some(confidence.min(TREND_CEILING))
    }
}

/// Three Black Crows: mirror of the soldiers. Three red candles with falling
/// opens and closes and dominant bodies.
#[derive(Debug, Clone)]
pub struct ThreeBlackCrowsDetector {
    /// Body fraction all three candles must exceed for the joint condition.
    pub min_body_pct: Ratio,
}

impl Default for ThreeBlackCrowsDetector {
    fn default() -> Self {
        Self {
            min_body_pct: Ratio::new_const(0.6),
        }
    }
}

impl PatternDetector for ThreeBlackCrowsDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::ThreeBlackCrows
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let first = window.prev2?;
        let second = window.prev;
        let third = window.current;

        let strong_bodies = [first, second, third]
            .iter()
            .all(|g| g.body_pct > self.min_body_pct.get());
        let met = conditions_met(&[
            first.is_red,
            second.is_red,
            third.is_red,
            second.close < first.close,
            third.close < second.close,
            second.open < first.open,
            third.open < second.open,
            strong_bodies,
        ]);
        if met < TREND_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.75 + 0.03 * (met - TREND_CONDITIONS_REQUIRED) as f64;
        if steady_progression(first, second, third) {
            confidence += 0.1;
        }
        Some(confidence.min(TREND_CEILING))
    }
}

/// True when the two close-to-close moves are near-identical in relative
/// magnitude. Guarded against non-positive closes in degenerate data.
fn steady_progression(
    first: &CandleGeometry,
    second: &CandleGeometry,
    third: &CandleGeometry,
) -> bool {
    if first.close <= 0.0 || second.close <= 0.0 {
        return false;
    }
    let move1 = (second.close - first.close) / first.close;
    let move2 = (third.close - second.close) / second.close;
    (move1 - move2).abs() < STEADY_GAIN_TOLERANCE
}
