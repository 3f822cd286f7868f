//! Single-candle pattern matchers: hammer, inverted hammer, dragonfly doji,
//! gravestone doji.
//!
//! The hammer family uses a threshold-of-N rule (at least 3 of 4 shape
//! conditions); the doji variants are strict conjunctions.

use super::{conditions_met, CONFIDENCE_CEILING};
use crate::{PatternDetector, PatternKind, Ratio, Result, Window};

impl_with_defaults!(
    HammerDetector,
    InvertedHammerDetector,
    DragonflyDojiDetector,
    GravestoneDojiDetector,
);

/// Shape conditions required out of the hammer family's four.
const HAMMER_CONDITIONS_REQUIRED: usize = 3;

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer: small body near the top of the range with a dominant lower shadow.
#[derive(Debug, Clone)]
pub struct HammerDetector {
    pub max_body_pct: Ratio,
    pub min_lower_pct: Ratio,
    pub max_upper_pct: Ratio,
    /// The lower shadow must exceed this multiple of the body.
    pub min_shadow_body_ratio: f64,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            max_body_pct: Ratio::new_const(0.3),
            min_lower_pct: Ratio::new_const(0.5),
            max_upper_pct: Ratio::new_const(0.2),
            min_shadow_body_ratio: 2.0,
        }
    }
}

impl PatternDetector for HammerDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Hammer
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let g = window.current;

        let met = conditions_met(&[
            g.body_pct < self.max_body_pct.get(),
            g.lower_pct > self.min_lower_pct.get(),
            g.upper_pct < self.max_upper_pct.get(),
            g.lower_shadow > self.min_shadow_body_ratio * g.body,
        ]);
        if met < HAMMER_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.75 + 0.05 * (met - HAMMER_CONDITIONS_REQUIRED) as f64;
        if g.lower_pct > 0.6 {
            confidence += 0.1;
        }
        if g.upper_pct < 0.1 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_shadow_body_ratio(self.min_shadow_body_ratio)
    }
}

/// Inverted Hammer: mirror of the hammer on the upper shadow. Scored as a
/// bearish rejection of higher prices.
#[derive(Debug, Clone)]
pub struct InvertedHammerDetector {
    pub max_body_pct: Ratio,
    pub min_upper_pct: Ratio,
    pub max_lower_pct: Ratio,
    /// The upper shadow must exceed this multiple of the body.
    pub min_shadow_body_ratio: f64,
}

impl Default for InvertedHammerDetector {
    fn default() -> Self {
        Self {
            max_body_pct: Ratio::new_const(0.3),
            min_upper_pct: Ratio::new_const(0.5),
            max_lower_pct: Ratio::new_const(0.2),
            min_shadow_body_ratio: 2.0,
        }
    }
}

impl PatternDetector for InvertedHammerDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::InvertedHammer
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let g = window.current;

        let met = conditions_met(&[
            g.body_pct < self.max_body_pct.get(),
            g.upper_pct > self.min_upper_pct.get(),
            g.lower_pct < self.max_lower_pct.get(),
            g.upper_shadow > self.min_shadow_body_ratio * g.body,
        ]);
        if met < HAMMER_CONDITIONS_REQUIRED {
            return None;
        }

        let mut confidence = 0.75 + 0.05 * (met - HAMMER_CONDITIONS_REQUIRED) as f64;
        if g.upper_pct > 0.6 {
            confidence += 0.1;
        }
        if g.lower_pct < 0.1 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }

    fn validate_config(&self) -> Result<()> {
        validate_shadow_body_ratio(self.min_shadow_body_ratio)
    }
}

// ============================================================
// DOJI VARIANTS
// ============================================================

/// Dragonfly Doji: doji body with a long lower shadow and almost no upper
/// shadow. All three conditions are required.
#[derive(Debug, Clone)]
pub struct DragonflyDojiDetector {
    pub min_lower_pct: Ratio,
    pub max_upper_pct: Ratio,
}

impl Default for DragonflyDojiDetector {
    fn default() -> Self {
        Self {
            min_lower_pct: Ratio::new_const(0.5),
            max_upper_pct: Ratio::new_const(0.15),
        }
    }
}

impl PatternDetector for DragonflyDojiDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Dragonfly
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let g = window.current;

        if !g.is_doji
            || g.lower_pct <= self.min_lower_pct.get()
            || g.upper_pct >= self.max_upper_pct.get()
        {
            return None;
        }

        let mut confidence: f64 = 0.8;
        if g.lower_pct > 0.7 {
            confidence += 0.1;
        }
        if g.upper_pct < 0.05 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }
}

/// Gravestone Doji: mirror of the dragonfly on the upper shadow. Bearish.
#[derive(Debug, Clone)]
pub struct GravestoneDojiDetector {
    pub min_upper_pct: Ratio,
    pub max_lower_pct: Ratio,
}

impl Default for GravestoneDojiDetector {
    fn default() -> Self {
        Self {
            min_upper_pct: Ratio::new_const(0.5),
            max_lower_pct: Ratio::new_const(0.15),
        }
    }
}

impl PatternDetector for GravestoneDojiDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Gravestone
    }

    fn detect(&self, window: &Window<'_>) -> Option<f64> {
        let g = window.current;

        if !g.is_doji
            || g.upper_pct <= self.min_upper_pct.get()
            || g.lower_pct >= self.max_lower_pct.get()
        {
            return None;
        }

        let mut confidence: f64 = 0.8;
        if g.upper_pct > 0.7 {
            confidence += 0.1;
        }
        if g.lower_pct < 0.05 {
            confidence += 0.05;
        }
        Some(confidence.min(CONFIDENCE_CEILING))
    }
}

fn validate_shadow_body_ratio(ratio: f64) -> Result<()> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(crate::PatternError::InvalidConfig(format!(
            "min_shadow_body_ratio must be a positive finite number, got {ratio}"
        )));
    }
    Ok(())
}
