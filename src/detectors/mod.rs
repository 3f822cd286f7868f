//! Pattern matchers, grouped by the number of candles they examine.
//!
//! Several matchers use a threshold-of-N rule (e.g. at least 3 of 4 shape
//! conditions) rather than a strict conjunction, so ragged shapes in noisy
//! or illiquid data still match. The exact thresholds are part of the
//! scoring calibration; changing them shifts every confidence value.

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod single_candle;
pub mod three_candle;
pub mod two_candle;

// Re-export all detectors for convenience
pub use single_candle::*;
pub use three_candle::*;
pub use two_candle::*;

/// Hard ceiling on any confidence score; a match is never reported as
/// certain.
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Count how many conditions of a fixed list hold.
#[inline]
pub(crate) fn conditions_met(conditions: &[bool]) -> usize {
    conditions.iter().filter(|&&met| met).count()
}
