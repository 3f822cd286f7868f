//! # Candlescope
//!
//! Confidence-scored candlestick pattern detection for charting frontends.
//!
//! The engine scans an ordered OHLC series (oldest first) and emits typed,
//! confidence-scored matches for a fixed catalogue of twelve candlestick
//! patterns. Every match carries a stable identifier a rendering layer can
//! key icons and colors off, the index and close price of the candle it
//! annotates, and a heuristic confidence score capped at 0.95.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlescope::prelude::*;
//!
//! let candles = vec![
//!     Candle::new(0, 100.0, 101.0, 99.0, 100.5),
//!     Candle::new(60, 100.5, 101.2, 99.8, 100.1),
//!     Candle::new(120, 100.0, 100.5, 95.0, 100.2), // hammer
//! ];
//!
//! for m in detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE) {
//!     println!("{} at index {} ({:.0}%)", m.name, m.index, m.confidence * 100.0);
//! }
//! ```
//!
//! For finer control (custom thresholds, pattern subsets, scanning your own
//! bar type) build an engine explicitly:
//!
//! ```rust
//! use candlescope::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .min_confidence(0.8)
//!     .only_patterns([PatternKind::Hammer, PatternKind::MorningStar])
//!     .build()
//!     .unwrap();
//!
//! let candles: Vec<Candle> = vec![];
//! let matches = engine.scan(&candles);
//! ```

pub mod detectors;
pub mod geometry;
pub mod indicators;

pub mod prelude {
    pub use crate::{
        // Matchers
        detectors::*,
        // Entry point
        detect_patterns,
        // Geometry + validation guard
        geometry::{is_valid, CandleGeometry},
        // Indicator utilities
        indicators::{ema, macd, rsi, sma, MacdOutput},
        // Parallel
        scan_parallel,
        // Engine
        BuiltinDetector,
        Candle,
        EngineBuilder,
        Ohlc,
        PatternDetector,
        PatternEngine,
        // Errors
        PatternError,
        PatternKind,
        PatternMatch,
        Ratio,
        Result,
        ScanResult,
        Window,
        DEFAULT_MIN_CONFIDENCE,
    };
}

use geometry::{is_valid, CandleGeometry};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Configuration errors. Scanning itself never fails: malformed candles are
/// skipped and short inputs yield an empty result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0, used for ratio-typed detector
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC INPUT
// ============================================================

/// Core OHLC accessor trait. Implement it for your own bar type to scan it
/// without copying into [`Candle`].
pub trait Ohlc {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }

    /// Volume is carried for completeness; detection never reads it.
    fn volume(&self) -> Option<u64> {
        None
    }
}

/// Owned OHLC sample as produced by the market-data layer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Unix epoch seconds of the bucket open.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl Ohlc for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }

    fn volume(&self) -> Option<u64> {
        self.volume
    }
}

// ============================================================
// PATTERN TAXONOMY
// ============================================================

/// Closed set of detectable patterns. The serde representation matches
/// [`PatternKind::as_str`], the stable identifier the rendering layer uses
/// for icon/color lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    Hammer,
    InvertedHammer,
    Dragonfly,
    Gravestone,
    BullishEngulfing,
    BearishEngulfing,
    TweezerTop,
    TweezerBottom,
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

impl PatternKind {
    pub const ALL: [PatternKind; 12] = [
        PatternKind::Hammer,
        PatternKind::InvertedHammer,
        PatternKind::Dragonfly,
        PatternKind::Gravestone,
        PatternKind::BullishEngulfing,
        PatternKind::BearishEngulfing,
        PatternKind::TweezerTop,
        PatternKind::TweezerBottom,
        PatternKind::MorningStar,
        PatternKind::EveningStar,
        PatternKind::ThreeWhiteSoldiers,
        PatternKind::ThreeBlackCrows,
    ];

    /// Stable identifier consumed by rendering collaborators.
    pub const fn as_str(self) -> &'static str {
        match self {
            PatternKind::Hammer => "hammer",
            PatternKind::InvertedHammer => "inverted-hammer",
            PatternKind::Dragonfly => "dragonfly",
            PatternKind::Gravestone => "gravestone",
            PatternKind::BullishEngulfing => "bullish-engulfing",
            PatternKind::BearishEngulfing => "bearish-engulfing",
            PatternKind::TweezerTop => "tweezer-top",
            PatternKind::TweezerBottom => "tweezer-bottom",
            PatternKind::MorningStar => "morning-star",
            PatternKind::EveningStar => "evening-star",
            PatternKind::ThreeWhiteSoldiers => "three-white-soldiers",
            PatternKind::ThreeBlackCrows => "three-black-crows",
        }
    }

    /// Human-readable display name for chart labels.
    pub const fn name(self) -> &'static str {
        match self {
            PatternKind::Hammer => "Hammer",
            PatternKind::InvertedHammer => "Inverted Hammer",
            PatternKind::Dragonfly => "Dragonfly Doji",
            PatternKind::Gravestone => "Gravestone Doji",
            PatternKind::BullishEngulfing => "Bullish Engulfing",
            PatternKind::BearishEngulfing => "Bearish Engulfing",
            PatternKind::TweezerTop => "Tweezer Top",
            PatternKind::TweezerBottom => "Tweezer Bottom",
            PatternKind::MorningStar => "Morning Star",
            PatternKind::EveningStar => "Evening Star",
            PatternKind::ThreeWhiteSoldiers => "Three White Soldiers",
            PatternKind::ThreeBlackCrows => "Three Black Crows",
        }
    }

    /// Fixed polarity of the pattern.
    pub const fn is_bullish(self) -> bool {
        matches!(
            self,
            PatternKind::Hammer
                | PatternKind::Dragonfly
                | PatternKind::BullishEngulfing
                | PatternKind::TweezerBottom
                | PatternKind::MorningStar
                | PatternKind::ThreeWhiteSoldiers
        )
    }

    /// Number of candles the pattern spans.
    pub const fn candles(self) -> usize {
        match self {
            PatternKind::Hammer
            | PatternKind::InvertedHammer
            | PatternKind::Dragonfly
            | PatternKind::Gravestone => 1,
            PatternKind::BullishEngulfing
            | PatternKind::BearishEngulfing
            | PatternKind::TweezerTop
            | PatternKind::TweezerBottom => 2,
            PatternKind::MorningStar
            | PatternKind::EveningStar
            | PatternKind::ThreeWhiteSoldiers
            | PatternKind::ThreeBlackCrows => 3,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            PatternKind::Hammer => {
                "Small body with a long lower shadow; sellers pushed down and were rejected."
            }
            PatternKind::InvertedHammer => {
                "Small body with a long upper shadow; upside pressure was rejected."
            }
            PatternKind::Dragonfly => "Doji with a long lower shadow and almost no upper shadow.",
            PatternKind::Gravestone => "Doji with a long upper shadow and almost no lower shadow.",
            PatternKind::BullishEngulfing => {
                "Green body fully engulfs the prior red body; bullish reversal."
            }
            PatternKind::BearishEngulfing => {
                "Red body fully engulfs the prior green body; bearish reversal."
            }
            PatternKind::TweezerTop => {
                "Two candles with matching highs, green then red; resistance confirmed."
            }
            PatternKind::TweezerBottom => {
                "Two candles with matching lows, red then green; support confirmed."
            }
            PatternKind::MorningStar => {
                "Red candle, gapped small-bodied star, then a green close into the first body."
            }
            PatternKind::EveningStar => {
                "Green candle, gapped small-bodied star, then a red close into the first body."
            }
            PatternKind::ThreeWhiteSoldiers => {
                "Three consecutive long green candles with rising opens and closes."
            }
            PatternKind::ThreeBlackCrows => {
                "Three consecutive long red candles with falling opens and closes."
            }
        }
    }
}

// ============================================================
// PATTERN MATCH
// ============================================================

/// One detected pattern occurrence.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PatternMatch {
    /// Display name for chart labels.
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub bullish: bool,
    /// Position in the input sequence of the last candle examined.
    pub index: usize,
    /// Close of that candle, used to anchor chart annotations.
    pub price: f64,
    /// Heuristic score in [0, 0.95]; per-pattern ceilings stay below 1.0 to
    /// reflect irreducible uncertainty.
    pub confidence: f64,
    pub description: &'static str,
}

impl PatternMatch {
    pub fn new(kind: PatternKind, index: usize, price: f64, confidence: f64) -> Self {
        Self {
            name: kind.name(),
            kind,
            bullish: kind.is_bullish(),
            index,
            price,
            confidence,
            description: kind.description(),
        }
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// View of the candles examined at one scan position, with geometry computed
/// once and shared across matchers. `prev` and `current` passed validation;
/// `prev2` is `None` when the third look-back candle is missing or malformed.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub prev2: Option<&'a CandleGeometry>,
    pub prev: &'a CandleGeometry,
    pub current: &'a CandleGeometry,
}

/// A single pattern matcher. Matchers are pure: same window, same answer.
pub trait PatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;

    /// Number of candles the matcher reads (1..=3).
    fn span(&self) -> usize {
        self.kind().candles()
    }

    /// Evaluate the pattern at the window position. Returns the confidence
    /// score when the pattern is present, `None` otherwise.
    fn detect(&self, window: &Window<'_>) -> Option<f64>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate the BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - enum dispatch, no vtable
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect(&self, window: &Window<'_>) -> Option<f64> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, window)),*
                }
            }

            #[inline]
            pub fn kind(&self) -> PatternKind {
                match self {
                    $(Self::$variant(d) => PatternDetector::kind(d)),*
                }
            }

            #[inline]
            pub fn span(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::span(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    // Single candle (4)
    Hammer(HammerDetector),
    InvertedHammer(InvertedHammerDetector),
    DragonflyDoji(DragonflyDojiDetector),
    GravestoneDoji(GravestoneDojiDetector),

    // Two candle (4)
    BullishEngulfing(BullishEngulfingDetector),
    BearishEngulfing(BearishEngulfingDetector),
    TweezerTop(TweezerTopDetector),
    TweezerBottom(TweezerBottomDetector),

    // Three candle (4)
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Calibration threshold the confidence formulas were tuned around; the
/// default cut-off for [`detect_patterns`].
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.75;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_confidence: f64,
    pub pattern_filter: Option<Vec<PatternKind>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            pattern_filter: None,
        }
    }
}

/// Main pattern detection engine.
///
/// Stateless between calls: a scan is a pure function of the candle sequence,
/// so one engine may be shared across threads freely.
#[derive(Debug, Clone)]
pub struct PatternEngine {
    detectors: Vec<BuiltinDetector>,
    config: EngineConfig,
}

impl Default for PatternEngine {
    /// Engine with every builtin detector and the default 0.75 threshold.
    fn default() -> Self {
        let builder = EngineBuilder::new().with_all_defaults();
        Self {
            detectors: builder.detectors,
            config: builder.config,
        }
    }
}

impl PatternEngine {
    /// Scan an ordered candle sequence (oldest first).
    ///
    /// Returns matches at or above the configured confidence threshold,
    /// sorted by descending confidence (ties: ascending index). Sequences
    /// shorter than 3 candles yield an empty result; malformed candles are
    /// skipped at their position without aborting the scan. Multiple pattern
    /// types may legitimately co-occur at one index; none are deduplicated.
    pub fn scan<T: Ohlc>(&self, candles: &[T]) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        if candles.len() < 3 {
            return matches;
        }

        // Geometry is a pure function of the candle, so compute it once per
        // index and share it across matchers. `None` marks candles the
        // validation guard rejected.
        let geometries: Vec<Option<CandleGeometry>> = candles
            .iter()
            .map(|c| is_valid(c).then(|| CandleGeometry::of(c)))
            .collect();

        for i in 2..candles.len() {
            // No pattern is considered at a position where the current or
            // previous candle is malformed.
            let (Some(current), Some(prev)) = (geometries[i].as_ref(), geometries[i - 1].as_ref())
            else {
                continue;
            };
            let window = Window {
                prev2: geometries[i - 2].as_ref(),
                prev,
                current,
            };

            for detector in &self.detectors {
                let Some(confidence) = detector.detect(&window) else {
                    continue;
                };
                // Written to fail closed: a NaN threshold matches nothing
                // instead of disabling the filter.
                if !(confidence >= self.config.min_confidence) {
                    continue;
                }
                let kind = detector.kind();
                if let Some(filter) = &self.config.pattern_filter {
                    if !filter.contains(&kind) {
                        continue;
                    }
                }
                matches.push(PatternMatch::new(kind, i, current.close, confidence));
            }
        }

        // Stable sort keeps scan order (ascending index) for equal confidence.
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches
    }

    /// Evaluate every detector at a single precomputed window position,
    /// without threshold filtering or sorting.
    pub fn scan_at(&self, window: &Window<'_>, index: usize) -> Vec<PatternMatch> {
        self.detectors
            .iter()
            .filter_map(|d| {
                d.detect(window).map(|confidence| {
                    PatternMatch::new(d.kind(), index, window.current.close, confidence)
                })
            })
            .collect()
    }

    pub fn min_confidence(&self) -> f64 {
        self.config.min_confidence
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }
}

/// Engine entry point consumed by charting frontends.
///
/// Scans `candles` (oldest first) with every builtin matcher and returns the
/// matches at or above `min_confidence`, sorted by descending confidence
/// (ties: ascending index). Never fails: malformed candles are skipped, a
/// sequence shorter than 3 candles yields an empty vec, and a non-finite
/// `min_confidence` matches nothing.
pub fn detect_patterns<T: Ohlc>(candles: &[T], min_confidence: f64) -> Vec<PatternMatch> {
    let mut engine = PatternEngine::default();
    engine.config.min_confidence = min_confidence;
    engine.scan(candles)
}

// ============================================================
// BUILDER
// ============================================================

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

/// Builder for creating [`PatternEngine`] instances
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    detectors: Vec<BuiltinDetector>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Add all builtin matchers with default thresholds
    pub fn with_all_defaults(self) -> Self {
        self.with_single_candle_defaults()
            .with_two_candle_defaults()
            .with_three_candle_defaults()
    }

    /// Add only single-candle matchers with defaults (4)
    pub fn with_single_candle_defaults(mut self) -> Self {
        self.detectors.extend(builtin_defaults![
            Hammer,
            InvertedHammer,
            DragonflyDoji,
            GravestoneDoji,
        ]);
        self
    }

    /// Add only two-candle matchers with defaults (4)
    pub fn with_two_candle_defaults(mut self) -> Self {
        self.detectors.extend(builtin_defaults![
            BullishEngulfing,
            BearishEngulfing,
            TweezerTop,
            TweezerBottom,
        ]);
        self
    }

    /// Add only three-candle matchers with defaults (4)
    pub fn with_three_candle_defaults(mut self) -> Self {
        self.detectors.extend(builtin_defaults![
            MorningStar,
            EveningStar,
            ThreeWhiteSoldiers,
            ThreeBlackCrows,
        ]);
        self
    }

    /// Add a single detector, possibly with custom thresholds
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Set the confidence cut-off applied after the scan
    pub fn min_confidence(mut self, min_confidence: f64) -> Self {
        self.config.min_confidence = min_confidence;
        self
    }

    /// Keep only the given pattern kinds (UI pattern toggles)
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Build the engine, validating the configuration
    pub fn build(self) -> Result<PatternEngine> {
        let min_confidence = self.config.min_confidence;
        if !min_confidence.is_finite() || !(0.0..=1.0).contains(&min_confidence) {
            return Err(PatternError::OutOfRange {
                field: "min_confidence",
                value: min_confidence,
                min: 0.0,
                max: 1.0,
            });
        }
        for detector in &self.detectors {
            detector.validate_config()?;
        }
        Ok(PatternEngine {
            detectors: self.detectors,
            config: self.config,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Patterns detected for one instrument in a parallel scan
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub matches: Vec<PatternMatch>,
}

/// Scan several instruments in parallel with one shared engine.
///
/// Each instrument's history is scanned independently; the engine holds no
/// mutable state, so no locking is involved.
pub fn scan_parallel<'a, T, I>(engine: &PatternEngine, instruments: I) -> Vec<ScanResult>
where
    T: Ohlc + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    instruments
        .into_par_iter()
        .map(|(symbol, candles)| ScanResult {
            symbol: symbol.to_string(),
            matches: engine.scan(candles),
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(o: f64, h: f64, l: f64, c: f64) -> Candle {
        Candle::new(0, o, h, l, c)
    }

    /// Two ordinary candles to pad the look-back window before a pattern.
    fn padding() -> Vec<Candle> {
        vec![
            candle(100.0, 101.0, 99.0, 100.5),
            candle(100.5, 101.2, 99.8, 100.1),
        ]
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.5).is_ok());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.1).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_kind_identifiers() {
        let ids: Vec<&str> = PatternKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "hammer",
                "inverted-hammer",
                "dragonfly",
                "gravestone",
                "bullish-engulfing",
                "bearish-engulfing",
                "tweezer-top",
                "tweezer-bottom",
                "morning-star",
                "evening-star",
                "three-white-soldiers",
                "three-black-crows",
            ]
        );
    }

    #[test]
    fn test_kind_serde_matches_as_str() {
        for kind in PatternKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: PatternKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_kind_polarity() {
        assert!(PatternKind::Hammer.is_bullish());
        assert!(!PatternKind::InvertedHammer.is_bullish());
        assert!(PatternKind::Dragonfly.is_bullish());
        assert!(!PatternKind::Gravestone.is_bullish());
        assert!(PatternKind::BullishEngulfing.is_bullish());
        assert!(!PatternKind::BearishEngulfing.is_bullish());
        assert!(!PatternKind::TweezerTop.is_bullish());
        assert!(PatternKind::TweezerBottom.is_bullish());
        assert!(PatternKind::MorningStar.is_bullish());
        assert!(!PatternKind::EveningStar.is_bullish());
        assert!(PatternKind::ThreeWhiteSoldiers.is_bullish());
        assert!(!PatternKind::ThreeBlackCrows.is_bullish());
    }

    #[test]
    fn test_builder_counts() {
        assert_eq!(
            EngineBuilder::new()
                .with_all_defaults()
                .build()
                .unwrap()
                .detector_count(),
            12
        );
        assert_eq!(
            EngineBuilder::new()
                .with_single_candle_defaults()
                .build()
                .unwrap()
                .detector_count(),
            4
        );
        assert_eq!(
            EngineBuilder::new()
                .with_two_candle_defaults()
                .build()
                .unwrap()
                .detector_count(),
            4
        );
        assert_eq!(
            EngineBuilder::new()
                .with_three_candle_defaults()
                .build()
                .unwrap()
                .detector_count(),
            4
        );
    }

    #[test]
    fn test_builder_rejects_bad_threshold() {
        assert!(EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(1.5)
            .build()
            .is_err());
        assert!(EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn test_short_inputs_yield_empty() {
        assert!(detect_patterns(&[] as &[Candle], 0.0).is_empty());
        assert!(detect_patterns(&padding()[..1], 0.0).is_empty());
        assert!(detect_patterns(&padding(), 0.0).is_empty());
    }

    #[test]
    fn test_hammer_via_default_engine() {
        let mut candles = padding();
        candles.push(candle(100.0, 100.5, 95.0, 100.2));

        let matches = detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE);
        let hammer = matches.iter().find(|m| m.kind == PatternKind::Hammer);
        assert!(hammer.is_some());
        let hammer = hammer.unwrap();
        assert_eq!(hammer.index, 2);
        assert!(hammer.bullish);
        assert_eq!(hammer.price, 100.2);
    }

    #[test]
    fn test_pattern_filter() {
        let mut candles = padding();
        candles.push(candle(100.0, 100.5, 95.0, 100.2)); // hammer shape

        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternKind::TweezerTop])
            .build()
            .unwrap();

        assert!(engine.scan(&candles).is_empty());
    }

    #[test]
    fn test_custom_ohlc_type() {
        struct Bar {
            o: f64,
            h: f64,
            l: f64,
            c: f64,
        }

        impl Ohlc for Bar {
            fn open(&self) -> f64 {
                self.o
            }

            fn high(&self) -> f64 {
                self.h
            }

            fn low(&self) -> f64 {
                self.l
            }

            fn close(&self) -> f64 {
                self.c
            }
        }

        let bars = vec![
            Bar {
                o: 100.0,
                h: 101.0,
                l: 99.0,
                c: 100.5,
            },
            Bar {
                o: 100.5,
                h: 101.2,
                l: 99.8,
                c: 100.1,
            },
            Bar {
                o: 100.0,
                h: 100.5,
                l: 95.0,
                c: 100.2,
            },
        ];

        let matches = detect_patterns(&bars, DEFAULT_MIN_CONFIDENCE);
        assert!(matches.iter().any(|m| m.kind == PatternKind::Hammer));
    }

    #[test]
    fn test_match_serialization() {
        let mut candles = padding();
        candles.push(candle(100.0, 100.5, 95.0, 100.2));

        let matches = detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE);
        let hammer = matches
            .iter()
            .find(|m| m.kind == PatternKind::Hammer)
            .unwrap();

        let json = serde_json::to_value(hammer).unwrap();
        assert_eq!(json["type"], "hammer");
        assert_eq!(json["name"], "Hammer");
        assert_eq!(json["bullish"], true);
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn test_parallel_scan() {
        let mut with_hammer = padding();
        with_hammer.push(candle(100.0, 100.5, 95.0, 100.2));
        let flat: Vec<Candle> = (0..5).map(|_| candle(100.0, 102.0, 98.0, 101.0)).collect();

        let engine = PatternEngine::default();
        let instruments: Vec<(&str, &[Candle])> = vec![("AAPL", &with_hammer), ("MSFT", &flat)];

        let results = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        let aapl = results.iter().find(|r| r.symbol == "AAPL").unwrap();
        assert!(aapl.matches.iter().any(|m| m.kind == PatternKind::Hammer));
    }

    #[test]
    fn test_scan_at_ignores_threshold() {
        let prev = CandleGeometry::of(&candle(100.0, 101.0, 99.0, 100.5));
        let current = CandleGeometry::of(&candle(100.0, 100.5, 95.0, 100.2));
        let window = Window {
            prev2: None,
            prev: &prev,
            current: &current,
        };

        let engine = EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(0.95)
            .build()
            .unwrap();

        let matches = engine.scan_at(&window, 7);
        assert!(matches.iter().all(|m| m.index == 7 && m.price == 100.2));
        assert!(matches.iter().any(|m| m.kind == PatternKind::Hammer));

        // Below the engine threshold but still reported at this level.
        let dragonfly = matches
            .iter()
            .find(|m| m.kind == PatternKind::Dragonfly)
            .unwrap();
        assert!((dragonfly.confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_nan_threshold_matches_nothing() {
        let mut candles = padding();
        candles.push(candle(100.0, 100.5, 95.0, 100.2)); // hammer shape

        assert!(!detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE).is_empty());
        assert!(detect_patterns(&candles, f64::NAN).is_empty());
    }

    #[test]
    fn test_default_engine_threshold() {
        let engine = PatternEngine::default();
        assert_eq!(engine.min_confidence(), DEFAULT_MIN_CONFIDENCE);
    }
}
