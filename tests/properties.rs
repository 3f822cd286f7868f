//! Property tests over randomized candle sequences, including a fraction of
//! malformed candles.

use std::collections::HashSet;

use candlescope::prelude::*;
use proptest::collection::vec;
use proptest::prelude::*;

/// Valid-by-construction candle: the envelope invariant holds and the range
/// is strictly positive.
fn arb_valid_candle() -> impl Strategy<Value = Candle> {
    (
        1.0f64..500.0,
        0.0f64..20.0,
        0.0f64..10.0,
        0.0f64..10.0,
        any::<bool>(),
    )
        .prop_map(|(open, body, upper, lower, green)| {
            let close = if green {
                open + body
            } else {
                (open - body).max(0.01)
            };
            let low = (open.min(close) - lower).max(0.001);
            let mut high = open.max(close) + upper;
            if high <= low {
                high = low + 0.01;
            }
            Candle::new(0, open, high, low, close)
        })
}

fn arb_invalid_candle() -> impl Strategy<Value = Candle> {
    prop_oneof![
        // flat: zero range
        (1.0f64..500.0).prop_map(|p| Candle::new(0, p, p, p, p)),
        // high and low swapped
        (1.0f64..500.0, 1.0f64..10.0).prop_map(|(p, d)| Candle::new(0, p, p - d, p + d, p)),
        Just(Candle::new(0, f64::NAN, 1.0, 0.5, 0.8)),
    ]
}

fn arb_candle() -> impl Strategy<Value = Candle> {
    prop_oneof![
        9 => arb_valid_candle(),
        1 => arb_invalid_candle(),
    ]
}

fn arb_series() -> impl Strategy<Value = Vec<Candle>> {
    vec(arb_candle(), 0..80)
}

fn keys(matches: &[PatternMatch]) -> HashSet<(PatternKind, usize)> {
    matches.iter().map(|m| (m.kind, m.index)).collect()
}

proptest! {
    #[test]
    fn scan_is_deterministic(candles in arb_series()) {
        let first = detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE);
        let second = detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn raising_the_threshold_never_adds_matches(candles in arb_series()) {
        let loose = keys(&detect_patterns(&candles, 0.7));
        let strict = keys(&detect_patterns(&candles, 0.85));
        prop_assert!(strict.is_subset(&loose));
    }

    #[test]
    fn confidence_stays_in_bounds(candles in arb_series()) {
        for m in detect_patterns(&candles, 0.0) {
            prop_assert!(m.confidence >= 0.0);
            prop_assert!(m.confidence <= 0.95);
        }
    }

    #[test]
    fn threshold_is_inclusive(candles in arb_series()) {
        for m in detect_patterns(&candles, DEFAULT_MIN_CONFIDENCE) {
            prop_assert!(m.confidence >= DEFAULT_MIN_CONFIDENCE);
        }
    }

    #[test]
    fn matches_are_sorted(candles in arb_series()) {
        let matches = detect_patterns(&candles, 0.0);
        for pair in matches.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
            if pair[0].confidence == pair[1].confidence {
                prop_assert!(pair[0].index <= pair[1].index);
            }
        }
    }

    #[test]
    fn matches_only_annotate_valid_positions(candles in arb_series()) {
        for m in detect_patterns(&candles, 0.0) {
            prop_assert!(m.index >= 2);
            prop_assert!(m.index < candles.len());
            prop_assert!(is_valid(&candles[m.index]));
            prop_assert!(is_valid(&candles[m.index - 1]));
            if m.kind.candles() == 3 {
                prop_assert!(is_valid(&candles[m.index - 2]));
            }
        }
    }

    #[test]
    fn match_metadata_is_consistent(candles in arb_series()) {
        for m in detect_patterns(&candles, 0.0) {
            prop_assert_eq!(m.bullish, m.kind.is_bullish());
            prop_assert_eq!(m.name, m.kind.name());
            prop_assert_eq!(m.price, candles[m.index].close);
        }
    }

    #[test]
    fn pattern_filter_is_respected(candles in arb_series()) {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternKind::Hammer, PatternKind::BullishEngulfing])
            .build()
            .unwrap();
        for m in engine.scan(&candles) {
            prop_assert!(matches!(
                m.kind,
                PatternKind::Hammer | PatternKind::BullishEngulfing
            ));
        }
    }

    #[test]
    fn parallel_scan_agrees_with_sequential(candles in arb_series()) {
        let engine = PatternEngine::default();
        let instruments: Vec<(&str, &[Candle])> = vec![("A", &candles), ("B", &candles)];
        let results = scan_parallel(&engine, instruments);
        let sequential = engine.scan(&candles);
        for result in results {
            prop_assert_eq!(&result.matches, &sequential);
        }
    }
}
