//! Benchmarks for candlestick pattern scanning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use candlescope::prelude::*;

/// Generate realistic candles with a deterministic pseudo-random walk.
fn generate_candles(n: usize) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
        let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

        let open = price;
        let close = price + change;
        let high = open.max(close) + volatility * 0.5;
        let low = open.min(close) - volatility * 0.5;

        candles.push(Candle::new(i as i64 * 60, open, high, low, close));
        price = close;
    }

    candles
}

fn bench_single_pattern(c: &mut Criterion) {
    let candles = generate_candles(1000);

    let engine = EngineBuilder::new()
        .add(BuiltinDetector::Hammer(HammerDetector::with_defaults()))
        .build()
        .unwrap();

    c.bench_function("scan_hammer_1000_candles", |b| {
        b.iter(|| {
            let _ = black_box(engine.scan(black_box(&candles)));
        })
    });
}

fn bench_all_patterns(c: &mut Criterion) {
    let candles = generate_candles(1000);

    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    c.bench_function("scan_all_patterns_1000_candles", |b| {
        b.iter(|| {
            let _ = black_box(engine.scan(black_box(&candles)));
        })
    });
}

fn bench_scaling(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    let mut group = c.benchmark_group("scaling");

    for size in [100, 500, 1000, 5000, 10000].iter() {
        let candles = generate_candles(*size);

        group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
            b.iter(|| {
                let _ = black_box(engine.scan(black_box(&candles)));
            })
        });
    }

    group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
    let series: Vec<Vec<Candle>> = (0..4).map(|_| generate_candles(1000)).collect();

    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    let instruments: Vec<(&str, &[Candle])> = vec![
        ("SYM1", &series[0]),
        ("SYM2", &series[1]),
        ("SYM3", &series[2]),
        ("SYM4", &series[3]),
    ];

    c.bench_function("parallel_scan_4_instruments", |b| {
        b.iter(|| {
            let _ = black_box(scan_parallel(
                black_box(&engine),
                black_box(instruments.clone()),
            ));
        })
    });
}

fn bench_indicators(c: &mut Criterion) {
    let candles = generate_candles(1000);
    let closes = candlescope::indicators::close_series(&candles);

    c.bench_function("macd_1000_closes", |b| {
        b.iter(|| {
            let _ = black_box(macd(black_box(&closes), 12, 26, 9));
        })
    });

    c.bench_function("rsi_1000_closes", |b| {
        b.iter(|| {
            let _ = black_box(rsi(black_box(&closes), 14));
        })
    });
}

fn bench_scan_at(c: &mut Criterion) {
    let candles = generate_candles(1000);
    let geometries: Vec<CandleGeometry> = candles.iter().map(CandleGeometry::of).collect();

    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

    c.bench_function("scan_at_single_position", |b| {
        b.iter(|| {
            let window = Window {
                prev2: Some(&geometries[498]),
                prev: &geometries[499],
                current: &geometries[500],
            };
            let _ = black_box(engine.scan_at(black_box(&window), 500));
        })
    });
}

criterion_group!(
    benches,
    bench_single_pattern,
    bench_all_patterns,
    bench_scaling,
    bench_parallel_scan,
    bench_indicators,
    bench_scan_at,
);

criterion_main!(benches);
