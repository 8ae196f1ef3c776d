//! Benchmarks for the per-tick signal path
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kinetic_stage::config::{CalibrationConfig, SmoothingConfig};
use kinetic_stage::runtime::{FrameScheduler, ManualTicker};
use kinetic_stage::signal::{compose_raw_controls, ControlSmoother, MetricExtractor};
use kinetic_stage::tracking::synthetic::{synthetic_face, synthetic_hand};
use kinetic_stage::tracking::{HandPattern, MotionPattern, SyntheticFrameSource, SyntheticLandmarkSource};
use kinetic_stage::{build_default_graph, ControlValues, ReactiveStage, RuntimeContext, StageConfig};

fn bench_metric_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric_extraction");
    let extractor = MetricExtractor::new(CalibrationConfig::default());
    let faces = vec![synthetic_face((0.55, 0.45), 0.03)];
    let hands = vec![synthetic_hand((0.6, 0.5), 0.08)];

    group.bench_function("face", |b| {
        b.iter(|| extractor.extract_face(black_box(&faces)))
    });
    group.bench_function("hand", |b| {
        b.iter(|| extractor.extract_hand(black_box(&hands)))
    });
    group.bench_function("compose", |b| {
        b.iter(|| {
            let face = extractor.extract_face(black_box(&faces));
            let hand = extractor.extract_hand(black_box(&hands));
            compose_raw_controls(&face, &hand)
        })
    });

    group.finish();
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");
    let smoother = ControlSmoother::new(SmoothingConfig::default(), 0.1);
    let raw = ControlValues {
        tilt: 0.15,
        lift: 0.6,
        pinch: 0.8,
        jaw: 0.04,
        presence: 1.0,
    };

    for ticks in [1usize, 60, 600].iter() {
        group.throughput(Throughput::Elements(*ticks as u64));
        group.bench_with_input(BenchmarkId::new("ticks", ticks), ticks, |b, &ticks| {
            b.iter(|| {
                let mut current = ControlValues::NEUTRAL;
                for i in 0..ticks {
                    current = smoother.smooth(current, black_box(raw), i % 7 != 0);
                }
                current
            })
        });
    }

    group.finish();
}

fn live_scheduler(observed: usize) -> FrameScheduler<ManualTicker> {
    let config = StageConfig::default();
    let camera = SyntheticFrameSource::new(320, 180);
    let detector = SyntheticLandmarkSource::new()
        .with_face(MotionPattern::Sway {
            center: (0.5, 0.45),
            amplitude: 0.15,
            period_ms: 4000,
        })
        .with_mouth_open(0.03)
        .with_hand(HandPattern::Pinching {
            wrist: (0.6, 0.45),
            period_ms: 1500,
        });
    let (graph, ids) = build_default_graph().unwrap();
    let stage = ReactiveStage::new(config.stage, config.calibration.jaw_max);
    let mut scheduler = FrameScheduler::new(
        &config,
        RuntimeContext::create(Box::new(camera), Box::new(detector)),
        graph,
        Box::new(stage),
        ManualTicker::new(),
    );

    let all = [
        ids.camera,
        ids.face_tracker,
        ids.hand_tracker,
        ids.composer,
        ids.mapper,
        ids.stage_output,
    ];
    for id in all.iter().take(observed) {
        scheduler.graph_mut().set_observed(*id, true).unwrap();
    }
    scheduler.start().unwrap();
    scheduler
}

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(50);

    // Preview cost should scale with the observed count only
    for observed in [0usize, 1, 6].iter() {
        let mut scheduler = live_scheduler(*observed);
        group.bench_with_input(
            BenchmarkId::new("observed", observed),
            observed,
            |b, _| b.iter(|| black_box(scheduler.pump())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_metric_extraction, bench_smoothing, bench_full_tick);
criterion_main!(benches);
