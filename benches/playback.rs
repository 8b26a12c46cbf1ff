//! Criterion benchmarks for the playback draw path.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use swarmview::convergence::ConvergenceSeries;
use swarmview::playback::{step, ManualScheduler, PlaybackClip, PlaybackEngine};
use swarmview::viewport::{DomainBounds, SurfaceSize, Viewport};

fn make_clip(agents: usize, frames: usize) -> PlaybackClip {
    PlaybackClip {
        frames: (0..frames)
            .map(|f| {
                (0..agents)
                    .map(|a| {
                        let t = (f * agents + a) as f64;
                        ((t * 0.37).sin() * 9.0, (t * 0.53).cos() * 9.0)
                    })
                    .collect()
            })
            .collect(),
        background: None,
        bounds: (-10.0, 10.0),
    }
}

/// One timer tick: transform every agent of the current frame.
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_agents");

    for agents in [20, 100, 500, 2000].iter() {
        group.throughput(Throughput::Elements(*agents as u64));

        group.bench_with_input(BenchmarkId::from_parameter(agents), agents, |b, &agents| {
            let mut engine = PlaybackEngine::new(ManualScheduler::new(), 200, 10_000);
            let _ = engine.play(make_clip(agents, 100), SurfaceSize::new(600.0, 600.0));

            b.iter(|| black_box(step(&mut engine)));
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let Ok(bounds) = DomainBounds::new(-5.12, 5.12) else {
        return;
    };
    let vp = Viewport::new(SurfaceSize::new(800.0, 600.0), bounds);

    c.bench_function("to_pixel", |b| {
        b.iter(|| black_box(vp.to_pixel(black_box(1.25), black_box(-3.5))))
    });
}

fn bench_convergence_series(c: &mut Criterion) {
    let history: Vec<f64> = (0..5000).map(|i| 100.0 * (-(i as f64) / 400.0).exp()).collect();

    c.bench_function("series_5000", |b| {
        b.iter(|| {
            let s = ConvergenceSeries::from_history(black_box(&history));
            black_box(s.y_ticks())
        })
    });
}

criterion_group!(benches, bench_tick, bench_transform, bench_convergence_series);
criterion_main!(benches);
