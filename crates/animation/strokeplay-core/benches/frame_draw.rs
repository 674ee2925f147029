//! Criterion benchmarks for the per-frame hot path
//!
//! - Measure: geometry measurement of a generated drawing
//! - Frame: dash computation at one progress value
//! - Update: one player step including pause-point checks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strokeplay_core::{load_player, measure_paths, EngineConfig, Frame, StrokeDocument};

/// Generate a drawing with `n` short paths and a pause marker every 16 shapes
fn make_svg(n: usize) -> String {
    let mut svg = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400">"#);
    for i in 0..n {
        let y = (i % 400) as f64;
        svg.push_str(&format!(
            r#"<path d="M0 {y} C 40 {y} 60 {} 100 {}" stroke="black" fill="none"/>"#,
            y + 10.0,
            y + 10.0
        ));
        if i % 16 == 15 {
            svg.push_str("<!--Pause:1-->");
        }
    }
    svg.push_str("</svg>");
    svg
}

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");
    for n in [16usize, 256, 1024] {
        let doc = StrokeDocument::parse(make_svg(n)).expect("parse");
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &doc, |b, doc| {
            b.iter(|| measure_paths(&mut doc.geometry_measurer(0.1)).expect("measure"))
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for n in [16usize, 256, 1024] {
        let doc = StrokeDocument::parse(make_svg(n)).expect("parse");
        let table = measure_paths(&mut doc.geometry_measurer(0.1)).expect("measure");
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| Frame::at(table, black_box(0.37), false))
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let svg = make_svg(256);
    let (_, mut player) =
        load_player(&svg, 60_000.0, &EngineConfig::default()).expect("load player");
    player.play(0.0);
    let mut now = 0.0;
    c.bench_function("update", |b| {
        b.iter(|| {
            now += 1.0;
            if !player.state().needs_frames() {
                player.reset(now);
                player.play(now);
            }
            if player.state().is_paused() {
                player.toggle(now);
            }
            black_box(player.update(now).frame.is_some())
        })
    });
}

criterion_group!(benches, bench_measure, bench_frame, bench_update);
criterion_main!(benches);
