// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-frame hot path in visionwerk-vision: the
// sampling gate decision and the mapping of a typical detector response.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use visionwerk_core::types::{LandmarkKind, Point2, RawFace, RawLandmark};
use visionwerk_vision::{SamplingGate, map_faces};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// One second of 120 fps camera ticks through a fresh gate.
fn bench_gate_decisions(c: &mut Criterion) {
    let timestamps: Vec<u64> = (0..120u64).map(|i| i * 8).collect();

    c.bench_function("sampling_gate (120 frames)", |b| {
        b.iter(|| {
            let mut gate = SamplingGate::new();
            let mut accepted = 0u32;
            for &t in &timestamps {
                if gate.should_accept(black_box(t)) {
                    accepted += 1;
                }
            }
            black_box(accepted);
        });
    });
}

/// Mapping three faces with the full ten-landmark set each.
fn bench_map_faces(c: &mut Criterion) {
    let kinds = [
        LandmarkKind::MouthBottom,
        LandmarkKind::LeftCheek,
        LandmarkKind::LeftEar,
        LandmarkKind::LeftEye,
        LandmarkKind::MouthLeft,
        LandmarkKind::NoseBase,
        LandmarkKind::RightCheek,
        LandmarkKind::RightEar,
        LandmarkKind::RightEye,
        LandmarkKind::MouthRight,
    ];
    let faces: Vec<RawFace> = (0..3)
        .map(|f| RawFace {
            tracking_id: Some(f),
            smiling_probability: Some(0.7),
            left_eye_open_probability: Some(0.9),
            right_eye_open_probability: Some(0.8),
            head_euler_angle_y: 4.0,
            head_euler_angle_z: -2.0,
            landmarks: kinds
                .iter()
                .enumerate()
                .map(|(i, &kind)| RawLandmark {
                    kind,
                    position: Point2::new(i as f32 * 3.0, f as f32 * 50.0),
                })
                .collect(),
        })
        .collect();

    c.bench_function("map_faces (3 faces)", |b| {
        b.iter(|| black_box(map_faces(black_box(&faces))));
    });
}

criterion_group!(benches, bench_gate_decisions, bench_map_faces);
criterion_main!(benches);
