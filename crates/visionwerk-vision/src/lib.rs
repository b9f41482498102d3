// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// visionwerk-vision — Camera frame analysis for the facial recognition screen.
//
// Frames arrive from the platform camera pipeline, pass a time-based sampling
// gate, and the survivors are sent to the (external) face detector. Detector
// output is mapped into the UI-facing `DetectionResult` and published on a
// watch channel.

pub mod analyzer;
pub mod clock;
pub mod detector;
pub mod gate;
pub mod mapping;
mod slot;

pub use analyzer::{AnalysisSession, FrameSink, SessionConfig, SessionStats};
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use detector::FaceDetector;
pub use gate::SamplingGate;
pub use mapping::map_faces;
