// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seam to the external face detector SDK.

use std::future::Future;

use visionwerk_core::error::Result;
use visionwerk_core::frame::InputImage;
use visionwerk_core::types::RawFace;

/// An asynchronous face detector.
///
/// One call per accepted frame. The returned future resolves once, with the
/// raw faces in detection order or with the detector's failure. Options
/// (performance mode, landmarks, classification, contours) are fixed when the
/// detector is constructed.
pub trait FaceDetector: Send + Sync + 'static {
    fn detect(
        &self,
        image: InputImage,
        rotation_degrees: u32,
    ) -> impl Future<Output = Result<Vec<RawFace>>> + Send;
}
