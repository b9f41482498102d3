// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Face detector backed by the platform bridge.

use std::future::Future;
use std::sync::Arc;

use visionwerk_bridge::traits::PlatformBridge;
use visionwerk_core::error::{Result, VisionwerkError};
use visionwerk_core::frame::InputImage;
use visionwerk_core::types::{DetectorOptions, RawFace};
use visionwerk_vision::FaceDetector;

/// Runs the bridge's blocking detector call on the blocking pool so the
/// analysis worker stays responsive.
pub struct BridgeDetector {
    bridge: Arc<dyn PlatformBridge>,
    options: DetectorOptions,
}

impl BridgeDetector {
    pub fn new(bridge: Arc<dyn PlatformBridge>, options: DetectorOptions) -> Self {
        Self { bridge, options }
    }
}

impl FaceDetector for BridgeDetector {
    fn detect(
        &self,
        image: InputImage,
        rotation_degrees: u32,
    ) -> impl Future<Output = Result<Vec<RawFace>>> + Send {
        let bridge = Arc::clone(&self.bridge);
        let options = self.options;
        async move {
            tokio::task::spawn_blocking(move || {
                bridge.detect_faces(&image, rotation_degrees, &options)
            })
            .await
            .map_err(|e| VisionwerkError::Detection(format!("detector task failed: {e}")))?
        }
    }
}
