// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{CameraLens, DetectorOptions, ScannerOptions};

/// Default minimum spacing between analysed frames.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 500;

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Minimum milliseconds between two frames forwarded to the face detector.
    pub sample_interval_ms: u64,
    /// Camera used by the facial recognition screen.
    pub camera_lens: CameraLens,
    /// Face detector options, applied when a session starts.
    pub detector: DetectorOptions,
    /// Options passed to the document scanner.
    pub scanner: ScannerOptions,
    /// Overrides the public Downloads directory used for legacy PDF export.
    pub downloads_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            camera_lens: CameraLens::Front,
            detector: DetectorOptions::default(),
            scanner: ScannerOptions::default(),
            downloads_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "sample_interval_ms": 250 }"#).expect("parse");
        assert_eq!(config.sample_interval(), Duration::from_millis(250));
        assert_eq!(config.camera_lens, CameraLens::Front);
        assert_eq!(config.scanner.page_limit, 5);
    }
}
