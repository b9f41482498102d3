// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the mobile vision SDKs are
// unavailable.
//
// Camera, face detector and document scanner return `PlatformUnavailable`.
// Content reading and the Downloads directory map onto the local filesystem
// so the PDF export path can run on desktop.

use std::path::PathBuf;

use visionwerk_core::error::{Result, VisionwerkError};
use visionwerk_core::frame::InputImage;
use visionwerk_core::types::{
    CameraLens, DetectorOptions, RawFace, ScanActivityResult, ScannerOptions,
};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge {
    downloads_dir: Option<PathBuf>,
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBridge {
    pub fn new() -> Self {
        Self {
            downloads_dir: None,
        }
    }

    /// Use `dir` instead of the user's Downloads directory.
    pub fn with_downloads_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: Some(dir.into()),
        }
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeCameraStream for StubBridge {
    fn has_camera_permission(&self) -> bool {
        false
    }

    fn request_camera_permission(&self) -> Result<()> {
        tracing::warn!("NativeCameraStream::request_camera_permission called on stub bridge");
        Err(VisionwerkError::PlatformUnavailable)
    }

    fn start_frame_analysis(&self, _lens: CameraLens, _on_frame: FrameCallback) -> Result<()> {
        tracing::warn!("NativeCameraStream::start_frame_analysis called on stub bridge");
        Err(VisionwerkError::PlatformUnavailable)
    }

    fn stop_frame_analysis(&self) -> Result<()> {
        Ok(())
    }
}

impl NativeFaceDetector for StubBridge {
    fn detect_faces(
        &self,
        _image: &InputImage,
        _rotation_degrees: u32,
        _options: &DetectorOptions,
    ) -> Result<Vec<RawFace>> {
        tracing::warn!("NativeFaceDetector::detect_faces called on stub bridge");
        Err(VisionwerkError::PlatformUnavailable)
    }
}

impl NativeDocumentScanner for StubBridge {
    fn launch_document_scanner(&self, _options: &ScannerOptions) -> Result<()> {
        tracing::warn!("NativeDocumentScanner::launch_document_scanner called on stub bridge");
        Err(VisionwerkError::PlatformUnavailable)
    }

    fn take_scan_result(&self) -> Option<ScanActivityResult> {
        None
    }
}

impl NativeContentReader for StubBridge {
    fn read_content(&self, uri: &str) -> Result<Vec<u8>> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        if path.starts_with("content://") {
            return Err(VisionwerkError::PlatformUnavailable);
        }
        Ok(std::fs::read(path)?)
    }
}

impl NativeMediaStore for StubBridge {
    fn api_level(&self) -> Option<u32> {
        None
    }

    fn insert_download(&self, _display_name: &str, _mime_type: &str, _bytes: &[u8]) -> Result<String> {
        Err(VisionwerkError::PlatformUnavailable)
    }
}

impl NativeDownloadsDir for StubBridge {
    fn public_downloads_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.downloads_dir {
            return Ok(dir.clone());
        }
        if let Ok(xdg) = std::env::var("XDG_DOWNLOAD_DIR") {
            return Ok(PathBuf::from(xdg));
        }
        if let Ok(home) = std::env::var("HOME") {
            return Ok(PathBuf::from(home).join("Downloads"));
        }
        Err(VisionwerkError::Storage(
            "no Downloads directory: neither XDG_DOWNLOAD_DIR nor HOME is set".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_and_file_uris() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.5").expect("write");

        let bridge = StubBridge::new();
        let plain = bridge.read_content(path.to_str().expect("utf-8 path")).expect("read");
        let uri = format!("file://{}", path.display());
        let via_uri = bridge.read_content(&uri).expect("read uri");
        assert_eq!(plain, b"%PDF-1.5");
        assert_eq!(plain, via_uri);
    }

    #[test]
    fn content_uris_are_unavailable() {
        let result = StubBridge::new().read_content("content://media/external/1");
        assert!(matches!(result, Err(VisionwerkError::PlatformUnavailable)));
    }

    #[test]
    fn downloads_override_wins() {
        let bridge = StubBridge::with_downloads_dir("/srv/downloads");
        assert_eq!(
            bridge.public_downloads_dir().expect("dir"),
            PathBuf::from("/srv/downloads")
        );
    }

    #[test]
    fn camera_is_unavailable() {
        let bridge = StubBridge::new();
        assert!(!bridge.has_camera_permission());
        let callback: FrameCallback = std::sync::Arc::new(|_frame| {});
        assert!(bridge.start_frame_analysis(CameraLens::Front, callback).is_err());
        assert!(bridge.take_scan_result().is_none());
    }
}
