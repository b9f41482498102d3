// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The vision SDKs and the camera pipeline are closed collaborators. Each
// trait below is the narrow request/response contract the screens use to
// reach one of them.

use std::path::PathBuf;
use std::sync::Arc;

use visionwerk_core::error::Result;
use visionwerk_core::frame::{Frame, InputImage};
use visionwerk_core::types::{
    CameraLens, DetectorOptions, RawFace, ScanActivityResult, ScannerOptions,
};

/// Receives every frame the camera pipeline produces.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync>;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge:
    NativeCameraStream
    + NativeFaceDetector
    + NativeDocumentScanner
    + NativeContentReader
    + NativeMediaStore
    + NativeDownloadsDir
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;
}

/// Live camera preview with a frame-analysis stream.
pub trait NativeCameraStream {
    /// Whether the app currently holds the camera permission.
    fn has_camera_permission(&self) -> bool;

    /// Ask the user for the camera permission. The answer arrives later;
    /// poll [`NativeCameraStream::has_camera_permission`].
    fn request_camera_permission(&self) -> Result<()>;

    /// Bind the preview and the analysis stream for `lens`.
    ///
    /// The pipeline keeps only the most recent undelivered frame. Every
    /// produced frame is handed to `on_frame`, which owns it from then on.
    fn start_frame_analysis(&self, lens: CameraLens, on_frame: FrameCallback) -> Result<()>;

    /// Unbind the analysis stream. No frames are delivered afterwards.
    fn stop_frame_analysis(&self) -> Result<()>;
}

/// On-device face detector.
pub trait NativeFaceDetector {
    /// Run the detector on one image. Blocks until the detector answers.
    fn detect_faces(
        &self,
        image: &InputImage,
        rotation_degrees: u32,
        options: &DetectorOptions,
    ) -> Result<Vec<RawFace>>;
}

/// Full-screen document scanner supplied by the platform.
pub trait NativeDocumentScanner {
    /// Launch the scanner UI. Returns once the scanner has been presented.
    fn launch_document_scanner(&self, options: &ScannerOptions) -> Result<()>;

    /// Take the result of the last scanner launch, if it has arrived.
    fn take_scan_result(&self) -> Option<ScanActivityResult>;
}

/// Read content produced by other components (scanner output URIs).
pub trait NativeContentReader {
    /// Read all bytes behind a `content://` URI (or a plain path on desktop).
    fn read_content(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Scoped-storage insertion into the public Downloads collection.
pub trait NativeMediaStore {
    /// Platform API level when it exposes one (Android `SDK_INT`).
    fn api_level(&self) -> Option<u32>;

    /// Insert `bytes` as a new Downloads entry. Returns the entry's URI.
    fn insert_download(&self, display_name: &str, mime_type: &str, bytes: &[u8]) -> Result<String>;
}

/// Direct filesystem access to the public Downloads directory.
pub trait NativeDownloadsDir {
    fn public_downloads_dir(&self) -> Result<PathBuf>;
}
