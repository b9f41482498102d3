// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the platform bridge, the persisted config and
// the running face analysis session, and exposes async-friendly methods for
// the Dioxus pages.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use visionwerk_bridge::traits::{FrameCallback, PlatformBridge};
use visionwerk_core::AppConfig;
use visionwerk_core::error::{Result, VisionwerkError};
use visionwerk_core::types::{FaceScreenState, ScanActivityResult};
use visionwerk_document::{PdfExporter, SavedPdf};
use visionwerk_vision::{AnalysisSession, SessionConfig, SessionStats};

use super::data_dir;
use super::detector::BridgeDetector;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are Arc-wrapped so the struct can be moved into closures and
/// async blocks.
#[derive(Clone)]
pub struct AppServices {
    bridge: Arc<dyn PlatformBridge>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
    face_session: Arc<tokio::sync::Mutex<Option<AnalysisSession>>>,
    /// Bumped by every stop; a start that began under an older value is void.
    face_generation: Arc<AtomicU64>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    pub fn init() -> Self {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");
        Self::with_bridge(Arc::from(visionwerk_bridge::platform_bridge()), dir)
    }

    pub fn with_bridge(bridge: Arc<dyn PlatformBridge>, data_dir: PathBuf) -> Self {
        let config = load_config(&data_dir).unwrap_or_default();
        info!(platform = bridge.platform_name(), "app services initialised");
        Self {
            bridge,
            data_dir,
            config: Arc::new(Mutex::new(config)),
            face_session: Arc::new(tokio::sync::Mutex::new(None)),
            face_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn platform_name(&self) -> String {
        self.bridge.platform_name().to_owned()
    }

    // -- Face analysis -------------------------------------------------------

    pub fn has_camera_permission(&self) -> bool {
        self.bridge.has_camera_permission()
    }

    pub fn request_camera_permission(&self) -> Result<()> {
        self.bridge.request_camera_permission()
    }

    /// Start the analysis session and bind the camera to it.
    ///
    /// If a session is already running its state channel is returned. A
    /// [`stop_face_session`](Self::stop_face_session) issued after this call
    /// but before the camera is bound cancels the start, which then fails
    /// with [`VisionwerkError::SessionClosed`].
    pub fn start_face_session(
        &self,
    ) -> impl Future<Output = Result<watch::Receiver<FaceScreenState>>> + 'static {
        let svc = self.clone();
        let generation = self.face_generation.load(Ordering::SeqCst);
        async move { svc.bind_face_session(generation).await }
    }

    async fn bind_face_session(
        &self,
        generation: u64,
    ) -> Result<watch::Receiver<FaceScreenState>> {
        let mut guard = self.face_session.lock().await;
        if self.face_generation.load(Ordering::SeqCst) != generation {
            debug!("face session start cancelled before binding");
            return Err(VisionwerkError::SessionClosed);
        }
        if let Some(ref session) = *guard {
            return Ok(session.subscribe());
        }

        let config = self.config();
        let detector = Arc::new(BridgeDetector::new(Arc::clone(&self.bridge), config.detector));
        let session = AnalysisSession::start(detector, SessionConfig::from(&config));

        let sink = session.frame_sink();
        let on_frame: FrameCallback = Arc::new(move |frame| {
            // A closed sink has already released the frame.
            let _ = sink.offer(frame);
        });

        if let Err(e) = self.bridge.start_frame_analysis(config.camera_lens, on_frame) {
            warn!(error = %e, "camera could not be bound; stopping session");
            session.shutdown().await;
            return Err(e);
        }

        let rx = session.subscribe();
        *guard = Some(session);
        Ok(rx)
    }

    /// Unbind the camera and shut the session down. Returns its final counters.
    pub async fn stop_face_session(&self) -> Option<SessionStats> {
        self.face_generation.fetch_add(1, Ordering::SeqCst);
        let session = self.face_session.lock().await.take()?;
        if let Err(e) = self.bridge.stop_frame_analysis() {
            warn!(error = %e, "camera unbind failed");
        }
        Some(session.shutdown().await)
    }

    // -- Document scanning ---------------------------------------------------

    /// Present the platform scanner. A result left over from an earlier
    /// launch is discarded first.
    pub fn launch_document_scanner(&self) -> Result<()> {
        if let Some(stale) = self.bridge.take_scan_result() {
            debug!(?stale, "discarding unclaimed scanner result");
        }
        let options = self.config().scanner;
        self.bridge.launch_document_scanner(&options)
    }

    pub fn take_scan_result(&self) -> Option<ScanActivityResult> {
        self.bridge.take_scan_result()
    }

    /// Copy the scanned PDF into the public Downloads folder.
    pub async fn export_pdf(&self, source_uri: String) -> Result<SavedPdf> {
        let exporter = PdfExporter::new(Arc::clone(&self.bridge))
            .with_downloads_dir(self.config().downloads_dir);
        tokio::task::spawn_blocking(move || exporter.save(&source_uri))
            .await
            .map_err(|e| VisionwerkError::Storage(format!("export task failed: {e}")))?
    }

    // -- Config Persistence --------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

/// Read `config.json`. A missing file is created with the defaults so it can
/// be edited by hand; an unreadable one is left alone.
fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        if let Err(e) = persist_config(data_dir, &AppConfig::default()) {
            warn!(path = %path.display(), error = %e, "could not write default config");
        }
        return None;
    }
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use visionwerk_bridge::stub::StubBridge;
    use visionwerk_bridge::traits::*;
    use visionwerk_core::frame::InputImage;
    use visionwerk_core::types::{CameraLens, DetectorOptions, RawFace, ScannerOptions};

    fn services(dir: &Path) -> AppServices {
        AppServices::with_bridge(Arc::new(StubBridge::new()), dir.to_path_buf())
    }

    /// Bridge whose camera always binds and whose scanner always launches.
    #[derive(Default)]
    struct CameraBridge {
        binds: AtomicUsize,
        unbinds: AtomicUsize,
        launches: AtomicUsize,
        pending_scan: Mutex<Option<ScanActivityResult>>,
    }

    impl PlatformBridge for CameraBridge {
        fn platform_name(&self) -> &str {
            "camera"
        }
    }

    impl NativeCameraStream for CameraBridge {
        fn has_camera_permission(&self) -> bool {
            true
        }
        fn request_camera_permission(&self) -> Result<()> {
            Ok(())
        }
        fn start_frame_analysis(&self, _: CameraLens, _: FrameCallback) -> Result<()> {
            self.binds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn stop_frame_analysis(&self) -> Result<()> {
            self.unbinds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl NativeFaceDetector for CameraBridge {
        fn detect_faces(&self, _: &InputImage, _: u32, _: &DetectorOptions) -> Result<Vec<RawFace>> {
            Ok(Vec::new())
        }
    }

    impl NativeDocumentScanner for CameraBridge {
        fn launch_document_scanner(&self, _: &ScannerOptions) -> Result<()> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn take_scan_result(&self) -> Option<ScanActivityResult> {
            self.pending_scan.lock().expect("scan lock").take()
        }
    }

    impl NativeContentReader for CameraBridge {
        fn read_content(&self, _: &str) -> Result<Vec<u8>> {
            Err(VisionwerkError::PlatformUnavailable)
        }
    }

    impl NativeMediaStore for CameraBridge {
        fn api_level(&self) -> Option<u32> {
            None
        }
        fn insert_download(&self, _: &str, _: &str, _: &[u8]) -> Result<String> {
            Err(VisionwerkError::PlatformUnavailable)
        }
    }

    impl NativeDownloadsDir for CameraBridge {
        fn public_downloads_dir(&self) -> Result<PathBuf> {
            Err(VisionwerkError::PlatformUnavailable)
        }
    }

    #[test]
    fn missing_config_is_written_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = services(dir.path()).config();
        assert_eq!(config.sample_interval(), Duration::from_millis(500));

        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).expect("config written");
        let written: AppConfig = serde_json::from_str(&written).expect("valid config");
        assert_eq!(written.sample_interval_ms, 500);
    }

    #[test]
    fn edited_config_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.sample_interval_ms = 750;
        persist_config(dir.path(), &config).expect("persist");

        let reloaded = services(dir.path()).config();
        assert_eq!(reloaded.sample_interval(), Duration::from_millis(750));
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").expect("write");
        let config = services(dir.path()).config();
        assert_eq!(config.sample_interval(), Duration::from_millis(500));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "{ not json");
    }

    #[tokio::test]
    async fn face_session_fails_cleanly_without_camera() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(dir.path());

        let result = svc.start_face_session().await;
        assert!(matches!(result, Err(VisionwerkError::PlatformUnavailable)));
        assert!(svc.stop_face_session().await.is_none());
    }

    #[tokio::test]
    async fn stop_before_bind_cancels_pending_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(CameraBridge::default());
        let svc = AppServices::with_bridge(bridge.clone(), dir.path().to_path_buf());

        let pending = svc.start_face_session();
        assert!(svc.stop_face_session().await.is_none());
        assert!(matches!(pending.await, Err(VisionwerkError::SessionClosed)));
        assert_eq!(bridge.binds.load(Ordering::SeqCst), 0);

        // A start issued after the stop binds as usual.
        let rx = svc.start_face_session().await.expect("start");
        assert!(!rx.borrow().processing);
        assert_eq!(bridge.binds.load(Ordering::SeqCst), 1);

        let stats = svc.stop_face_session().await.expect("running session");
        assert_eq!(stats.offered, 0);
        assert_eq!(bridge.unbinds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn launch_discards_unclaimed_scan_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(CameraBridge::default());
        *bridge.pending_scan.lock().expect("scan lock") = Some(ScanActivityResult::Cancelled);
        let svc = AppServices::with_bridge(bridge.clone(), dir.path().to_path_buf());

        svc.launch_document_scanner().expect("launch");
        assert_eq!(bridge.launches.load(Ordering::SeqCst), 1);
        assert!(svc.take_scan_result().is_none());
    }
}
