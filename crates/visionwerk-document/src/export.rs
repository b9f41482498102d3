// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of a scanned PDF into the public Downloads folder.
//
// Platforms with scoped storage (Android 10+) insert through the media store;
// everything else writes a file into the Downloads directory, creating it if
// needed.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use visionwerk_bridge::traits::PlatformBridge;
use visionwerk_core::error::Result;

use crate::pdf::inspect::inspect_pdf;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// First API level whose media store accepts Downloads entries.
pub const MEDIA_STORE_MIN_API_LEVEL: u32 = 29;

/// `ScannedDocument_yyyyMMdd_HHmmss.pdf` for the given moment.
pub fn pdf_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("ScannedDocument_{}.pdf", at.format("%Y%m%d_%H%M%S"))
}

/// Where an exported PDF ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaveLocation {
    MediaStore { uri: String },
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedPdf {
    pub file_name: String,
    pub location: SaveLocation,
    pub bytes: usize,
    pub page_count: u32,
    /// Hex SHA-256 of the stored bytes.
    pub sha256: String,
}

/// Copies scanner output into Downloads through the platform bridge.
pub struct PdfExporter {
    bridge: Arc<dyn PlatformBridge>,
    downloads_dir: Option<PathBuf>,
}

impl PdfExporter {
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self {
            bridge,
            downloads_dir: None,
        }
    }

    /// Always write into `dir` instead of the platform's Downloads target.
    pub fn with_downloads_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.downloads_dir = dir;
        self
    }

    /// Save the PDF behind `source_uri`, named after the current local time.
    pub fn save(&self, source_uri: &str) -> Result<SavedPdf> {
        self.save_as(source_uri, &pdf_file_name(&Local::now()))
    }

    /// Save the PDF behind `source_uri` as `file_name`.
    ///
    /// Blocking: reads the source and writes the target through the bridge.
    #[instrument(skip(self), fields(platform = self.bridge.platform_name()))]
    pub fn save_as(&self, source_uri: &str, file_name: &str) -> Result<SavedPdf> {
        let bytes = self.bridge.read_content(source_uri)?;
        let summary = inspect_pdf(&bytes)?;

        let use_media_store = self.downloads_dir.is_none()
            && self
                .bridge
                .api_level()
                .is_some_and(|level| level >= MEDIA_STORE_MIN_API_LEVEL);

        let location = if use_media_store {
            let uri = self
                .bridge
                .insert_download(file_name, PDF_MIME_TYPE, &bytes)?;
            SaveLocation::MediaStore { uri }
        } else {
            let dir = match self.downloads_dir {
                Some(ref dir) => dir.clone(),
                None => self.bridge.public_downloads_dir()?,
            };
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
            let path = dir.join(file_name);
            std::fs::write(&path, &bytes)?;
            SaveLocation::File { path }
        };

        let sha256 = hex::encode(Sha256::digest(&bytes));
        info!(
            file_name,
            pages = summary.page_count,
            bytes = bytes.len(),
            ?location,
            "PDF exported"
        );

        Ok(SavedPdf {
            file_name: file_name.to_owned(),
            location,
            bytes: bytes.len(),
            page_count: summary.page_count,
            sha256,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    use visionwerk_bridge::traits::*;
    use visionwerk_core::error::VisionwerkError;
    use visionwerk_core::frame::InputImage;
    use visionwerk_core::human_errors::humanize_error;
    use visionwerk_core::types::{
        CameraLens, DetectorOptions, RawFace, ScanActivityResult, ScannerOptions,
    };

    use crate::pdf::inspect::tests::sample_pdf;

    /// In-memory bridge: content URIs map to byte blobs, media store inserts
    /// are recorded.
    struct FakeBridge {
        api_level: Option<u32>,
        content: HashMap<String, Vec<u8>>,
        downloads: PathBuf,
        inserted: Mutex<Vec<(String, String, usize)>>,
    }

    impl FakeBridge {
        fn new(api_level: Option<u32>, downloads: &Path) -> Self {
            Self {
                api_level,
                content: HashMap::new(),
                downloads: downloads.to_path_buf(),
                inserted: Mutex::new(Vec::new()),
            }
        }

        fn with_content(mut self, uri: &str, bytes: Vec<u8>) -> Self {
            self.content.insert(uri.to_owned(), bytes);
            self
        }
    }

    impl PlatformBridge for FakeBridge {
        fn platform_name(&self) -> &str {
            "fake"
        }
    }

    impl NativeCameraStream for FakeBridge {
        fn has_camera_permission(&self) -> bool {
            false
        }
        fn request_camera_permission(&self) -> Result<()> {
            Ok(())
        }
        fn start_frame_analysis(&self, _: CameraLens, _: FrameCallback) -> Result<()> {
            Err(VisionwerkError::PlatformUnavailable)
        }
        fn stop_frame_analysis(&self) -> Result<()> {
            Ok(())
        }
    }

    impl NativeFaceDetector for FakeBridge {
        fn detect_faces(&self, _: &InputImage, _: u32, _: &DetectorOptions) -> Result<Vec<RawFace>> {
            Ok(Vec::new())
        }
    }

    impl NativeDocumentScanner for FakeBridge {
        fn launch_document_scanner(&self, _: &ScannerOptions) -> Result<()> {
            Ok(())
        }
        fn take_scan_result(&self) -> Option<ScanActivityResult> {
            None
        }
    }

    impl NativeContentReader for FakeBridge {
        fn read_content(&self, uri: &str) -> Result<Vec<u8>> {
            self.content
                .get(uri)
                .cloned()
                .ok_or_else(|| VisionwerkError::Storage(format!("no content at {uri}")))
        }
    }

    impl NativeMediaStore for FakeBridge {
        fn api_level(&self) -> Option<u32> {
            self.api_level
        }
        fn insert_download(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<String> {
            self.inserted
                .lock()
                .expect("lock")
                .push((name.to_owned(), mime.to_owned(), bytes.len()));
            Ok(format!("content://media/external/downloads/{name}"))
        }
    }

    impl NativeDownloadsDir for FakeBridge {
        fn public_downloads_dir(&self) -> Result<PathBuf> {
            Ok(self.downloads.clone())
        }
    }

    const SOURCE: &str = "content://scanner/doc.pdf";

    #[test]
    fn file_name_uses_timestamp_pattern() {
        let at = Local
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 2)
            .single()
            .expect("unambiguous local time");
        assert_eq!(pdf_file_name(&at), "ScannedDocument_20240307_090502.pdf");
    }

    #[test]
    fn modern_api_inserts_through_media_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = sample_pdf(2);
        let bridge = Arc::new(FakeBridge::new(Some(34), dir.path()).with_content(SOURCE, pdf.clone()));
        let exporter = PdfExporter::new(bridge.clone());

        let saved = exporter.save_as(SOURCE, "scan.pdf").expect("export");
        assert_eq!(
            saved.location,
            SaveLocation::MediaStore {
                uri: "content://media/external/downloads/scan.pdf".into()
            }
        );
        assert_eq!(saved.page_count, 2);
        assert_eq!(saved.sha256, hex::encode(Sha256::digest(&pdf)));

        let inserted = bridge.inserted.lock().expect("lock");
        assert_eq!(
            inserted.as_slice(),
            &[("scan.pdf".to_owned(), PDF_MIME_TYPE.to_owned(), pdf.len())]
        );
        assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 0);
    }

    #[test]
    fn legacy_api_creates_downloads_dir_and_writes_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let downloads = root.path().join("Download");
        let pdf = sample_pdf(1);
        let bridge = Arc::new(FakeBridge::new(Some(28), &downloads).with_content(SOURCE, pdf.clone()));

        let saved = PdfExporter::new(bridge.clone())
            .save_as(SOURCE, "ScannedDocument_20240101_000000.pdf")
            .expect("export");

        let expected = downloads.join("ScannedDocument_20240101_000000.pdf");
        assert_eq!(saved.location, SaveLocation::File { path: expected.clone() });
        assert_eq!(std::fs::read(expected).expect("written"), pdf);
        assert!(bridge.inserted.lock().expect("lock").is_empty());
    }

    #[test]
    fn downloads_override_bypasses_media_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(FakeBridge::new(Some(34), Path::new("/nonexistent")).with_content(SOURCE, sample_pdf(1)));

        let saved = PdfExporter::new(bridge)
            .with_downloads_dir(Some(dir.path().to_path_buf()))
            .save_as(SOURCE, "a.pdf")
            .expect("export");
        assert_eq!(saved.location, SaveLocation::File { path: dir.path().join("a.pdf") });
    }

    #[test]
    fn non_pdf_source_is_rejected_before_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(
            FakeBridge::new(None, dir.path()).with_content(SOURCE, b"not a pdf".to_vec()),
        );

        let err = PdfExporter::new(bridge).save_as(SOURCE, "x.pdf").unwrap_err();
        assert!(matches!(err, VisionwerkError::PdfError(_)));
        assert!(!dir.path().join("x.pdf").exists());
    }

    #[test]
    fn missing_source_surfaces_download_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(FakeBridge::new(None, dir.path()));

        let err = PdfExporter::new(bridge).save(SOURCE).unwrap_err();
        assert_eq!(humanize_error(&err).message, "Failed to download PDF");
    }
}
