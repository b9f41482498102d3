// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanning screen state.
//
// The scanner itself is a platform activity; this type only tracks what the
// screen shows: whether a scan or a download is running, the last scan's
// output, and the page images to list.

use tracing::{debug, info, warn};

use visionwerk_core::types::{ScanActivityResult, ScanOutcome, ScannedPdf};

/// Toast shown when the PDF reached the Downloads folder.
pub const DOWNLOAD_SUCCEEDED: &str = "PDF downloaded to Downloads folder";

/// Toast shown when the PDF could not be saved.
pub const DOWNLOAD_FAILED: &str = "Failed to download PDF";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentScanState {
    scanning: bool,
    downloading: bool,
    outcome: Option<ScanOutcome>,
    pages: Vec<String>,
}

impl DocumentScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a scan as started. Returns `false` if one is already running.
    pub fn begin_scan(&mut self) -> bool {
        if self.scanning {
            debug!("scan already in progress");
            return false;
        }
        self.scanning = true;
        true
    }

    /// Apply the scanner's activity result.
    ///
    /// A successful result replaces the stored outcome, even when the result
    /// could not be parsed. Page images are only replaced when an outcome is
    /// present. Cancelling leaves everything from the previous scan in place.
    pub fn complete_scan(&mut self, result: ScanActivityResult) {
        self.scanning = false;
        match result {
            ScanActivityResult::Ok(Some(outcome)) => {
                info!(
                    pages = outcome.page_uris.len(),
                    pdf = outcome.pdf.is_some(),
                    "scan completed"
                );
                self.pages = outcome.page_uris.clone();
                self.outcome = Some(outcome);
            }
            ScanActivityResult::Ok(None) => {
                warn!("scanner returned OK without a readable result");
                self.outcome = None;
            }
            ScanActivityResult::Cancelled => {
                debug!("scan cancelled");
            }
        }
    }

    /// The scanner could not be launched.
    pub fn scan_failed(&mut self) {
        self.scanning = false;
    }

    /// Whether the download button is enabled.
    pub fn can_download(&self) -> bool {
        !self.downloading && self.pdf().is_some()
    }

    /// Start a download, returning the URI of the PDF to export.
    pub fn begin_download(&mut self) -> Option<String> {
        if !self.can_download() {
            return None;
        }
        let uri = self.pdf()?.uri.clone();
        self.downloading = true;
        Some(uri)
    }

    /// Finish a download and return the message to show the user.
    pub fn finish_download<T, E: std::fmt::Display>(
        &mut self,
        result: &Result<T, E>,
    ) -> &'static str {
        self.downloading = false;
        match result {
            Ok(_) => DOWNLOAD_SUCCEEDED,
            Err(e) => {
                warn!(error = %e, "PDF download failed");
                DOWNLOAD_FAILED
            }
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Page image URIs of the most recent scan, in page order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn pdf(&self) -> Option<&ScannedPdf> {
        self.outcome.as_ref().and_then(|o| o.pdf.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(pages: usize, with_pdf: bool) -> ScanOutcome {
        ScanOutcome {
            page_uris: (0..pages)
                .map(|i| format!("content://scanner/page/{i}"))
                .collect(),
            pdf: with_pdf.then(|| ScannedPdf {
                uri: "content://scanner/doc.pdf".into(),
                page_count: pages as u32,
            }),
        }
    }

    #[test]
    fn begin_scan_refuses_reentry() {
        let mut state = DocumentScanState::new();
        assert!(state.begin_scan());
        assert!(!state.begin_scan());
        assert!(state.is_scanning());
    }

    #[test]
    fn completed_scan_exposes_pages_and_pdf() {
        let mut state = DocumentScanState::new();
        state.begin_scan();
        state.complete_scan(ScanActivityResult::Ok(Some(outcome(3, true))));

        assert!(!state.is_scanning());
        assert_eq!(state.pages().len(), 3);
        assert!(state.can_download());
        assert_eq!(state.pdf().map(|p| p.page_count), Some(3));
    }

    #[test]
    fn cancel_keeps_previous_scan() {
        let mut state = DocumentScanState::new();
        state.begin_scan();
        state.complete_scan(ScanActivityResult::Ok(Some(outcome(2, true))));
        state.begin_scan();
        state.complete_scan(ScanActivityResult::Cancelled);

        assert!(!state.is_scanning());
        assert_eq!(state.pages().len(), 2);
        assert!(state.pdf().is_some());
    }

    #[test]
    fn unreadable_result_clears_pdf_but_keeps_pages() {
        let mut state = DocumentScanState::new();
        state.begin_scan();
        state.complete_scan(ScanActivityResult::Ok(Some(outcome(2, true))));
        state.begin_scan();
        state.complete_scan(ScanActivityResult::Ok(None));

        assert!(state.pdf().is_none());
        assert!(!state.can_download());
        assert_eq!(state.pages().len(), 2);
    }

    #[test]
    fn launch_failure_clears_scanning() {
        let mut state = DocumentScanState::new();
        state.begin_scan();
        state.scan_failed();
        assert!(!state.is_scanning());
        assert!(state.begin_scan());
    }

    #[test]
    fn download_lifecycle_messages() {
        let mut state = DocumentScanState::new();
        assert_eq!(state.begin_download(), None);

        state.complete_scan(ScanActivityResult::Ok(Some(outcome(1, true))));
        let uri = state.begin_download();
        assert_eq!(uri.as_deref(), Some("content://scanner/doc.pdf"));
        assert!(state.is_downloading());
        assert!(!state.can_download());
        assert_eq!(state.begin_download(), None);

        let ok: Result<(), String> = Ok(());
        assert_eq!(state.finish_download(&ok), DOWNLOAD_SUCCEEDED);
        assert!(state.can_download());

        state.begin_download();
        let failed: Result<(), String> = Err("disk full".into());
        assert_eq!(state.finish_download(&failed), DOWNLOAD_FAILED);
        assert!(!state.is_downloading());
    }

    #[test]
    fn jpeg_only_scan_cannot_download() {
        let mut state = DocumentScanState::new();
        state.complete_scan(ScanActivityResult::Ok(Some(outcome(4, false))));
        assert_eq!(state.pages().len(), 4);
        assert!(!state.can_download());
    }
}
