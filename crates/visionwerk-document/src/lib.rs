// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// visionwerk-document — Document scanning screen support.
//
// Provides the scan screen state machine, PDF inspection of the scanner's
// output, and export of the scanned PDF into the public Downloads folder.

pub mod export;
pub mod pdf;
pub mod scan;

pub use export::{PdfExporter, SaveLocation, SavedPdf, pdf_file_name};
pub use pdf::inspect::{PdfSummary, inspect_pdf};
pub use scan::state::{DOWNLOAD_FAILED, DOWNLOAD_SUCCEEDED, DocumentScanState};
