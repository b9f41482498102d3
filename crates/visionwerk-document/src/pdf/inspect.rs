// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspection using the `lopdf` crate.

use lopdf::Document;
use tracing::{debug, instrument};

use visionwerk_core::error::{Result, VisionwerkError};

/// What the export path needs to know about a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSummary {
    pub page_count: u32,
    /// Header version, e.g. `"1.7"`.
    pub version: String,
    pub bytes: usize,
}

/// Parse `bytes` as a PDF and summarise it.
///
/// Fails for anything that is not a loadable PDF with at least one page.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfSummary> {
    if bytes.is_empty() {
        return Err(VisionwerkError::PdfError("document is empty".into()));
    }

    let document = Document::load_mem(bytes)
        .map_err(|err| VisionwerkError::PdfError(format!("failed to load PDF: {err}")))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(VisionwerkError::PdfError("PDF has no pages".into()));
    }

    debug!(page_count, version = %document.version, "PDF inspected");
    Ok(PdfSummary {
        page_count,
        version: document.version.clone(),
        bytes: bytes.len(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{Object, Stream, dictionary};

    /// Minimal A4 PDF with `pages` blank pages.
    pub(crate) fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                });
                page_id.into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise sample PDF");
        out
    }

    #[test]
    fn counts_pages() {
        let bytes = sample_pdf(3);
        let summary = inspect_pdf(&bytes).expect("valid PDF");
        assert_eq!(summary.page_count, 3);
        assert_eq!(summary.version, "1.5");
        assert_eq!(summary.bytes, bytes.len());
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = inspect_pdf(b"\xFF\xD8\xFF\xE0 jpeg bytes").unwrap_err();
        assert!(matches!(err, VisionwerkError::PdfError(_)));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(inspect_pdf(&[]), Err(VisionwerkError::PdfError(_))));
    }
}
