// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — inspection of scanner-produced PDFs.

pub mod inspect;

pub use inspect::{PdfSummary, inspect_pdf};
