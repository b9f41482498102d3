// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning screen — state machine driving the document scanner screen.

pub mod state;

pub use state::DocumentScanState;
