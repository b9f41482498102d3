// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Visionwerk.

use thiserror::Error;

/// Top-level error type for all Visionwerk operations.
#[derive(Debug, Error)]
pub enum VisionwerkError {
    // -- Vision errors --
    #[error("face detection failed: {0}")]
    Detection(String),

    #[error("camera error: {0}")]
    Camera(String),

    #[error("analysis session closed before it started")]
    SessionClosed,

    // -- Document errors --
    #[error("document scanner failed: {0}")]
    Scanner(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("storage error: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VisionwerkError>;
