// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the two screens.
//
// Every technical error is mapped to plain English with a suggestion. The
// severity drives how the UI presents it.

use crate::error::VisionwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something flaky happened; trying again may work.
    Transient,
    /// User must do something (grant permission, free space).
    ActionRequired,
    /// Cannot be fixed from inside the app.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `VisionwerkError` into a `HumanError`.
pub fn humanize_error(err: &VisionwerkError) -> HumanError {
    match err {
        VisionwerkError::Detection(_) => HumanError {
            message: "We couldn't read faces from the camera.".into(),
            suggestion: "Hold the device steady with your face in good light.".into(),
            severity: Severity::Transient,
        },

        VisionwerkError::Camera(detail) => {
            if detail.contains("permission") {
                HumanError {
                    message: "Camera permission is required for facial recognition".into(),
                    suggestion: "Tap \"Grant Permission\" and allow camera access.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The camera couldn't be started.".into(),
                    suggestion: format!("Close other apps using the camera and try again. ({detail})"),
                    severity: Severity::Transient,
                }
            }
        }

        VisionwerkError::SessionClosed => HumanError {
            message: "Face analysis has stopped.".into(),
            suggestion: "Go back and open the screen again.".into(),
            severity: Severity::Transient,
        },

        VisionwerkError::Scanner(_) => HumanError {
            message: "The document scanner couldn't start.".into(),
            suggestion: "Make sure Google Play services are up to date, then try again.".into(),
            severity: Severity::Transient,
        },

        VisionwerkError::PdfError(_) | VisionwerkError::ImageError(_) => HumanError {
            message: "The scanned document looks damaged.".into(),
            suggestion: "Scan the document again.".into(),
            severity: Severity::Permanent,
        },

        VisionwerkError::Storage(_) | VisionwerkError::Io(_) => HumanError {
            message: "Failed to download PDF".into(),
            suggestion: "Check that the device has free storage space.".into(),
            severity: Severity::ActionRequired,
        },

        VisionwerkError::Serialization(_) => HumanError {
            message: "Settings could not be read.".into(),
            suggestion: "Defaults are being used instead.".into(),
            severity: Severity::Permanent,
        },

        VisionwerkError::Bridge(detail) => HumanError {
            message: "Something went wrong talking to the device.".into(),
            suggestion: format!("Try again. ({detail})"),
            severity: Severity::Transient,
        },

        VisionwerkError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on this device.".into(),
            suggestion: "Use the Android app for camera features.".into(),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_permission_is_action_required() {
        let err = VisionwerkError::Camera("permission denied".into());
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn io_failure_uses_download_message() {
        let err = VisionwerkError::Io(std::io::Error::other("disk full"));
        assert_eq!(humanize_error(&err).message, "Failed to download PDF");
    }

    #[test]
    fn unavailable_platform_is_permanent() {
        let human = humanize_error(&VisionwerkError::PlatformUnavailable);
        assert_eq!(human.severity, Severity::Permanent);
    }
}
