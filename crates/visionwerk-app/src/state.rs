// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use visionwerk_core::AppConfig;
use visionwerk_vision::SessionStats;

use crate::services::app_services::AppServices;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application settings.
    pub config: AppConfig,
    /// Bridge platform name shown on the home page.
    pub platform: String,
    /// Counters of the most recently stopped face analysis session.
    pub last_session: Option<SessionStats>,
    /// Status message for user feedback.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(svc: &AppServices) -> Self {
        Self {
            config: svc.config(),
            platform: svc.platform_name(),
            last_session: None,
            status_message: None,
        }
    }
}
