// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

pub mod documents;
pub mod faces;
pub mod home;

use dioxus::prelude::*;

use visionwerk_core::human_errors::{HumanError, Severity};

/// Plain-English error with its suggestion underneath.
#[component]
pub fn ErrorBanner(error: HumanError) -> Element {
    let colour = severity_colour(error.severity);
    rsx! {
        div { style: "margin-top: 12px; padding: 12px; border-radius: 8px; background: white; border-left: 4px solid {colour};",
            p { style: "font-size: 15px; color: #333; margin: 0;", "{error.message}" }
            p { style: "font-size: 13px; color: #666; margin: 8px 0 0 0;", "{error.suggestion}" }
        }
    }
}

fn severity_colour(severity: Severity) -> &'static str {
    match severity {
        Severity::Transient => "#ff9500",
        Severity::ActionRequired => "#007aff",
        Severity::Permanent => "#ff3b30",
    }
}
