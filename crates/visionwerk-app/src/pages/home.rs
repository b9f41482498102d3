// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Home page — entry points to both screens and a summary of the last session.

use dioxus::prelude::*;

use crate::Route;
use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Home() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let data_dir = svc.data_dir().display().to_string();

    let interval_ms = state.read().config.sample_interval_ms;
    let platform = state.read().platform.clone();

    rsx! {
        div {
            h1 { "Visionwerk" }
            p { style: "color: #666;", "On-device document scanning and face detection" }

            div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 12px; margin: 24px 0;",
                QuickAction { to: Route::Faces {}, label: "Facial Recognition", icon: "\u{1F642}" }
                QuickAction { to: Route::Documents {}, label: "Document Scanner", icon: "\u{1F4C4}" }
            }

            h2 { "Last face session" }
            match state.read().last_session {
                Some(stats) => rsx! {
                    ul { style: "color: #444; font-size: 14px;",
                        li { "Frames offered: {stats.offered}" }
                        li { "Analysed: {stats.accepted}" }
                        li { "Skipped by sampling: {stats.rejected}" }
                        li { "Dropped before analysis: {stats.dropped_at_source}" }
                        li { "Detector failures: {stats.failed}" }
                        li { "Results superseded: {stats.superseded}" }
                    }
                },
                None => rsx! {
                    p { style: "color: #888;", "No session yet." }
                },
            }

            if let Some(ref msg) = state.read().status_message {
                p { style: "margin-top: 12px; color: #666; font-size: 14px;", "{msg}" }
            }

            p { style: "margin-top: 24px; color: #aaa; font-size: 12px;",
                "{platform} \u{00B7} one frame per {interval_ms} ms \u{00B7} {data_dir}"
            }
        }
    }
}

#[component]
fn QuickAction(to: Route, label: &'static str, icon: &'static str) -> Element {
    rsx! {
        Link { to: to,
            style: "display: flex; flex-direction: column; align-items: center; padding: 20px; border-radius: 12px; background: #f5f5f7; text-decoration: none; color: #333;",
            span { style: "font-size: 28px;", "{icon}" }
            span { style: "margin-top: 8px; font-size: 14px;", "{label}" }
        }
    }
}
