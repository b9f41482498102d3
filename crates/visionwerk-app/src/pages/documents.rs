// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanner page — launch the platform scanner, list scanned pages,
// download the generated PDF.

use std::time::Duration;

use dioxus::prelude::*;

use visionwerk_core::human_errors::{HumanError, humanize_error};
use visionwerk_document::DocumentScanState;

use super::ErrorBanner;
use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Documents() -> Element {
    let svc = use_context::<AppServices>();
    let mut app_state = use_context::<Signal<AppState>>();
    let mut scan = use_signal(DocumentScanState::new);
    let mut toast = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<HumanError>::None);

    // The scanner answers through the host activity; collect its result.
    let svc_poll = svc.clone();
    let _result_poll = use_resource(move || {
        let svc = svc_poll.clone();
        async move {
            loop {
                tokio::time::sleep(Duration::from_millis(250)).await;
                if !scan.peek().is_scanning() {
                    continue;
                }
                if let Some(result) = svc.take_scan_result() {
                    scan.write().complete_scan(result);
                }
            }
        }
    });

    let scanning = scan.read().is_scanning();
    let downloading = scan.read().is_downloading();
    let can_download = scan.read().can_download();
    let has_pdf = scan.read().pdf().is_some();
    let pages = scan.read().pages().to_vec();
    let page_count = pages.len();

    rsx! {
        div {
            h1 { "Document Scanner" }

            button {
                style: "width: 100%; padding: 16px; border-radius: 12px; border: none; background: #007aff; color: white; font-size: 16px; margin: 16px 0;",
                disabled: scanning,
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        if !scan.write().begin_scan() {
                            return;
                        }
                        error.set(None);
                        if let Err(e) = svc.launch_document_scanner() {
                            tracing::error!(error = %e, "document scanner launch failed");
                            scan.write().scan_failed();
                            error.set(Some(humanize_error(&e)));
                        }
                    }
                },
                if scanning { "Scanning..." } else { "Start Document Scan" }
            }

            if has_pdf {
                button {
                    style: "width: 100%; padding: 12px; border-radius: 12px; border: none; background: #5856d6; color: white; font-size: 15px; margin-bottom: 16px;",
                    disabled: !can_download,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let Some(uri) = scan.write().begin_download() else {
                                return;
                            };
                            let svc = svc.clone();
                            spawn(async move {
                                let result = svc.export_pdf(uri).await;
                                if let Ok(ref saved) = result {
                                    tracing::info!(file = %saved.file_name, sha256 = %saved.sha256, "scan saved");
                                    app_state.write().status_message =
                                        Some(format!("Saved {}", saved.file_name));
                                }
                                let message = scan.write().finish_download(&result);
                                toast.set(Some(message.to_owned()));
                            });
                        }
                    },
                    if downloading { "Downloading..." } else { "Download PDF" }
                }
            }

            if pages.is_empty() {
                div { style: "text-align: center; color: #888; margin: 48px 0;",
                    p { "No documents scanned yet" }
                    p { style: "font-size: 14px;", "Tap 'Start Document Scan' to begin" }
                }
            } else {
                h3 { "Scanned Documents ({page_count})" }
                for (index, uri) in pages.iter().enumerate() {
                    {
                        let number = index + 1;
                        let tail = uri_tail(uri);
                        rsx! {
                            div { style: "padding: 12px; margin: 8px 0; border-radius: 8px; background: #f5f5f7;",
                                strong { "Document {number}" }
                                img { src: "{uri}", style: "display: block; width: 100%; max-height: 200px; object-fit: contain; margin: 8px 0;" }
                                p { style: "font-size: 12px; color: #666;", "URI: {tail}..." }
                            }
                        }
                    }
                }
            }

            if let Some(ref msg) = *toast.read() {
                p { style: "margin-top: 12px; color: #666; font-size: 14px; text-align: center;",
                    "{msg}"
                }
            }

            if let Some(err) = error.read().clone() {
                ErrorBanner { error: err }
            }
        }
    }
}

/// Last 50 characters of a URI, for compact display.
fn uri_tail(uri: &str) -> &str {
    let count = uri.chars().count();
    match uri.char_indices().nth(count.saturating_sub(50)) {
        Some((start, _)) => &uri[start..],
        None => uri,
    }
}
