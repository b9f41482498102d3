// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Facial recognition page — live face analysis results.
//
// The analysis session starts when the page mounts (once the camera
// permission is granted) and is shut down when the page unmounts.

use std::time::Duration;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;

use visionwerk_core::error::VisionwerkError;
use visionwerk_core::human_errors::{HumanError, humanize_error};
use visionwerk_core::types::{FaceScreenState, FaceSummary, LandmarkPosition};

use super::ErrorBanner;
use crate::services::app_services::AppServices;
use crate::state::AppState;

/// Coordinate space of the landmark overlay (portrait analysis resolution).
const OVERLAY_VIEWBOX: &str = "0 0 480 640";

#[component]
pub fn Faces() -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let mut screen = use_signal(FaceScreenState::default);
    let mut permitted = use_signal(|| svc.has_camera_permission());
    let mut error = use_signal(|| Option::<HumanError>::None);

    // Ask once on entry; the button below covers a dismissed dialog.
    let svc_ask = svc.clone();
    use_hook(move || {
        if !svc_ask.has_camera_permission()
            && let Err(e) = svc_ask.request_camera_permission()
        {
            tracing::warn!(error = %e, "camera permission request failed");
            error.set(Some(humanize_error(&e)));
        }
    });

    // Wait for the permission dialog's answer.
    let svc_perm = svc.clone();
    let _permission_poll = use_resource(move || {
        let svc = svc_perm.clone();
        async move {
            while !svc.has_camera_permission() {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            if !*permitted.peek() {
                permitted.set(true);
            }
        }
    });

    let svc_run = svc.clone();
    let _session = use_resource(move || {
        let svc = svc_run.clone();
        async move {
            if !*permitted.read() {
                return;
            }
            match svc.start_face_session().await {
                Ok(mut rx) => loop {
                    let snapshot = rx.borrow_and_update().clone();
                    screen.set(snapshot);
                    if rx.changed().await.is_err() {
                        break;
                    }
                },
                // The page was left before the camera came up.
                Err(VisionwerkError::SessionClosed) => {
                    tracing::debug!("face analysis start abandoned");
                }
                Err(e) => {
                    tracing::error!(error = %e, "face analysis could not start");
                    error.set(Some(humanize_error(&e)));
                }
            }
        }
    });

    let svc_stop = svc.clone();
    use_drop(move || {
        let svc = svc_stop.clone();
        spawn_forever(async move {
            if let Some(stats) = svc.stop_face_session().await {
                state.write().last_session = Some(stats);
            }
        });
    });

    let current = screen.read().clone();

    rsx! {
        div {
            h1 { "Facial Recognition" }

            if !*permitted.read() {
                div { style: "text-align: center; margin: 48px 0;",
                    p { "Camera permission is required for facial recognition" }
                    button {
                        style: "padding: 12px 24px; border-radius: 8px; border: none; background: #007aff; color: white;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                if let Err(e) = svc.request_camera_permission() {
                                    error.set(Some(humanize_error(&e)));
                                }
                            }
                        },
                        "Grant Permission"
                    }
                }
            } else {
                div { style: "position: relative; height: 320px; border-radius: 12px; background: #111; overflow: hidden;",
                    LandmarkOverlay { landmarks: current.result.landmarks.clone() }
                    if current.processing {
                        span { style: "position: absolute; top: 8px; right: 8px; color: white; font-size: 12px;",
                            "Analysing..."
                        }
                    }
                }

                if current.result.faces.is_empty() {
                    p { style: "text-align: center; color: #888; margin: 24px 0;",
                        "Point camera at a face to detect..."
                    }
                } else {
                    h3 { "Face Detection Results:" }
                    for (index, face) in current.result.faces.iter().enumerate() {
                        FaceCard { index, face: face.clone() }
                    }
                }
            }

            if let Some(err) = error.read().clone() {
                ErrorBanner { error: err }
            }
        }
    }
}

#[component]
fn FaceCard(index: usize, face: FaceSummary) -> Element {
    let mut lines = face_lines(index, &face);
    let title = lines.remove(0);
    rsx! {
        div { style: "padding: 12px; margin: 8px 0; border-radius: 8px; background: #f5f5f7;",
            strong { "{title}" }
            for line in lines.iter() {
                p { style: "margin: 4px 0; font-size: 14px;", "{line}" }
            }
        }
    }
}

#[component]
fn LandmarkOverlay(landmarks: Vec<LandmarkPosition>) -> Element {
    rsx! {
        svg {
            view_box: OVERLAY_VIEWBOX,
            width: "100%",
            height: "100%",
            preserve_aspect_ratio: "xMidYMid meet",
            for point in landmarks.iter() {
                circle { cx: "{point.x}", cy: "{point.y}", r: "5", fill: "#ff3b30" }
            }
        }
    }
}

/// Display lines for one detected face.
fn face_lines(index: usize, face: &FaceSummary) -> Vec<String> {
    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    vec![
        format!("Face {}", index + 1),
        format!("Confidence: {:.2}", face.confidence),
        format!("Smiling: {}", yes_no(face.is_smiling)),
        format!("Eyes Open: {}", yes_no(face.eyes_open)),
        format!(
            "Head Angles - Y: {:.1}\u{00B0}, Z: {:.1}\u{00B0}",
            face.head_euler_angle_y, face.head_euler_angle_z
        ),
        format!("Landmarks: {}", face.landmarks_count),
    ]
}
