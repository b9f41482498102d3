// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Visionwerk.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one camera analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Camera / detector configuration
// ---------------------------------------------------------------------------

/// Which physical camera feeds the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraLens {
    Front,
    Back,
}

/// Speed/accuracy trade-off requested from the face detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceMode {
    Fast,
    Accurate,
}

/// Whether the detector locates facial landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandmarkMode {
    None,
    All,
}

/// Whether the detector classifies smiling / eyes open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationMode {
    None,
    All,
}

/// Whether the detector traces face contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContourMode {
    None,
    All,
}

/// Face detector configuration, fixed when an analysis session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorOptions {
    pub performance: PerformanceMode,
    pub landmarks: LandmarkMode,
    pub classification: ClassificationMode,
    pub contours: ContourMode,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            performance: PerformanceMode::Fast,
            landmarks: LandmarkMode::All,
            classification: ClassificationMode::All,
            contours: ContourMode::All,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw detector output
// ---------------------------------------------------------------------------

/// A point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Named facial landmark positions reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandmarkKind {
    MouthBottom,
    LeftCheek,
    LeftEar,
    LeftEye,
    MouthLeft,
    NoseBase,
    RightCheek,
    RightEar,
    RightEye,
    MouthRight,
}

/// A single landmark as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
    pub kind: LandmarkKind,
    pub position: Point2,
}

/// One face as reported by the external detector, before mapping.
///
/// Probabilities are optional because the detector omits them when
/// classification could not be computed for that face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFace {
    pub tracking_id: Option<i32>,
    pub smiling_probability: Option<f32>,
    pub left_eye_open_probability: Option<f32>,
    pub right_eye_open_probability: Option<f32>,
    /// Head rotation around the vertical axis, in degrees.
    pub head_euler_angle_y: f32,
    /// Head rotation around the axis pointing out of the image, in degrees.
    pub head_euler_angle_z: f32,
    pub landmarks: Vec<RawLandmark>,
}

// ---------------------------------------------------------------------------
// UI-facing detection result
// ---------------------------------------------------------------------------

/// UI-facing summary of one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSummary {
    /// 1.0 for tracked faces, 0.8 otherwise. Not a probability.
    pub confidence: f32,
    pub is_smiling: bool,
    pub eyes_open: bool,
    pub head_euler_angle_y: f32,
    pub head_euler_angle_z: f32,
    pub landmarks_count: usize,
}

/// A landmark position drawn on the preview overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPosition {
    pub x: f32,
    pub y: f32,
}

impl From<Point2> for LandmarkPosition {
    fn from(p: Point2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Output of one detector invocation, mapped for the UI.
///
/// Each result replaces the previous one in full.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub faces: Vec<FaceSummary>,
    /// Landmarks of every face, concatenated in detection order.
    pub landmarks: Vec<LandmarkPosition>,
}

impl DetectionResult {
    /// The result published when detection fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.landmarks.is_empty()
    }
}

/// State the facial recognition screen renders from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceScreenState {
    pub result: DetectionResult,
    /// Set when a frame is submitted, cleared when its result is delivered.
    pub processing: bool,
}

// ---------------------------------------------------------------------------
// Document scanner
// ---------------------------------------------------------------------------

/// Scanner UI flavour offered by the document scanner SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScannerMode {
    Base,
    BaseWithFilter,
    Full,
}

/// Output formats requested from the document scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultFormat {
    Jpeg,
    Pdf,
}

/// Options passed to the document scanner when a scan is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerOptions {
    pub gallery_import_allowed: bool,
    pub page_limit: u32,
    pub result_formats: Vec<ResultFormat>,
    pub mode: ScannerMode,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            gallery_import_allowed: false,
            page_limit: 5,
            result_formats: vec![ResultFormat::Jpeg, ResultFormat::Pdf],
            mode: ScannerMode::Full,
        }
    }
}

impl ScannerOptions {
    pub fn wants_pdf(&self) -> bool {
        self.result_formats.contains(&ResultFormat::Pdf)
    }
}

/// The PDF produced by a completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedPdf {
    /// Content URI (or file path on desktop) of the generated PDF.
    pub uri: String,
    pub page_count: u32,
}

/// Everything a completed scan produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// One image URI per scanned page, in page order.
    pub page_uris: Vec<String>,
    pub pdf: Option<ScannedPdf>,
}

/// Result delivered by the host activity after the scanner closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanActivityResult {
    /// The user finished scanning. `None` when the result could not be parsed.
    Ok(Option<ScanOutcome>),
    /// The user backed out of the scanner.
    Cancelled,
}
