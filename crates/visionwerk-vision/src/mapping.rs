// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw detector output -> UI-facing detection result.

use visionwerk_core::types::{DetectionResult, FaceSummary, LandmarkPosition, RawFace};

/// Confidence shown for a face the detector is tracking across frames.
pub const TRACKED_CONFIDENCE: f32 = 1.0;
/// Confidence shown for a face without a tracking id.
pub const UNTRACKED_CONFIDENCE: f32 = 0.8;
/// Probabilities strictly above this count as "yes".
pub const CLASSIFICATION_THRESHOLD: f32 = 0.5;

/// Summarise one raw face.
///
/// Missing smiling probability reads as not smiling, while a missing eye
/// probability (either eye) reads as eyes open.
pub fn map_face(face: &RawFace) -> FaceSummary {
    let confidence = if face.tracking_id.is_some() {
        TRACKED_CONFIDENCE
    } else {
        UNTRACKED_CONFIDENCE
    };

    let is_smiling = face
        .smiling_probability
        .is_some_and(|p| p > CLASSIFICATION_THRESHOLD);

    let eyes_open = match (face.left_eye_open_probability, face.right_eye_open_probability) {
        (Some(left), Some(right)) => {
            left > CLASSIFICATION_THRESHOLD && right > CLASSIFICATION_THRESHOLD
        }
        _ => true,
    };

    FaceSummary {
        confidence,
        is_smiling,
        eyes_open,
        head_euler_angle_y: face.head_euler_angle_y,
        head_euler_angle_z: face.head_euler_angle_z,
        landmarks_count: face.landmarks.len(),
    }
}

/// Map a whole detector response.
///
/// Landmarks of all faces are concatenated in detection order.
pub fn map_faces(faces: &[RawFace]) -> DetectionResult {
    let summaries = faces.iter().map(map_face).collect();
    let landmarks = faces
        .iter()
        .flat_map(|face| face.landmarks.iter())
        .map(|landmark| LandmarkPosition::from(landmark.position))
        .collect();

    DetectionResult {
        faces: summaries,
        landmarks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionwerk_core::types::{LandmarkKind, Point2, RawLandmark};

    fn landmark(kind: LandmarkKind, x: f32, y: f32) -> RawLandmark {
        RawLandmark {
            kind,
            position: Point2::new(x, y),
        }
    }

    #[test]
    fn smiling_without_eye_probabilities_fails_open() {
        let face = RawFace {
            smiling_probability: Some(0.6),
            ..Default::default()
        };
        let summary = map_face(&face);
        assert!(summary.is_smiling);
        assert!(summary.eyes_open);
    }

    #[test]
    fn missing_smile_probability_fails_closed() {
        let summary = map_face(&RawFace::default());
        assert!(!summary.is_smiling);
    }

    #[test]
    fn one_missing_eye_still_reads_open() {
        let face = RawFace {
            left_eye_open_probability: Some(0.1),
            right_eye_open_probability: None,
            ..Default::default()
        };
        assert!(map_face(&face).eyes_open);
    }

    #[test]
    fn both_eyes_must_be_open() {
        let face = RawFace {
            left_eye_open_probability: Some(0.9),
            right_eye_open_probability: Some(0.2),
            ..Default::default()
        };
        assert!(!map_face(&face).eyes_open);
    }

    #[test]
    fn threshold_is_exclusive() {
        let face = RawFace {
            smiling_probability: Some(0.5),
            left_eye_open_probability: Some(0.5),
            right_eye_open_probability: Some(0.9),
            ..Default::default()
        };
        let summary = map_face(&face);
        assert!(!summary.is_smiling);
        assert!(!summary.eyes_open);
    }

    #[test]
    fn confidence_follows_tracking_id() {
        let tracked = RawFace {
            tracking_id: Some(7),
            ..Default::default()
        };
        assert_eq!(map_face(&tracked).confidence, TRACKED_CONFIDENCE);
        assert_eq!(map_face(&RawFace::default()).confidence, UNTRACKED_CONFIDENCE);
    }

    #[test]
    fn landmarks_concatenate_in_face_order() {
        let first = RawFace {
            head_euler_angle_y: 12.5,
            head_euler_angle_z: -3.0,
            landmarks: vec![
                landmark(LandmarkKind::LeftEye, 1.0, 1.0),
                landmark(LandmarkKind::RightEye, 2.0, 1.0),
            ],
            ..Default::default()
        };
        let second = RawFace {
            landmarks: vec![landmark(LandmarkKind::NoseBase, 10.0, 10.0)],
            ..Default::default()
        };

        let result = map_faces(&[first, second]);
        assert_eq!(result.faces.len(), 2);
        assert_eq!(result.faces[0].landmarks_count, 2);
        assert_eq!(result.faces[0].head_euler_angle_y, 12.5);
        assert_eq!(result.faces[1].landmarks_count, 1);
        let xs: Vec<f32> = result.landmarks.iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 10.0]);
    }

    #[test]
    fn no_faces_maps_to_empty_result() {
        assert!(map_faces(&[]).is_empty());
    }
}
