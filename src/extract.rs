// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint-to-metric extraction.
//!
//! Reduces a [`KeypointSequence`] to a [`MetricSet`] of named joint angles and posture
//! measurements taken from the sequence's middle frame. A metric is emitted only when
//! every landmark it needs is present; it is never defaulted to zero.
//!
//! [`movement_metrics`] scores the whole sequence instead: range of motion, hip
//! stability, left/right symmetry and tempo consistency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{body_line_deviation, hip_flexion, horizontal_offset, joint_angle, trunk_lean};
use crate::keypoint::{Frame, KeypointSequence, Landmark};

/// Metric names produced by [`extract_angles`].
pub mod names {
    /// Left hip-knee-ankle angle.
    pub const KNEE_ANGLE: &str = "knee_angle";
    /// Hip flexion from vertical.
    pub const HIP_ANGLE: &str = "hip_angle";
    /// Left shoulder-elbow-wrist angle.
    pub const ELBOW_ANGLE: &str = "elbow_angle";
    /// Hip deviation from the head-to-ankle line.
    pub const BODY_LINE: &str = "body_line";
    /// Horizontal knee-over-ankle offset.
    pub const KNEE_FORWARD: &str = "knee_forward";
    /// Trunk lean from upright.
    pub const BACK_ANGLE: &str = "back_angle";
    /// Knee angle of the more flexed leg.
    pub const FRONT_KNEE_ANGLE: &str = "front_knee_angle";
}

/// Named scalar measurements derived from one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<String, f64>,
}

impl MetricSet {
    /// Create an empty metric set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Set a metric, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a metric, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Check if a metric is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no metric was derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Extract biomechanical metrics from the middle frame of a sequence.
///
/// The middle frame (index `len / 2`) is used because it is the most stable
/// point of a repetition. An empty sequence yields an empty set.
#[must_use]
pub fn extract_angles(sequence: &KeypointSequence) -> MetricSet {
    sequence.middle_frame().map(extract_frame).unwrap_or_default()
}

/// Extract biomechanical metrics from a single frame.
#[must_use]
pub fn extract_frame(frame: &Frame) -> MetricSet {
    use Landmark::{
        Head, LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftShoulder, LeftWrist, RightAnkle,
        RightHip, RightKnee, RightShoulder,
    };

    let p = |l: Landmark| frame.keypoint(l);
    let mut metrics = MetricSet::new();

    if let (Some(hip), Some(knee), Some(ankle)) = (p(LeftHip), p(LeftKnee), p(LeftAnkle)) {
        metrics.insert(names::KNEE_ANGLE, joint_angle(hip, knee, ankle));
    }

    if let (Some(lh), Some(rh), Some(lk), Some(rk)) =
        (p(LeftHip), p(RightHip), p(LeftKnee), p(RightKnee))
    {
        metrics.insert(names::HIP_ANGLE, hip_flexion(lh, rh, lk, rk));
    }

    if let (Some(shoulder), Some(elbow), Some(wrist)) =
        (p(LeftShoulder), p(LeftElbow), p(LeftWrist))
    {
        metrics.insert(names::ELBOW_ANGLE, joint_angle(shoulder, elbow, wrist));
    }

    if let (Some(head), Some(hip), Some(ankle)) = (p(Head), p(LeftHip), p(LeftAnkle)) {
        metrics.insert(names::BODY_LINE, body_line_deviation(head, hip, ankle));
    }

    if let (Some(knee), Some(ankle)) = (p(LeftKnee), p(LeftAnkle)) {
        metrics.insert(names::KNEE_FORWARD, horizontal_offset(knee, ankle));
    }

    if let (Some(ls), Some(rs), Some(lh), Some(rh)) =
        (p(LeftShoulder), p(RightShoulder), p(LeftHip), p(RightHip))
    {
        metrics.insert(names::BACK_ANGLE, trunk_lean(ls, rs, lh, rh));
    }

    let left_leg = match (p(LeftHip), p(LeftKnee), p(LeftAnkle)) {
        (Some(h), Some(k), Some(a)) => Some(joint_angle(h, k, a)),
        _ => None,
    };
    let right_leg = match (p(RightHip), p(RightKnee), p(RightAnkle)) {
        (Some(h), Some(k), Some(a)) => Some(joint_angle(h, k, a)),
        _ => None,
    };
    let front_knee = match (left_leg, right_leg) {
        (Some(l), Some(r)) => Some(l.min(r)),
        (one, other) => one.or(other),
    };
    if let Some(angle) = front_knee {
        metrics.insert(names::FRONT_KNEE_ANGLE, angle);
    }

    metrics
}

/// Whole-sequence movement quality scores.
///
/// Each score is rounded and never negative. Stability, symmetry and tempo are 100 for a
/// perfectly steady sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementMetrics {
    /// Vertical span of all keypoints over the sequence, in percent of the frame height.
    pub range_of_motion: u32,
    /// 100 minus the mean frame-to-frame hip displacement (x100).
    pub stability: u32,
    /// 100 minus the difference between left- and right-side mean displacement (x100).
    pub symmetry: u32,
    /// 100 minus the coefficient of variation of per-frame movement (x100).
    pub tempo: u32,
}

const HIP_SLOTS: [Landmark; 2] = [Landmark::LeftHip, Landmark::RightHip];

const LEFT_SIDE: [Landmark; 6] = [
    Landmark::LeftShoulder,
    Landmark::LeftElbow,
    Landmark::LeftWrist,
    Landmark::LeftHip,
    Landmark::LeftKnee,
    Landmark::LeftAnkle,
];

const RIGHT_SIDE: [Landmark; 6] = [
    Landmark::RightShoulder,
    Landmark::RightElbow,
    Landmark::RightWrist,
    Landmark::RightHip,
    Landmark::RightKnee,
    Landmark::RightAnkle,
];

/// Score range of motion, hip stability, symmetry and tempo over a whole sequence.
///
/// # Arguments
///
/// * `sequence` - The recorded frames.
///
/// # Returns
///
/// * [`MovementMetrics`], all zero for an empty sequence. With fewer than two frames
///   there is no displacement, so stability, symmetry and tempo are 100; tempo also
///   needs three frames to vary.
#[must_use]
pub fn movement_metrics(sequence: &KeypointSequence) -> MovementMetrics {
    if sequence.is_empty() {
        return MovementMetrics::default();
    }

    let (min_y, max_y) = sequence
        .iter()
        .flat_map(|frame| frame.keypoints.iter().flatten())
        .map(|kp| kp.y)
        .filter(|y| y.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let range = if max_y >= min_y { (max_y - min_y) * 100.0 } else { 0.0 };

    let left = mean_displacement(sequence, &LEFT_SIDE);
    let right = mean_displacement(sequence, &RIGHT_SIDE);

    MovementMetrics {
        range_of_motion: to_score(range),
        stability: to_score(mean_displacement(sequence, &HIP_SLOTS).mul_add(-100.0, 100.0)),
        symmetry: to_score((left - right).abs().mul_add(-100.0, 100.0)),
        tempo: to_score(tempo_variation(sequence).mul_add(-100.0, 100.0)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u32 {
    if value.is_finite() {
        value.max(0.0).round() as u32
    } else {
        0
    }
}

fn displacement(prev: &Frame, curr: &Frame, slot: usize) -> Option<f64> {
    let distance = curr.get(slot)?.distance_to(prev.get(slot)?);
    distance.is_finite().then_some(distance)
}

/// Mean frame-to-frame displacement of the given landmarks; 0 when nothing moved between
/// tracked frames.
#[allow(clippy::cast_precision_loss)]
fn mean_displacement(sequence: &KeypointSequence, landmarks: &[Landmark]) -> f64 {
    let moves: Vec<f64> = sequence
        .frames()
        .windows(2)
        .flat_map(move |pair| {
            landmarks
                .iter()
                .filter_map(move |l| displacement(&pair[0], &pair[1], l.index()))
        })
        .collect();
    if moves.is_empty() {
        0.0
    } else {
        moves.iter().sum::<f64>() / moves.len() as f64
    }
}

/// Coefficient of variation of the per-frame mean movement over all slots.
#[allow(clippy::cast_precision_loss)]
fn tempo_variation(sequence: &KeypointSequence) -> f64 {
    if sequence.len() < 3 {
        return 0.0;
    }

    let movements: Vec<f64> = sequence
        .frames()
        .windows(2)
        .filter_map(|pair| {
            let moves: Vec<f64> = (0..pair[1].len())
                .filter_map(|slot| displacement(&pair[0], &pair[1], slot))
                .collect();
            (!moves.is_empty()).then(|| moves.iter().sum::<f64>() / moves.len() as f64)
        })
        .collect();
    if movements.len() < 2 {
        return 0.0;
    }

    let n = movements.len() as f64;
    let mean = movements.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = movements.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Keypoint;

    /// Standing pose on the 13-landmark layout.
    fn standing() -> Vec<(f64, f64)> {
        vec![
            (0.5, 0.2),
            (0.45, 0.35),
            (0.55, 0.35),
            (0.4, 0.5),
            (0.6, 0.5),
            (0.35, 0.65),
            (0.65, 0.65),
            (0.48, 0.7),
            (0.52, 0.7),
            (0.47, 0.85),
            (0.53, 0.85),
            (0.46, 0.95),
            (0.54, 0.95),
        ]
    }

    fn sequence_of(frames: Vec<Frame>) -> KeypointSequence {
        KeypointSequence::new(frames).unwrap()
    }

    #[test]
    fn test_empty_sequence() {
        assert!(extract_angles(&KeypointSequence::default()).is_empty());
    }

    #[test]
    fn test_single_frame_sequence() {
        let seq = sequence_of(vec![Frame::from_points(&standing(), 0.0, 0)]);
        let metrics = extract_angles(&seq);
        for name in [
            names::KNEE_ANGLE,
            names::HIP_ANGLE,
            names::ELBOW_ANGLE,
            names::BODY_LINE,
            names::KNEE_FORWARD,
            names::BACK_ANGLE,
            names::FRONT_KNEE_ANGLE,
        ] {
            assert!(metrics.contains(name), "missing {name}");
        }
        assert!((metrics.get(names::KNEE_FORWARD).unwrap() - 1.0).abs() < 1e-9);
        assert!(metrics.get(names::BACK_ANGLE).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_uses_middle_frame() {
        let mut bent = standing();
        bent[9] = (0.6, 0.8); // left knee pushed forward
        let frames = vec![
            Frame::from_points(&standing(), 0.0, 0),
            Frame::from_points(&bent, 33.3, 1),
            Frame::from_points(&standing(), 66.6, 2),
        ];
        let metrics = extract_angles(&sequence_of(frames));
        assert!((metrics.get(names::KNEE_FORWARD).unwrap() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_landmark_omits_metric() {
        let mut keypoints: Vec<Option<Keypoint>> = standing()
            .into_iter()
            .map(|(x, y)| Some(Keypoint::new(x, y, 1.0)))
            .collect();
        keypoints[Landmark::LeftAnkle.index()] = None;
        let frame = Frame::new(keypoints, 0.0, 0);
        let metrics = extract_frame(&frame);

        assert!(!metrics.contains(names::KNEE_ANGLE));
        assert!(!metrics.contains(names::BODY_LINE));
        assert!(!metrics.contains(names::KNEE_FORWARD));
        assert!(metrics.contains(names::ELBOW_ANGLE));
        // right leg still complete
        assert!(metrics.contains(names::FRONT_KNEE_ANGLE));
    }

    #[test]
    fn test_short_frame_omits_everything() {
        let frame = Frame::from_points(&[(0.5, 0.2)], 0.0, 0);
        assert!(extract_frame(&frame).is_empty());
    }

    #[test]
    fn test_metric_set_collect() {
        let metrics: MetricSet =
            [("knee_angle", 135.0), ("hip_angle", 80.0)].into_iter().collect();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.get("knee_angle"), Some(135.0));
        assert_eq!(metrics.iter().next(), Some(("hip_angle", 80.0)));
    }

    fn shifted(points: &[(f64, f64)], dy: f64, slots: &[usize]) -> Vec<(f64, f64)> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| if slots.contains(&i) { (x, y + dy) } else { (x, y) })
            .collect()
    }

    #[test]
    fn test_movement_metrics_empty() {
        assert_eq!(movement_metrics(&KeypointSequence::default()), MovementMetrics::default());
    }

    #[test]
    fn test_movement_metrics_single_frame() {
        let seq = sequence_of(vec![Frame::from_points(&standing(), 0.0, 0)]);
        let metrics = movement_metrics(&seq);
        // head at 0.2, ankles at 0.95
        assert_eq!(metrics.range_of_motion, 75);
        assert_eq!(metrics.stability, 100);
        assert_eq!(metrics.symmetry, 100);
        assert_eq!(metrics.tempo, 100);
    }

    #[test]
    fn test_movement_metrics_still_sequence() {
        let frames = (0..10).map(|i| Frame::from_points(&standing(), 0.0, i)).collect();
        let metrics = movement_metrics(&sequence_of(frames));
        assert_eq!(metrics.range_of_motion, 75);
        assert_eq!(metrics.stability, 100);
        assert_eq!(metrics.symmetry, 100);
        assert_eq!(metrics.tempo, 100);
    }

    #[test]
    fn test_movement_metrics_two_frames() {
        // only the left side moves down by 0.02
        let left: Vec<usize> = LEFT_SIDE.iter().map(|l| l.index()).collect();
        let frames = vec![
            Frame::from_points(&standing(), 0.0, 0),
            Frame::from_points(&shifted(&standing(), 0.02, &left), 33.3, 1),
        ];
        let metrics = movement_metrics(&sequence_of(frames));
        assert_eq!(metrics.range_of_motion, 77);
        // left hip moved 0.02, right hip still: mean 0.01
        assert_eq!(metrics.stability, 99);
        assert_eq!(metrics.symmetry, 98);
        // fewer than three frames
        assert_eq!(metrics.tempo, 100);
    }

    #[test]
    fn test_movement_metrics_uneven_tempo() {
        let all: Vec<usize> = (0..Landmark::COUNT).collect();
        let frames = vec![
            Frame::from_points(&standing(), 0.0, 0),
            Frame::from_points(&shifted(&standing(), 0.01, &all), 33.3, 1),
            Frame::from_points(&shifted(&standing(), 0.04, &all), 66.6, 2),
        ];
        let metrics = movement_metrics(&sequence_of(frames));
        // movements 0.01 then 0.03: mean 0.02, deviation 0.01
        assert_eq!(metrics.tempo, 50);
        assert_eq!(metrics.symmetry, 100);
        assert_eq!(metrics.stability, 98);
    }
}
