// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Planar geometry helpers for joint and posture measurements.
//!
//! All functions take keypoints in normalized image coordinates (y grows downwards)
//! and never fail: degenerate or non-finite input yields `NaN`, which callers filter.

use crate::keypoint::Keypoint;

/// Fraction of the head-to-ankle vertical span at which the hip sits in a straight body line.
pub const HIP_LINE_RATIO: f64 = 0.7;

/// Scale applied to normalized-coordinate offsets to express them as percentages.
pub const OFFSET_SCALE: f64 = 100.0;

/// Calculate the angle at `vertex` between the vectors `vertex -> a` and `vertex -> b`.
///
/// # Arguments
///
/// * `a` - End point of the first segment.
/// * `vertex` - Joint at which the angle is measured.
/// * `b` - End point of the second segment.
///
/// # Returns
///
/// Angle in degrees in `[0, 180]`, or `NaN` if either segment has zero length.
#[must_use]
pub fn joint_angle(a: &Keypoint, vertex: &Keypoint, b: &Keypoint) -> f64 {
    let (v1x, v1y) = (a.x - vertex.x, a.y - vertex.y);
    let (v2x, v2y) = (b.x - vertex.x, b.y - vertex.y);

    let dot = v1x.mul_add(v2x, v1y * v2y);
    // one sqrt over the squared lengths keeps collinear joints at exactly 0 or 180
    let magnitude = (v1x.mul_add(v1x, v1y * v1y) * v2x.mul_add(v2x, v2y * v2y)).sqrt();

    // clamp guards acos against drift just outside [-1, 1]; NaN passes through
    let cos_angle = (dot / magnitude).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Midpoint of two keypoints. Confidence is the lower of the two.
#[must_use]
pub const fn midpoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
    Keypoint::new(
        a.x.midpoint(b.x),
        a.y.midpoint(b.y),
        a.confidence.min(b.confidence),
    )
}

/// Absolute angle in degrees between the vector `from -> to` and the vertical axis.
#[must_use]
pub fn angle_from_vertical(from: &Keypoint, to: &Keypoint) -> f64 {
    (to.x - from.x).atan2(to.y - from.y).to_degrees().abs()
}

/// Hip flexion: angle from vertical of the hip-centre to knee-centre segment.
#[must_use]
pub fn hip_flexion(
    left_hip: &Keypoint,
    right_hip: &Keypoint,
    left_knee: &Keypoint,
    right_knee: &Keypoint,
) -> f64 {
    angle_from_vertical(&midpoint(left_hip, right_hip), &midpoint(left_knee, right_knee))
}

/// Trunk lean: angle of the hip-centre to shoulder-centre segment away from upright.
///
/// Returns 0 for a perfectly upright torso and 90 for a horizontal one.
#[must_use]
pub fn trunk_lean(
    left_shoulder: &Keypoint,
    right_shoulder: &Keypoint,
    left_hip: &Keypoint,
    right_hip: &Keypoint,
) -> f64 {
    let shoulders = midpoint(left_shoulder, right_shoulder);
    let hips = midpoint(left_hip, right_hip);
    // measured upwards, so the reference direction is -y
    (shoulders.x - hips.x).atan2(hips.y - shoulders.y).to_degrees().abs()
}

/// Vertical deviation of the hip from the straight head-to-ankle line.
///
/// The expected hip height is [`HIP_LINE_RATIO`] of the way from head to ankle.
/// Larger values mean more sagging or piking.
#[must_use]
pub fn body_line_deviation(head: &Keypoint, hip: &Keypoint, ankle: &Keypoint) -> f64 {
    let expected_hip_y = (ankle.y - head.y).mul_add(HIP_LINE_RATIO, head.y);
    (hip.y - expected_hip_y).abs() * OFFSET_SCALE
}

/// Horizontal distance between two keypoints, scaled by [`OFFSET_SCALE`].
#[must_use]
pub const fn horizontal_offset(a: &Keypoint, b: &Keypoint) -> f64 {
    (a.x - b.x).abs() * OFFSET_SCALE
}
