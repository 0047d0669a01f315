// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint data model.
//!
//! A [`KeypointSequence`] is an ordered list of [`Frame`]s, each holding one optional
//! [`Keypoint`] per tracked [`Landmark`]. Slots are matched by ordinal position: slot `i`
//! of every frame in a sequence refers to the same landmark.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AnalysisError, Result};

/// Tracked body landmarks, in ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Landmark {
    /// Head (nose/face centre).
    Head,
    /// Left shoulder.
    LeftShoulder,
    /// Right shoulder.
    RightShoulder,
    /// Left elbow.
    LeftElbow,
    /// Right elbow.
    RightElbow,
    /// Left wrist.
    LeftWrist,
    /// Right wrist.
    RightWrist,
    /// Left hip.
    LeftHip,
    /// Right hip.
    RightHip,
    /// Left knee.
    LeftKnee,
    /// Right knee.
    RightKnee,
    /// Left ankle.
    LeftAnkle,
    /// Right ankle.
    RightAnkle,
}

impl Landmark {
    /// Number of landmarks in the layout.
    pub const COUNT: usize = 13;

    /// All landmarks, indexed by ordinal.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Head,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Ordinal slot of this landmark within a frame.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Landmark stored at the given ordinal slot, if the slot is part of the layout.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Snake-case name used in reports and rule tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// Body-part name for an ordinal slot; slots past the layout are named `point_<i>`.
    #[must_use]
    pub fn slot_name(index: usize) -> String {
        Self::from_index(index).map_or_else(|| format!("point_{index}"), |l| l.as_str().to_string())
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Landmark {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == key || (key == "nose" && *l == Self::Head))
            .ok_or_else(|| AnalysisError::ParseError(format!("unknown landmark '{s}'")))
    }
}

const fn default_confidence() -> f64 {
    1.0
}

/// A 2-D landmark position in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal position, 0.0 (left) to 1.0 (right).
    pub x: f64,
    /// Vertical position, 0.0 (top) to 1.0 (bottom).
    pub y: f64,
    /// Detection confidence in [0, 1].
    #[serde(default = "default_confidence", alias = "visibility")]
    pub confidence: f64,
}

impl Keypoint {
    /// Create a keypoint.
    #[must_use]
    pub const fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Euclidean distance to another keypoint.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Return a copy shifted by `(dx, dy)`.
    #[must_use]
    pub const fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.confidence)
    }
}

/// One timestamped snapshot of all tracked keypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// One slot per landmark ordinal; `None` when the landmark was not tracked.
    pub keypoints: Vec<Option<Keypoint>>,
    /// Capture time in milliseconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Position of the frame within its recording.
    #[serde(alias = "frameIndex")]
    pub frame_number: usize,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub const fn new(
        keypoints: Vec<Option<Keypoint>>,
        timestamp: f64,
        frame_number: usize,
    ) -> Self {
        Self {
            keypoints,
            timestamp,
            frame_number,
        }
    }

    /// Create a frame where every slot is present with full confidence.
    #[must_use]
    pub fn from_points(points: &[(f64, f64)], timestamp: f64, frame_number: usize) -> Self {
        let keypoints = points
            .iter()
            .map(|&(x, y)| Some(Keypoint::new(x, y, 1.0)))
            .collect();
        Self::new(keypoints, timestamp, frame_number)
    }

    /// Keypoint for a landmark, if tracked in this frame.
    #[must_use]
    pub fn keypoint(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.get(landmark.index())
    }

    /// Keypoint at an ordinal slot, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index).and_then(Option::as_ref)
    }

    /// Number of slots (present or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Check if the frame has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Return a copy with every present keypoint shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let keypoints = self
            .keypoints
            .iter()
            .map(|kp| kp.map(|k| k.translated(dx, dy)))
            .collect();
        Self::new(keypoints, self.timestamp, self.frame_number)
    }
}

/// An ordered list of frames covering one repetition or recording window.
///
/// Frame numbers strictly increase; this is checked on construction and when
/// deserializing. Frames decoded without a `frameNumber` are numbered by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "Vec<Frame>")]
pub struct KeypointSequence {
    frames: Vec<Frame>,
}

/// Frame as found in recordings, where the frame number may be omitted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameRecord {
    keypoints: Vec<Option<Keypoint>>,
    #[serde(default)]
    timestamp: f64,
    #[serde(default, alias = "frameIndex")]
    frame_number: Option<usize>,
}

impl<'de> Deserialize<'de> for KeypointSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let frames = Vec::<FrameRecord>::deserialize(deserializer)?
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                Frame::new(record.keypoints, record.timestamp, record.frame_number.unwrap_or(i))
            })
            .collect();
        Self::new(frames).map_err(serde::de::Error::custom)
    }
}

impl KeypointSequence {
    /// Create a sequence from frames.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidSequence`] if frame numbers do not strictly increase.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if let Some(pair) = frames
            .windows(2)
            .find(|pair| pair[1].frame_number <= pair[0].frame_number)
        {
            return Err(AnalysisError::InvalidSequence(format!(
                "frame number {} follows {}",
                pair[1].frame_number, pair[0].frame_number
            )));
        }
        Ok(Self { frames })
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the sequence has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at a position in the sequence.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// The representative frame used for metric extraction: index `len / 2`.
    #[must_use]
    pub fn middle_frame(&self) -> Option<&Frame> {
        self.frames.get(self.frames.len() / 2)
    }

    /// Iterate over frames.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl TryFrom<Vec<Frame>> for KeypointSequence {
    type Error = AnalysisError;

    fn try_from(frames: Vec<Frame>) -> Result<Self> {
        Self::new(frames)
    }
}

impl From<KeypointSequence> for Vec<Frame> {
    fn from(sequence: KeypointSequence) -> Self {
        sequence.frames
    }
}

impl<'a> IntoIterator for &'a KeypointSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_ordinals() {
        assert_eq!(Landmark::Head.index(), 0);
        assert_eq!(Landmark::LeftHip.index(), 7);
        assert_eq!(Landmark::RightAnkle.index(), 12);
        assert_eq!(Landmark::from_index(9), Some(Landmark::LeftKnee));
        assert_eq!(Landmark::from_index(13), None);
        assert_eq!(Landmark::slot_name(11), "left_ankle");
        assert_eq!(Landmark::slot_name(20), "point_20");
    }

    #[test]
    fn test_landmark_from_str() {
        assert_eq!("left_knee".parse::<Landmark>().unwrap(), Landmark::LeftKnee);
        assert_eq!("Right Hip".parse::<Landmark>().unwrap(), Landmark::RightHip);
        assert_eq!("nose".parse::<Landmark>().unwrap(), Landmark::Head);
        assert!("tail".parse::<Landmark>().is_err());
    }

    #[test]
    fn test_sequence_rejects_unordered_frames() {
        let frames = vec![
            Frame::from_points(&[(0.5, 0.5)], 0.0, 1),
            Frame::from_points(&[(0.5, 0.5)], 33.3, 1),
        ];
        assert!(matches!(
            KeypointSequence::new(frames),
            Err(AnalysisError::InvalidSequence(_))
        ));
    }

    #[test]
    fn test_middle_frame() {
        let single =
            KeypointSequence::new(vec![Frame::from_points(&[(0.1, 0.2)], 0.0, 0)]).unwrap();
        assert_eq!(single.middle_frame().unwrap().frame_number, 0);

        let frames = (0..4).map(|i| Frame::from_points(&[], 0.0, i)).collect();
        let seq = KeypointSequence::new(frames).unwrap();
        assert_eq!(seq.middle_frame().unwrap().frame_number, 2);

        assert!(KeypointSequence::default().middle_frame().is_none());
    }

    #[test]
    fn test_frame_json_with_missing_slot() {
        let json = r#"[{"keypoints":[{"x":0.5,"y":0.2,"visibility":0.9},null],
                        "timestamp":0,"frameNumber":0}]"#;
        let seq: KeypointSequence = serde_json::from_str(json).unwrap();
        let frame = seq.get(0).unwrap();
        assert_eq!(frame.len(), 2);
        assert!((frame.keypoint(Landmark::Head).unwrap().confidence - 0.9).abs() < 1e-9);
        assert!(frame.keypoint(Landmark::LeftShoulder).is_none());
    }

    #[test]
    fn test_json_rejects_unordered_frames() {
        let json = r#"[{"keypoints":[],"frameNumber":3},{"keypoints":[],"frameNumber":2}]"#;
        assert!(serde_json::from_str::<KeypointSequence>(json).is_err());
    }

    #[test]
    fn test_json_without_frame_numbers() {
        let json = r#"[{"keypoints":[{"x":0.5,"y":0.2}],"timestamp":0},
                       {"keypoints":[{"x":0.5,"y":0.3}],"timestamp":33},
                       {"keypoints":[{"x":0.5,"y":0.4}],"timestamp":66}]"#;
        let seq: KeypointSequence = serde_json::from_str(json).unwrap();
        let numbers: Vec<usize> = seq.iter().map(|f| f.frame_number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(seq.middle_frame().unwrap().frame_number, 1);
    }

    #[test]
    fn test_keypoint_distance() {
        let a = Keypoint::new(0.0, 0.0, 1.0);
        let b = Keypoint::new(0.3, 0.4, 1.0);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-12);
    }
}
