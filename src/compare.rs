// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Reference pose comparison.
//!
//! The [`ReferenceComparator`] samples about ten evenly spaced frames from a user's
//! sequence and the stored professional reference, measures per-landmark positional
//! divergence at matching ordinal slots, and reports a 0-100 similarity score with the
//! largest per-body-part deviations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::keypoint::{Frame, KeypointSequence, Landmark};
use crate::reference::ReferenceLibrary;
use crate::rules::Severity;

/// Deviation above which a body-part difference is [`Severity::High`].
pub const HIGH_DEVIATION: f64 = 0.15;

/// Deviation above which a body-part difference is [`Severity::Medium`].
pub const MEDIUM_DEVIATION: f64 = 0.10;

/// Configuration for reference comparison.
///
/// The defaults are the calibrated constants; change them only to recalibrate.
///
/// # Example
///
/// ```rust
/// use formcheck::ComparisonConfig;
///
/// let config = ComparisonConfig::new()
///     .with_sample_count(20)
///     .with_max_differences(5);
/// assert_eq!(config.sample_count, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    /// Approximate number of frames sampled across the overlapping length.
    pub sample_count: usize,
    /// Factor converting a mean normalized distance into similarity points.
    pub distance_scale: f64,
    /// Landmark distance above which a body-part difference is recorded.
    pub difference_threshold: f64,
    /// Number of body-part differences reported.
    pub max_differences: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            sample_count: 10,
            distance_scale: 200.0,
            difference_threshold: 0.05,
            max_differences: 3,
        }
    }
}

impl ComparisonConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the approximate number of sampled frames.
    #[must_use]
    pub const fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the distance-to-similarity scale.
    #[must_use]
    pub const fn with_distance_scale(mut self, scale: f64) -> Self {
        self.distance_scale = scale;
        self
    }

    /// Set the distance above which a difference is recorded.
    #[must_use]
    pub const fn with_difference_threshold(mut self, threshold: f64) -> Self {
        self.difference_threshold = threshold;
        self
    }

    /// Set the number of reported differences.
    #[must_use]
    pub const fn with_max_differences(mut self, max: usize) -> Self {
        self.max_differences = max;
        self
    }
}

/// Qualitative similarity bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    /// Below 60.
    NeedsImprovement,
    /// 60 to below 75.
    Fair,
    /// 75 to below 90.
    Good,
    /// 90 and above.
    Excellent,
}

impl SimilarityBand {
    /// Band for a similarity score.
    #[must_use]
    pub const fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    /// Feedback sentence for the band.
    #[must_use]
    pub const fn feedback(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! Your execution closely matches the trainer's.",
            Self::Good => "Good execution! Small adjustments could improve your form.",
            Self::Fair => "Fair execution, but there are some aspects to improve.",
            Self::NeedsImprovement => {
                "Your execution needs significant improvement. Focus on the highlighted points."
            }
        }
    }

    /// Short label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::NeedsImprovement => "needs significant improvement",
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Positional divergence of one body part from the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartDifference {
    /// Landmark name, or `point_<i>` past the landmark layout.
    pub body_part: String,
    /// Euclidean distance in normalized coordinates.
    pub difference: f64,
    /// Low, medium or high.
    pub severity: Severity,
    /// Corrective suggestion.
    pub suggestion: String,
}

impl BodyPartDifference {
    fn new(slot: usize, difference: f64) -> Self {
        let severity = if difference > HIGH_DEVIATION {
            Severity::High
        } else if difference > MEDIUM_DEVIATION {
            Severity::Medium
        } else {
            Severity::Low
        };
        let body_part = Landmark::slot_name(slot);
        let suggestion = suggestion_for(&body_part, severity);
        Self {
            body_part,
            difference,
            severity,
            suggestion,
        }
    }
}

/// Outcome of comparing a user sequence with a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Mean similarity over the sampled frames, rounded, in `[0, 100]`.
    pub similarity_score: u32,
    /// Largest deviations, one per body part, sorted descending.
    pub differences: Vec<BodyPartDifference>,
    /// Qualitative bracket of the unrounded similarity.
    pub band: SimilarityBand,
    /// Feedback sentence for the bracket.
    pub overall_feedback: String,
}

/// Compares user sequences with the references of a [`ReferenceLibrary`].
#[derive(Debug, Default)]
pub struct ReferenceComparator {
    library: ReferenceLibrary,
    config: ComparisonConfig,
}

impl ReferenceComparator {
    /// Create a comparator over a library.
    #[must_use]
    pub const fn new(library: ReferenceLibrary, config: ComparisonConfig) -> Self {
        Self { library, config }
    }

    /// The reference library.
    #[must_use]
    pub const fn library(&self) -> &ReferenceLibrary {
        &self.library
    }

    /// The comparison configuration.
    #[must_use]
    pub const fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compare a user sequence with the stored reference for an exercise.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ReferenceNotFound`] if the library has no reference for
    /// the exercise.
    pub fn compare_with_reference(
        &self,
        exercise: &str,
        user: &KeypointSequence,
    ) -> Result<ComparisonResult> {
        let reference = self
            .library
            .get(exercise)
            .ok_or_else(|| AnalysisError::ReferenceNotFound(exercise.to_string()))?;
        Ok(compare_sequences(user, &reference.keypoints, &self.config))
    }
}

/// Compare two sequences frame by frame at sampled indices.
///
/// Frames with no landmark present in both sequences are not counted. When no frame is
/// comparable the similarity is 0 with no differences.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn compare_sequences(
    user: &KeypointSequence,
    reference: &KeypointSequence,
    config: &ComparisonConfig,
) -> ComparisonResult {
    let min_len = user.len().min(reference.len());
    let step = (min_len / config.sample_count.max(1)).max(1);

    let mut total_similarity = 0.0;
    let mut compared = 0usize;
    let mut differences = Vec::new();

    for index in (0..min_len).step_by(step) {
        let (Some(user_frame), Some(ref_frame)) = (user.get(index), reference.get(index)) else {
            continue;
        };
        if let Some((similarity, frame_differences)) =
            compare_frames(user_frame, ref_frame, config)
        {
            total_similarity += similarity;
            compared += 1;
            differences.extend(frame_differences);
        }
    }

    let average = if compared > 0 {
        total_similarity / compared as f64
    } else {
        0.0
    };
    let band = SimilarityBand::from_score(average);

    ComparisonResult {
        similarity_score: average.round().clamp(0.0, 100.0) as u32,
        differences: aggregate_differences(differences, config.max_differences),
        band,
        overall_feedback: band.feedback().to_string(),
    }
}

/// Compare two frames at matching ordinal slots.
///
/// Returns the frame similarity and the recorded differences, or `None` when no slot
/// holds a finite keypoint in both frames.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_frames(
    user: &Frame,
    reference: &Frame,
    config: &ComparisonConfig,
) -> Option<(f64, Vec<BodyPartDifference>)> {
    let distances: Vec<(usize, f64)> = (0..user.len().min(reference.len()))
        .filter_map(|slot| {
            let distance = user.get(slot)?.distance_to(reference.get(slot)?);
            distance.is_finite().then_some((slot, distance))
        })
        .collect();

    if distances.is_empty() {
        return None;
    }

    let mean = distances.iter().map(|(_, d)| d).sum::<f64>() / distances.len() as f64;
    let similarity = config.distance_scale.mul_add(-mean, 100.0).max(0.0);
    let differences = distances
        .into_iter()
        .filter(|&(_, d)| d > config.difference_threshold)
        .map(|(slot, d)| BodyPartDifference::new(slot, d))
        .collect();

    Some((similarity, differences))
}

/// Keep the largest difference per body part, sorted descending, truncated to `max`.
fn aggregate_differences(
    differences: Vec<BodyPartDifference>,
    max: usize,
) -> Vec<BodyPartDifference> {
    let mut largest: HashMap<String, BodyPartDifference> = HashMap::new();
    for diff in differences {
        match largest.get(&diff.body_part) {
            Some(existing) if existing.difference >= diff.difference => {}
            _ => {
                largest.insert(diff.body_part.clone(), diff);
            }
        }
    }

    let mut unique: Vec<BodyPartDifference> = largest.into_values().collect();
    unique.sort_by(|a, b| {
        b.difference
            .total_cmp(&a.difference)
            .then_with(|| a.body_part.cmp(&b.body_part))
    });
    unique.truncate(max);
    unique
}

fn suggestion_for(body_part: &str, severity: Severity) -> String {
    let text = match (body_part, severity) {
        ("head", Severity::Low) => "Keep your gaze straight ahead",
        ("head", Severity::Medium) => "Avoid looking down or up",
        ("head", _) => "Head position differs significantly from the reference",
        ("left_shoulder", Severity::Low) => "Slightly adjust your left shoulder",
        ("right_shoulder", Severity::Low) => "Slightly adjust your right shoulder",
        ("left_shoulder" | "right_shoulder", Severity::Medium) => "Keep your shoulders level",
        ("left_shoulder", _) => "Left shoulder position differs greatly from the reference",
        ("right_shoulder", _) => "Right shoulder position differs greatly from the reference",
        ("left_hip", Severity::Low) => "Make a small adjustment to your left hip",
        ("right_hip", Severity::Low) => "Make a small adjustment to your right hip",
        ("left_hip" | "right_hip", Severity::Medium) => "Keep your hips level",
        ("left_hip", _) => "Left hip position differs greatly from the reference",
        ("right_hip", _) => "Right hip position differs greatly from the reference",
        _ => return format!("Adjust the position of your {}", body_part.replace('_', " ")),
    };
    text.to_string()
}
