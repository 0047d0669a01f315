// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Combined form analysis.
//!
//! A [`FormAnalyzer`] owns a [`RuleEngine`] and a [`ReferenceComparator`] and turns one
//! keypoint sequence into a [`FormReport`]: extracted metrics, rule validation, reference
//! similarity and the coaching guide for the exercise.

use std::fmt::Write;

use serde::Serialize;

use crate::compare::{ComparisonResult, ReferenceComparator};
use crate::config::AnalysisConfig;
use crate::extract::{MetricSet, MovementMetrics, extract_angles, movement_metrics};
use crate::guide::{ExerciseGuide, exercise_guide};
use crate::keypoint::KeypointSequence;
use crate::reference::ReferenceLibrary;
use crate::rules::{RuleEngine, ValidationResult};
use crate::utils::{normalize_exercise, pluralize};

/// Result of analyzing one exercise recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormReport {
    /// Normalized exercise key.
    pub exercise: String,
    /// Metrics extracted from the middle frame.
    pub metrics: MetricSet,
    /// Whole-sequence movement scores.
    pub movement: MovementMetrics,
    /// Rule validation outcome.
    pub validation: ValidationResult,
    /// Reference comparison, when a reference exists.
    pub comparison: Option<ComparisonResult>,
    /// Why the comparison is missing.
    pub comparison_error: Option<String>,
    /// Coaching instructions and tips.
    pub guide: ExerciseGuide,
}

impl FormReport {
    /// Combined score: the mean of the rule score and the similarity score, or the rule
    /// score alone when there is no comparison.
    #[must_use]
    pub fn overall_score(&self) -> u32 {
        self.comparison.as_ref().map_or(self.validation.score, |c| {
            (self.validation.score + c.similarity_score).div_ceil(2)
        })
    }

    /// Return a one-line summary of the report.
    ///
    /// # Returns
    ///
    /// * A string summary (e.g., "squat: score 80, 1 violation, similarity 93 (excellent)").
    #[must_use]
    pub fn verbose(&self) -> String {
        let count = self.validation.violations.len();
        let mut line = format!(
            "{}: score {}, {count} {}",
            self.exercise,
            self.validation.score,
            pluralize("violation", count)
        );
        match (&self.comparison, &self.comparison_error) {
            (Some(c), _) => {
                let _ = write!(line, ", similarity {} ({})", c.similarity_score, c.band);
            }
            (None, Some(e)) => {
                let _ = write!(line, ", {e}");
            }
            (None, None) => {}
        }
        line
    }
}

/// Runs rule validation and reference comparison over keypoint sequences.
///
/// # Example
///
/// ```rust
/// use formcheck::{AnalysisConfig, FormAnalyzer};
/// use formcheck::reference::generate_demo_sequence;
///
/// let analyzer = FormAnalyzer::from_config(&AnalysisConfig::default());
/// let sequence = generate_demo_sequence("squat", 300);
/// let report = analyzer.analyze("Squat", &sequence);
///
/// assert_eq!(report.comparison.unwrap().similarity_score, 100);
/// ```
#[derive(Debug, Default)]
pub struct FormAnalyzer {
    engine: RuleEngine,
    comparator: ReferenceComparator,
}

impl FormAnalyzer {
    /// Create an analyzer from an engine and a comparator.
    #[must_use]
    pub const fn new(engine: RuleEngine, comparator: ReferenceComparator) -> Self {
        Self { engine, comparator }
    }

    /// Create an analyzer from a configuration.
    ///
    /// Nothing is loaded until the first analysis.
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let engine = RuleEngine::new(config.rule_source());
        let library = ReferenceLibrary::new(config.reference_source());
        Self::new(
            engine,
            ReferenceComparator::new(library, config.comparison.clone()),
        )
    }

    /// The rule engine.
    #[must_use]
    pub const fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// The reference comparator.
    #[must_use]
    pub const fn comparator(&self) -> &ReferenceComparator {
        &self.comparator
    }

    /// Analyze a sequence recorded for an exercise.
    ///
    /// # Arguments
    ///
    /// * `exercise` - Exercise name, matched case-insensitively.
    /// * `sequence` - The user's keypoint frames.
    ///
    /// # Returns
    ///
    /// * The combined [`FormReport`]. A missing reference leaves `comparison` empty and
    ///   records the reason in `comparison_error`.
    #[must_use]
    pub fn analyze(&self, exercise: &str, sequence: &KeypointSequence) -> FormReport {
        let metrics = extract_angles(sequence);
        let validation = self.engine.validate(exercise, &metrics);
        let (comparison, comparison_error) = self
            .comparator
            .compare_with_reference(exercise, sequence)
            .map_or_else(|e| (None, Some(e.to_string())), |result| (Some(result), None));

        FormReport {
            exercise: normalize_exercise(exercise),
            metrics,
            movement: movement_metrics(sequence),
            validation,
            comparison,
            comparison_error,
            guide: exercise_guide(exercise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonConfig;
    use crate::keypoint::Frame;
    use crate::reference::generate_demo_sequence;

    #[test]
    fn test_analyze_demo_squat() {
        let analyzer = FormAnalyzer::default();
        let report = analyzer.analyze("Squat", &generate_demo_sequence("squat", 300));

        assert_eq!(report.exercise, "squat");
        assert!(report.metrics.contains("knee_angle"));
        assert!(report.movement.range_of_motion > 0);
        let comparison = report.comparison.as_ref().unwrap();
        assert_eq!(comparison.similarity_score, 100);
        assert!(comparison.differences.is_empty());
        assert!(report.comparison_error.is_none());
        assert_eq!(report.guide.instructions.len(), 5);
    }

    #[test]
    fn test_missing_reference() {
        let config = AnalysisConfig::new().with_demo_references(false);
        let analyzer = FormAnalyzer::from_config(&config);
        let report = analyzer.analyze("squat", &generate_demo_sequence("squat", 30));

        assert!(report.comparison.is_none());
        assert_eq!(
            report.comparison_error.as_deref(),
            Some("No reference found for exercise: squat")
        );
        assert_eq!(report.overall_score(), report.validation.score);
        assert!(report.verbose().ends_with("No reference found for exercise: squat"));
    }

    #[test]
    fn test_empty_sequence() {
        let analyzer = FormAnalyzer::default();
        let report = analyzer.analyze("pushup", &KeypointSequence::default());

        assert!(report.metrics.is_empty());
        assert_eq!(report.movement, MovementMetrics::default());
        assert!(report.validation.is_valid);
        assert_eq!(report.validation.score, 100);
        assert_eq!(report.comparison.as_ref().unwrap().similarity_score, 0);
    }

    #[test]
    fn test_overall_score_and_summary() {
        // left knee pushed down and forward of the standing pose
        let mut points = vec![
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
        ];
        points[9] = (0.6, 0.85);
        let sequence = KeypointSequence::new(vec![Frame::from_points(&points, 0.0, 0)]).unwrap();

        let analyzer = FormAnalyzer::new(
            RuleEngine::builtin(),
            ReferenceComparator::new(ReferenceLibrary::demo(), ComparisonConfig::default()),
        );
        let report = analyzer.analyze("squat", &sequence);

        let comparison = report.comparison.as_ref().unwrap();
        let expected = (report.validation.score + comparison.similarity_score).div_ceil(2);
        assert_eq!(report.overall_score(), expected);
        assert!(report.verbose().starts_with("squat: score "));
        assert!(report.verbose().contains("similarity"));
    }

    #[test]
    fn test_report_serializes() {
        let report =
            FormAnalyzer::default().analyze("plank", &generate_demo_sequence("plank", 5));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["exercise"], "plank");
        assert!(json["guide"]["tips"].is_array());
        assert_eq!(json["movement"]["stability"], 100);
        assert!(json["comparison_error"].is_null());
    }
}
