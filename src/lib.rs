// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Formcheck Biomechanical Form Analysis Library
//!
//! Exercise form analysis over 2-D body keypoints, written in Rust. Given a time
//! series of pose keypoints recorded while a user performs an exercise, the library
//! derives joint angles and postural metrics, checks them against a per-exercise
//! rule set with severity-weighted scoring, and compares the recording with a
//! professional reference sequence.
//!
//! ## Features
//!
//! - **Metric Extraction** - Joint angles, body-line deviation, knee travel and trunk lean
//! - **Movement Scores** - Range of motion, hip stability, symmetry and tempo
//! - **Rule Engine** - Threshold rules per exercise with severity-weighted penalties
//! - **CSV Rule Tables** - Load rules from a CSV file, falling back to the built-in set
//! - **Reference Comparison** - Frame-sampled similarity scoring with per-body-part deviations
//! - **Reference Capture** - Store trainer recordings as `<exercise>_keypoints.json` references
//! - **Thread Safe** - Rule tables and reference caches load once and are read-only after
//!
//! ## Quick Start (Library)
//!
//! ```rust
//! use formcheck::{MetricSet, RuleEngine};
//!
//! let engine = RuleEngine::builtin();
//!
//! // A squat with a knee angle of 135 degrees is too shallow
//! let metrics = MetricSet::new().with("knee_angle", 135.0);
//! let result = engine.validate("squat", &metrics);
//!
//! assert!(!result.is_valid);
//! assert_eq!(result.score, 80);
//! for violation in &result.violations {
//!     println!("{}: {}", violation.rule.violation, violation.feedback);
//! }
//! ```
//!
//! Full analysis of a recording, including the reference comparison:
//!
//! ```rust
//! use formcheck::{AnalysisConfig, FormAnalyzer, KeypointSequence};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = r#"[
//!     {"keypoints": [{"x": 0.5, "y": 0.2, "visibility": 0.9}], "timestamp": 0, "frameNumber": 0}
//! ]"#;
//! let sequence: KeypointSequence = serde_json::from_str(json)?;
//!
//! let analyzer = FormAnalyzer::from_config(&AnalysisConfig::default());
//! let report = analyzer.analyze("squat", &sequence);
//! println!("{}", report.verbose());
//! # Ok(())
//! # }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Analyze a recording against built-in rules and demo references
//! formcheck analyze --exercise squat --input squat.json
//!
//! # Custom rule table and reference directory, JSON output
//! formcheck analyze -e pushup -i pushup.json --rules rules.csv --references refs/ --json
//!
//! # List rules and references
//! formcheck rules --exercise squat
//! formcheck references --references refs/
//!
//! # Store a trainer recording as the squat reference
//! formcheck capture --exercise squat --input trainer.json --output refs/ --fps 30
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use formcheck::{AnalysisConfig, ComparisonConfig};
//!
//! let config = AnalysisConfig::new()
//!     .with_rules_path("rules.csv")       // CSV rule table
//!     .with_references_dir("references")  // <exercise>_keypoints.json files
//!     .with_demo_references(false)        // no synthetic references
//!     .with_comparison(ComparisonConfig::new().with_sample_count(20));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoint`] | Keypoint data ([`Keypoint`], [`Frame`], [`KeypointSequence`], [`Landmark`]) |
//! | [`geometry`] | Joint angles and postural measurements |
//! | [`extract`] | Metrics ([`MetricSet`], [`extract_angles`], [`movement_metrics`]) |
//! | [`rules`] | [`RuleEngine`] and rule sources |
//! | [`reference`] | [`ReferenceLibrary`] and reference capture |
//! | [`compare`] | [`ReferenceComparator`] similarity scoring |
//! | [`guide`] | Coaching instructions per exercise |
//! | [`analysis`] | [`FormAnalyzer`] combined reports |
//! | [`config`] | [`AnalysisConfig`] for selecting rule and reference sources |
//! | [`error`] | Error types ([`AnalysisError`], [`Result`]) |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
pub mod analysis;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod guide;
pub mod keypoint;
pub mod reference;
pub mod rules;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{FormAnalyzer, FormReport};
pub use compare::{
    BodyPartDifference, ComparisonConfig, ComparisonResult, ReferenceComparator, SimilarityBand,
};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use extract::{MetricSet, MovementMetrics, extract_angles, movement_metrics};
pub use guide::{ExerciseGuide, exercise_guide};
pub use keypoint::{Frame, Keypoint, KeypointSequence, Landmark};
pub use reference::{ReferenceLibrary, ReferenceMetadata, ReferenceSequence, ReferenceSource};
pub use rules::{
    BiomechanicalRule, Comparison, EngineState, RuleEngine, RuleSource, Severity,
    ValidationResult, Violation,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
