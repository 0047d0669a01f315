// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Biomechanical rule engine.
//!
//! A [`RuleEngine`] holds per-exercise [`BiomechanicalRule`]s and validates a
//! [`MetricSet`] against them, producing the triggered [`Violation`]s and a
//! severity-weighted 0-100 score.
//!
//! The rule table is loaded once from its [`RuleSource`] on first use (or an explicit
//! [`RuleEngine::initialize`] call) and is read-only afterwards. A missing or malformed
//! rule file degrades to the built-in rule set instead of failing the caller.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::extract::MetricSet;
use crate::utils::normalize_exercise;
use crate::{verbose, warn};

/// Ordinal importance of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor deviation.
    Low,
    /// Noticeable deviation.
    Medium,
    /// Deviation likely to hurt performance or joints.
    High,
    /// Deviation that should stop the exercise.
    Critical,
}

impl Severity {
    /// Score points deducted for one violation of this severity.
    #[must_use]
    pub const fn penalty(self) -> u32 {
        match self {
            Self::Low => 5,
            Self::Medium => 10,
            Self::High => 20,
            Self::Critical => 30,
        }
    }

    /// Lower-case name used in rule tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(AnalysisError::ParseError(format!(
                "invalid severity '{s}', expected one of: low, medium, high, critical"
            ))),
        }
    }
}

/// Comparison applied between a metric and a rule threshold.
///
/// A rule is violated when its comparison holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// `actual > threshold`
    #[serde(rename = ">")]
    GreaterThan,
    /// `actual < threshold`
    #[serde(rename = "<")]
    LessThan,
    /// `actual >= threshold`
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// `actual` outside `threshold ± EQUAL_TOLERANCE`
    #[serde(rename = "=")]
    Equal,
}

impl Comparison {
    /// Half-width of the accepted band for [`Comparison::Equal`].
    pub const EQUAL_TOLERANCE: f64 = 5.0;

    /// Check whether `actual` violates `threshold` under this comparison.
    #[must_use]
    pub const fn is_violated(self, actual: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => actual > threshold,
            Self::LessThan => actual < threshold,
            Self::GreaterOrEqual => actual >= threshold,
            Self::Equal => (actual - threshold).abs() > Self::EQUAL_TOLERANCE,
        }
    }

    /// Operator symbol used in rule tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Comparison {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            ">=" => Ok(Self::GreaterOrEqual),
            "=" | "==" => Ok(Self::Equal),
            _ => Err(AnalysisError::ParseError(format!(
                "invalid operator '{s}', expected one of: >, <, >=, ="
            ))),
        }
    }
}

/// A threshold check on one metric for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomechanicalRule {
    /// Normalized exercise key (see [`normalize_exercise`]).
    pub exercise: String,
    /// Metric name the rule reads from a [`MetricSet`].
    pub metric: String,
    /// Comparison that signals a violation.
    pub comparison: Comparison,
    /// Threshold value, in the metric's unit.
    pub threshold: f64,
    /// Short violation identifier, e.g. `knee_valgus`.
    pub violation: String,
    /// Human description of the fault.
    pub description: String,
    /// Remediation text shown to the user.
    pub remediation: String,
    /// Severity driving the score penalty.
    pub severity: Severity,
}

impl BiomechanicalRule {
    /// Create a rule with empty texts.
    #[must_use]
    pub fn new(
        exercise: &str,
        metric: impl Into<String>,
        comparison: Comparison,
        threshold: f64,
        severity: Severity,
    ) -> Self {
        Self {
            exercise: normalize_exercise(exercise),
            metric: metric.into(),
            comparison,
            threshold,
            violation: String::new(),
            description: String::new(),
            remediation: String::new(),
            severity,
        }
    }

    /// Set the violation identifier and the texts.
    #[must_use]
    pub fn with_texts(
        mut self,
        violation: impl Into<String>,
        description: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        self.violation = violation.into();
        self.description = description.into();
        self.remediation = remediation.into();
        self
    }

    /// Evaluate the rule against a metric set.
    ///
    /// Returns `None` when the metric is absent or non-finite, or when the
    /// comparison does not hold.
    #[must_use]
    pub fn evaluate(&self, metrics: &MetricSet) -> Option<Violation> {
        let actual = metrics.get(&self.metric).filter(|v| v.is_finite())?;
        self.comparison
            .is_violated(actual, self.threshold)
            .then(|| Violation {
                rule: self.clone(),
                actual_value: actual,
                severity: self.severity,
                feedback: self.remediation.clone(),
            })
    }
}

/// A triggered rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The rule that triggered.
    pub rule: BiomechanicalRule,
    /// Metric value that triggered it.
    pub actual_value: f64,
    /// Severity of the rule.
    pub severity: Severity,
    /// Remediation text.
    pub feedback: String,
}

/// Outcome of validating one metric set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when no rule triggered.
    pub is_valid: bool,
    /// Triggered rules, in rule-table order.
    pub violations: Vec<Violation>,
    /// Severity-weighted score in `[0, 100]`.
    pub score: u32,
}

impl ValidationResult {
    /// Build a result from the triggered violations.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            score: score_violations(&violations),
            violations,
        }
    }

    /// Highest severity among the violations.
    #[must_use]
    pub fn worst_severity(&self) -> Option<Severity> {
        self.violations.iter().map(|v| v.severity).max()
    }
}

/// Score a list of violations: 100 minus the severity penalties, floored at 0.
#[must_use]
pub fn score_violations(violations: &[Violation]) -> u32 {
    let penalty: u32 = violations.iter().map(|v| v.severity.penalty()).sum();
    100u32.saturating_sub(penalty)
}

/// Where a [`RuleEngine`] loads its rules from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuleSource {
    /// A CSV file with one rule per row. Falls back to the built-in set when the file is
    /// missing or malformed.
    Csv(PathBuf),
    /// The built-in rule set covering squat, push-up and lunge.
    #[default]
    Builtin,
    /// An explicit in-memory rule list.
    Rules(Vec<BiomechanicalRule>),
}

/// Lifecycle state of a [`RuleEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Rules have not been loaded yet.
    Uninitialized,
    /// Rules are loaded and read-only.
    Initialized,
}

/// Rules grouped by normalized exercise key.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Vec<BiomechanicalRule>>,
}

impl RuleTable {
    /// Group rules by exercise, preserving their order within each exercise.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = BiomechanicalRule>) -> Self {
        let mut table: HashMap<String, Vec<BiomechanicalRule>> = HashMap::new();
        for mut rule in rules {
            rule.exercise = normalize_exercise(&rule.exercise);
            table.entry(rule.exercise.clone()).or_default().push(rule);
        }
        Self { rules: table }
    }

    /// Rules for an exercise; empty for unknown exercises.
    #[must_use]
    pub fn get(&self, exercise: &str) -> &[BiomechanicalRule] {
        self.rules
            .get(&normalize_exercise(exercise))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Exercise keys, sorted.
    #[must_use]
    pub fn exercises(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Check if the table holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluates metric sets against per-exercise rules.
///
/// # Example
///
/// ```
/// use formcheck::{MetricSet, RuleEngine};
///
/// let engine = RuleEngine::builtin();
/// let metrics = MetricSet::new().with("knee_angle", 135.0);
/// let result = engine.validate("Squat", &metrics);
/// assert_eq!(result.score, 80);
/// ```
#[derive(Debug)]
pub struct RuleEngine {
    source: RuleSource,
    table: OnceLock<RuleTable>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleSource::default())
    }
}

impl RuleEngine {
    /// Create an uninitialized engine for a rule source.
    #[must_use]
    pub const fn new(source: RuleSource) -> Self {
        Self {
            source,
            table: OnceLock::new(),
        }
    }

    /// Engine over the built-in rule set.
    #[must_use]
    pub const fn builtin() -> Self {
        Self::new(RuleSource::Builtin)
    }

    /// Engine over a CSV rule file.
    #[must_use]
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Self {
        Self::new(RuleSource::Csv(path.as_ref().to_path_buf()))
    }

    /// The configured rule source.
    #[must_use]
    pub const fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.table.get().is_some() {
            EngineState::Initialized
        } else {
            EngineState::Uninitialized
        }
    }

    /// Load the rule table if it has not been loaded yet.
    ///
    /// Idempotent and safe to call from several threads: exactly one load runs and
    /// every caller observes the same table.
    pub fn initialize(&self) -> &RuleTable {
        self.table.get_or_init(|| load_table(&self.source))
    }

    /// Validate metrics against the rules for an exercise.
    ///
    /// Exercise lookup is case-insensitive. An unknown exercise has no rules and
    /// therefore validates with a score of 100.
    #[must_use]
    pub fn validate(&self, exercise: &str, metrics: &MetricSet) -> ValidationResult {
        let violations = self
            .initialize()
            .get(exercise)
            .iter()
            .filter_map(|rule| rule.evaluate(metrics))
            .collect();
        ValidationResult::from_violations(violations)
    }

    /// Rules for an exercise.
    #[must_use]
    pub fn rules_for_exercise(&self, exercise: &str) -> &[BiomechanicalRule] {
        self.initialize().get(exercise)
    }

    /// All exercises that have rules, sorted.
    #[must_use]
    pub fn exercises(&self) -> Vec<&str> {
        self.initialize().exercises()
    }
}

fn load_table(source: &RuleSource) -> RuleTable {
    let table = match source {
        RuleSource::Builtin => RuleTable::from_rules(builtin_rules()),
        RuleSource::Rules(rules) => RuleTable::from_rules(rules.iter().cloned()),
        RuleSource::Csv(path) if !path.exists() => {
            warn!("Rule file {} not found, using built-in rules", path.display());
            RuleTable::from_rules(builtin_rules())
        }
        RuleSource::Csv(path) => match load_rules_csv(path) {
            Ok(rules) => RuleTable::from_rules(rules),
            Err(e) => {
                warn!("Failed to load rules from {}: {e}. Using built-in rules", path.display());
                RuleTable::from_rules(builtin_rules())
            }
        },
    };
    verbose!(
        "Rule engine initialized with {} rules for {} exercises",
        table.len(),
        table.exercises().len()
    );
    table
}

/// One CSV row. Column names follow the rule table layout; the Italian
/// spreadsheet headers are accepted as aliases.
#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(alias = "esercizio")]
    exercise: String,
    #[serde(alias = "articolazione", alias = "joint")]
    metric: String,
    #[serde(default, alias = "condizione", alias = "condition")]
    operator: String,
    #[serde(default, alias = "limite")]
    threshold: String,
    #[serde(default, alias = "errore")]
    violation: String,
    #[serde(default, alias = "descrizione_errore")]
    description: String,
    #[serde(default, alias = "suggerimento")]
    remediation: String,
    #[serde(default, alias = "severita")]
    severity: String,
}

impl TryFrom<RuleRow> for BiomechanicalRule {
    type Error = AnalysisError;

    fn try_from(row: RuleRow) -> Result<Self> {
        if row.exercise.is_empty() || row.metric.is_empty() {
            return Err(AnalysisError::RuleSourceError(
                "row is missing exercise or metric".to_string(),
            ));
        }
        let comparison = if row.operator.is_empty() {
            Comparison::GreaterThan
        } else {
            row.operator.parse()?
        };
        let threshold = if row.threshold.is_empty() {
            0.0
        } else {
            row.threshold.parse::<f64>().map_err(|e| {
                AnalysisError::ParseError(format!("invalid threshold '{}': {e}", row.threshold))
            })?
        };
        let severity = if row.severity.is_empty() {
            Severity::Medium
        } else {
            row.severity.parse()?
        };
        Ok(Self::new(&row.exercise, row.metric, comparison, threshold, severity).with_texts(
            row.violation,
            row.description,
            row.remediation,
        ))
    }
}

/// Parse rules from CSV data with a header row.
///
/// Empty operator, threshold and severity cells default to `>`, `0` and `medium`.
///
/// # Errors
///
/// Returns an error if a row cannot be read or holds an invalid operator, threshold or
/// severity.
pub fn parse_rules_csv<R: Read>(reader: R) -> Result<Vec<BiomechanicalRule>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader
        .deserialize::<RuleRow>()
        .enumerate()
        .map(|(i, row)| {
            BiomechanicalRule::try_from(row?).map_err(|e| {
                // data rows start on line 2
                AnalysisError::RuleSourceError(format!("row {}: {e}", i + 2))
            })
        })
        .collect()
}

/// Read rules from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn load_rules_csv<P: AsRef<Path>>(path: P) -> Result<Vec<BiomechanicalRule>> {
    let file = std::fs::File::open(path)?;
    parse_rules_csv(file)
}

/// Built-in rules for squat, push-up and lunge.
#[must_use]
pub fn builtin_rules() -> Vec<BiomechanicalRule> {
    use Comparison::{GreaterThan, LessThan};
    use Severity::{High, Medium};

    vec![
        BiomechanicalRule::new("squat", "knee_angle", GreaterThan, 120.0, High).with_texts(
            "knee_valgus",
            "Knees collapsing inwards",
            "Keep your knees in line with your toes",
        ),
        BiomechanicalRule::new("squat", "hip_angle", LessThan, 90.0, Medium).with_texts(
            "insufficient_depth",
            "Squat depth is insufficient",
            "Lower your hips until they are below knee level",
        ),
        BiomechanicalRule::new("squat", "back_angle", GreaterThan, 45.0, High).with_texts(
            "forward_lean",
            "Leaning too far forward",
            "Keep your chest up and your back straight",
        ),
        BiomechanicalRule::new("pushup", "elbow_angle", GreaterThan, 45.0, Medium).with_texts(
            "wide_elbows",
            "Elbows flared too wide",
            "Keep your elbows close to your body, at about 45 degrees",
        ),
        BiomechanicalRule::new("pushup", "body_line", GreaterThan, 10.0, High).with_texts(
            "sagging_hips",
            "Hips dropping towards the floor",
            "Hold a straight line from head to heels",
        ),
        BiomechanicalRule::new("lunge", "front_knee_angle", LessThan, 90.0, Medium).with_texts(
            "shallow_lunge",
            "Lunge is too shallow",
            "Lower until your front knee forms a 90 degree angle",
        ),
        BiomechanicalRule::new("lunge", "knee_forward", GreaterThan, 5.0, High).with_texts(
            "knee_over_toe",
            "Knee travels past the toes",
            "Keep your knee stacked over your ankle",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn engine_with(rules: Vec<BiomechanicalRule>) -> RuleEngine {
        RuleEngine::new(RuleSource::Rules(rules))
    }

    #[test]
    fn test_severity_and_comparison_parse() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("severe".parse::<Severity>().is_err());
        assert_eq!(">=".parse::<Comparison>().unwrap(), Comparison::GreaterOrEqual);
        assert_eq!("==".parse::<Comparison>().unwrap(), Comparison::Equal);
        assert!("!=".parse::<Comparison>().is_err());
        assert!(Severity::Low < Severity::Critical);
    }

    #[test]
    fn test_greater_than_violation() {
        let engine = engine_with(vec![BiomechanicalRule::new(
            "squat",
            "knee_angle",
            Comparison::GreaterThan,
            120.0,
            Severity::High,
        )]);
        let result = engine.validate("squat", &MetricSet::new().with("knee_angle", 135.0));
        assert!(!result.is_valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::High);
        assert!((result.violations[0].actual_value - 135.0).abs() < f64::EPSILON);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_equal_tolerance_band() {
        let engine = engine_with(vec![BiomechanicalRule::new(
            "plank",
            "hip_angle",
            Comparison::Equal,
            90.0,
            Severity::Medium,
        )]);

        let inside = engine.validate("plank", &MetricSet::new().with("hip_angle", 94.0));
        assert!(inside.is_valid);
        assert_eq!(inside.score, 100);

        let outside = engine.validate("plank", &MetricSet::new().with("hip_angle", 96.0));
        assert_eq!(outside.violations.len(), 1);
        assert_eq!(outside.score, 90);
    }

    #[test]
    fn test_score_floor() {
        let rules = (0..5)
            .map(|i| {
                BiomechanicalRule::new(
                    "burpee",
                    format!("m{i}"),
                    Comparison::GreaterOrEqual,
                    0.0,
                    Severity::Critical,
                )
            })
            .collect();
        let engine = engine_with(rules);
        let metrics: MetricSet = (0..5).map(|i| (format!("m{i}"), 1.0)).collect();
        let result = engine.validate("burpee", &metrics);
        assert_eq!(result.violations.len(), 5);
        assert_eq!(result.score, 0);
        assert_eq!(result.worst_severity(), Some(Severity::Critical));
    }

    #[test]
    fn test_unknown_exercise_is_valid() {
        let engine = RuleEngine::builtin();
        let result = engine.validate("deadlift", &MetricSet::new().with("knee_angle", 170.0));
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_absent_and_non_finite_metrics_skipped() {
        let engine = RuleEngine::builtin();
        let result = engine.validate("squat", &MetricSet::new().with("knee_angle", f64::NAN));
        assert!(result.is_valid);
        assert_eq!(result.score, 100);

        // infinity would trip `knee_angle > 120` if it reached the comparison
        let result = engine.validate("squat", &MetricSet::new().with("knee_angle", f64::INFINITY));
        assert!(result.is_valid);
        assert_eq!(result.score, 100);

        assert!(engine.validate("squat", &MetricSet::new()).is_valid);
    }

    #[test]
    fn test_equal_tolerance_boundary() {
        let engine = engine_with(vec![BiomechanicalRule::new(
            "plank",
            "hip_angle",
            Comparison::Equal,
            90.0,
            Severity::Medium,
        )]);
        for edge in [85.0, 95.0] {
            let result = engine.validate("plank", &MetricSet::new().with("hip_angle", edge));
            assert!(result.is_valid, "{edge}");
        }
        assert!(Comparison::GreaterThan.is_violated(f64::INFINITY, 120.0));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let engine = RuleEngine::builtin();
        assert_eq!(engine.rules_for_exercise("SQUAT").len(), 3);
        assert_eq!(engine.rules_for_exercise("Push-Up").len(), 2);
        assert_eq!(engine.exercises(), vec!["lunge", "pushup", "squat"]);
    }

    #[test]
    fn test_lifecycle_and_idempotent_initialize() {
        let engine = RuleEngine::builtin();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        let first = engine.initialize().len();
        assert_eq!(engine.state(), EngineState::Initialized);
        let second = engine.initialize().len();
        assert_eq!(first, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_initialize() {
        let engine = Arc::new(RuleEngine::builtin());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || std::ptr::from_ref(engine.initialize()) as usize)
            })
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(engine.initialize().len(), 7);
    }

    #[test]
    fn test_parse_csv_defaults() {
        let data = "exercise,metric,operator,threshold,violation,description,remediation,severity\n\
                    Squat,knee_angle,,,knee_valgus,Knees in,Push knees out,\n\
                    plank,body_line,=,0,hip_sag,Hips low,Brace,low\n";
        let rules = parse_rules_csv(data.as_bytes()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].exercise, "squat");
        assert_eq!(rules[0].comparison, Comparison::GreaterThan);
        assert!(rules[0].threshold.abs() < f64::EPSILON);
        assert_eq!(rules[0].severity, Severity::Medium);
        assert_eq!(rules[1].comparison, Comparison::Equal);
        assert_eq!(rules[1].remediation, "Brace");
    }

    #[test]
    fn test_parse_csv_italian_headers() {
        let data = "esercizio,articolazione,condizione,limite,errore,\
                    descrizione_errore,suggerimento,severita\n\
                    squat,knee_angle,>,120,knee_valgus,desc,tip,high\n";
        let rules = parse_rules_csv(data.as_bytes()).unwrap();
        assert_eq!(rules[0].severity, Severity::High);
        assert!((rules[0].threshold - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_csv_rejects_bad_operator() {
        let data = "exercise,metric,operator,threshold,severity\nsquat,knee_angle,!=,120,high\n";
        let err = parse_rules_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_missing_csv_falls_back_to_builtin() {
        let engine = RuleEngine::from_csv("/nonexistent/rules.csv");
        assert_eq!(engine.initialize().len(), builtin_rules().len());
    }
}
