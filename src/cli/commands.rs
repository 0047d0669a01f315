// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Subcommand implementations.

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::cli::args::{AnalyzeArgs, CaptureArgs, ReferencesArgs, RulesArgs, SourceArgs};
use crate::error::Result;
use crate::utils::pluralize;
use crate::{
    AnalysisConfig, FormAnalyzer, FormReport, KeypointSequence, ReferenceLibrary,
    ReferenceSequence, RuleEngine, Severity, VERSION, info, section, success, verbose, warn,
};

/// Read a JSON array of keypoint frames.
///
/// Frames without a `frameNumber` are numbered by their position in the array.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid frame JSON, or its frame
/// numbers do not strictly increase.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<KeypointSequence> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn config_from(sources: &SourceArgs) -> AnalysisConfig {
    let mut config = AnalysisConfig::new().with_demo_references(!sources.no_demo);
    if let Some(rules) = &sources.rules {
        config = config.with_rules_path(rules);
    }
    if let Some(dir) = &sources.references {
        config = config.with_references_dir(dir);
    }
    config
}

/// Run the `analyze` command.
///
/// # Errors
///
/// Returns an error if the input sequence cannot be read.
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let sequence = read_sequence(&args.input)?;
    verbose!(
        "formcheck {VERSION} 🚀 {} {} from {}",
        sequence.len(),
        pluralize("frame", sequence.len()),
        args.input.display()
    );

    let analyzer = FormAnalyzer::from_config(&config_from(&args.sources));
    let report = analyzer.analyze(&args.exercise, &sequence);

    if args.json {
        info!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Low => severity.as_str().normal(),
        Severity::Medium => severity.as_str().yellow(),
        Severity::High | Severity::Critical => severity.as_str().red().bold(),
    }
}

fn print_report(report: &FormReport) {
    section!("Metrics");
    if report.metrics.is_empty() {
        info!("  (no metrics, sequence empty or landmarks missing)");
    }
    for (name, value) in report.metrics.iter() {
        info!("  {name:<18} {value:.1}");
    }

    section!("Movement");
    let movement = &report.movement;
    info!("  {:<18} {}", "range_of_motion", movement.range_of_motion);
    info!("  {:<18} {}", "stability", movement.stability);
    info!("  {:<18} {}", "symmetry", movement.symmetry);
    info!("  {:<18} {}", "tempo", movement.tempo);

    section!("Rules");
    let validation = &report.validation;
    if validation.is_valid {
        success!("No violations");
    }
    for violation in &validation.violations {
        info!(
            "  [{}] {} {} {} (actual {:.1}): {}",
            severity_label(violation.severity),
            violation.rule.metric,
            violation.rule.comparison,
            violation.rule.threshold,
            violation.actual_value,
            violation.feedback
        );
    }
    info!("  Rule score: {}", validation.score.to_string().bold());

    section!("Reference comparison");
    match (&report.comparison, &report.comparison_error) {
        (Some(comparison), _) => {
            info!(
                "  Similarity: {} ({})",
                comparison.similarity_score.to_string().bold(),
                comparison.band
            );
            info!("  {}", comparison.overall_feedback);
            for diff in &comparison.differences {
                info!(
                    "  [{}] {} {:.3}: {}",
                    severity_label(diff.severity),
                    diff.body_part,
                    diff.difference,
                    diff.suggestion
                );
            }
        }
        (None, Some(e)) => warn!("{e}"),
        (None, None) => {}
    }

    section!("Guide");
    for (i, step) in report.guide.instructions.iter().enumerate() {
        info!("  {}. {step}", i + 1);
    }
    for tip in report.guide.tips {
        info!("  - {tip}");
    }

    info!("");
    info!(
        "{} Overall score: {}",
        "📊".cyan(),
        report.overall_score().to_string().bold()
    );
}

/// Run the `rules` command.
pub fn run_rules(args: &RulesArgs) {
    let engine = args
        .rules
        .as_ref()
        .map_or_else(RuleEngine::builtin, RuleEngine::from_csv);

    let exercises: Vec<String> = match &args.exercise {
        Some(exercise) => vec![exercise.clone()],
        None => engine.exercises().into_iter().map(str::to_string).collect(),
    };

    for exercise in &exercises {
        let rules = engine.rules_for_exercise(exercise);
        section!("{exercise} ({} {})", rules.len(), pluralize("rule", rules.len()));
        if rules.is_empty() {
            warn!("No rules for exercise: {exercise}");
        }
        for rule in rules {
            info!(
                "  [{}] {} {} {}: {}",
                severity_label(rule.severity),
                rule.metric,
                rule.comparison,
                rule.threshold,
                rule.description
            );
        }
    }
}

/// Run the `references` command.
pub fn run_references(args: &ReferencesArgs) {
    let mut config = AnalysisConfig::new().with_demo_references(!args.no_demo);
    if let Some(dir) = &args.references {
        config = config.with_references_dir(dir);
    }
    let library = ReferenceLibrary::new(config.reference_source());

    section!("{} {}", library.len(), pluralize("reference", library.len()));
    for exercise in library.exercises() {
        if let Some(reference) = library.get(exercise) {
            let meta = &reference.metadata;
            info!(
                "  {exercise:<12} {} {} @ {:.0} fps ({:.1}s)",
                meta.total_frames,
                pluralize("frame", meta.total_frames),
                meta.frame_rate,
                meta.duration
            );
        }
    }
}

/// Run the `capture` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the reference cannot be written.
pub fn run_capture(args: &CaptureArgs) -> Result<()> {
    let sequence = read_sequence(&args.input)?;
    let reference = ReferenceSequence::from_capture(&args.exercise, sequence, args.fps);
    let path = reference.save(&args.output)?;
    success!(
        "Saved {} reference ({} {}) to {}",
        reference.exercise_name,
        reference.metadata.total_frames,
        pluralize("frame", reference.metadata.total_frames),
        path.display()
    );
    Ok(())
}
