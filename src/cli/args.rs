// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    formcheck analyze --exercise squat --input squat.json
    formcheck analyze -e pushup -i pushup.json --rules rules.csv --json
    formcheck analyze -e lunge -i lunge.json --references refs/ --no-demo
    formcheck rules --exercise squat
    formcheck references --references refs/
    formcheck capture --exercise squat --input trainer.json --output refs/ --fps 60"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,

    /// Show verbose output
    #[arg(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a recorded keypoint sequence
    Analyze(AnalyzeArgs),
    /// List biomechanical rules
    Rules(RulesArgs),
    /// List available reference sequences
    References(ReferencesArgs),
    /// Store a keypoint sequence as the reference for an exercise
    Capture(CaptureArgs),
}

/// Where rules and references come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// CSV rule file (falls back to built-in rules if unreadable)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Directory of <exercise>_keypoints.json reference files
    #[arg(long)]
    pub references: Option<PathBuf>,

    /// Disable the built-in demo references
    #[arg(long, default_value_t = false)]
    pub no_demo: bool,
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Exercise name (squat, pushup, lunge, ...)
    #[arg(short, long)]
    pub exercise: String,

    /// JSON file holding an array of keypoint frames
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for the rules command.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Only list rules for this exercise
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// CSV rule file (falls back to built-in rules if unreadable)
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

/// Arguments for the references command.
#[derive(Args, Debug)]
pub struct ReferencesArgs {
    /// Directory of <exercise>_keypoints.json reference files
    #[arg(long)]
    pub references: Option<PathBuf>,

    /// Disable the built-in demo references
    #[arg(long, default_value_t = false)]
    pub no_demo: bool,
}

/// Arguments for the capture command.
#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Exercise name the reference is stored under
    #[arg(short, long)]
    pub exercise: String,

    /// JSON file holding an array of keypoint frames
    #[arg(short, long)]
    pub input: PathBuf,

    /// Reference directory to write into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Capture frame rate
    #[arg(long)]
    pub fps: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_args_defaults() {
        let args =
            Cli::parse_from(["app", "analyze", "--exercise", "squat", "--input", "squat.json"]);
        assert!(args.verbose);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert_eq!(analyze_args.exercise, "squat");
                assert_eq!(analyze_args.input, PathBuf::from("squat.json"));
                assert!(analyze_args.sources.rules.is_none());
                assert!(analyze_args.sources.references.is_none());
                assert!(!analyze_args.sources.no_demo);
                assert!(!analyze_args.json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_args_custom() {
        let args = Cli::parse_from([
            "app",
            "analyze",
            "-e",
            "lunge",
            "-i",
            "lunge.json",
            "--rules",
            "rules.csv",
            "--references",
            "refs",
            "--no-demo",
            "--json",
            "--verbose",
            "false",
        ]);
        assert!(!args.verbose);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert_eq!(analyze_args.sources.rules, Some(PathBuf::from("rules.csv")));
                assert_eq!(analyze_args.sources.references, Some(PathBuf::from("refs")));
                assert!(analyze_args.sources.no_demo);
                assert!(analyze_args.json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_capture_args() {
        let args = Cli::parse_from([
            "app", "capture", "-e", "squat", "-i", "in.json", "-o", "refs", "--fps", "60",
        ]);
        match args.command {
            Commands::Capture(capture_args) => {
                assert_eq!(capture_args.output, PathBuf::from("refs"));
                assert!((capture_args.fps.unwrap() - 60.0).abs() < f64::EPSILON);
            }
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn test_rules_args() {
        let args = Cli::parse_from(["app", "rules"]);
        match args.command {
            Commands::Rules(rules_args) => {
                assert!(rules_args.exercise.is_none());
                assert!(rules_args.rules.is_none());
            }
            _ => panic!("expected rules"),
        }
    }
}
