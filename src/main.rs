// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use formcheck::cli::args::{Cli, Commands};
use formcheck::cli::commands::{run_analyze, run_capture, run_references, run_rules};
use formcheck::cli::logging::set_verbose;
use formcheck::error;

fn main() {
    let cli = Cli::parse();

    // JSON output must stay machine-readable
    let json = matches!(&cli.command, Commands::Analyze(args) if args.json);
    set_verbose(cli.verbose && !json);

    let result = match &cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Rules(args) => {
            run_rules(args);
            Ok(())
        }
        Commands::References(args) => {
            run_references(args);
            Ok(())
        }
        Commands::Capture(args) => run_capture(args),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}
