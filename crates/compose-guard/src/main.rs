//! compose-guard: static anti-pattern checker for Jetpack Compose.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_rules {
        for rule in compose_diagnostics::all_rules() {
            let state = if rule.enabled { "on" } else { "off" };
            println!(
                "{:<24} {:<8} {:<4} {}",
                rule.code.as_str(),
                format!("{:?}", rule.severity).to_lowercase(),
                state,
                rule.description
            );
        }
        return Ok(());
    }

    match orchestrator::run(args) {
        Ok(summary) => {
            if summary.error_count > 0 || (summary.warning_count > 0 && summary.fail_on_warnings) {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
