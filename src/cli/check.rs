//! Handler for the `check` command.

use crate::cli::output;
use crate::config::Config;
use crate::error::Result;
use crate::runtime::create_backend;
use crate::validate;

/// Run the host precondition checks and report each outcome.
pub async fn execute(config: &Config) -> Result<()> {
    output::section("Precondition checks");

    let backend = create_backend(config)?;
    let reports = validate::run(&validate::default_rules(backend)).await;

    for report in &reports {
        match &report.failure {
            None => output::ok(report.message),
            Some(reason) => {
                let line = format!("{}: {reason}", report.name);
                match report.level {
                    validate::CheckLevel::Fatal => {
                        output::error(&line);
                        output::note(&format!("  hint: {}", report.hint));
                    }
                    validate::CheckLevel::Warn => output::warn(&line),
                }
            }
        }
    }
    println!();

    validate::ensure_passed(&reports)
}
