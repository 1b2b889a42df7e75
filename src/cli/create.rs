//! Handler for the `create` command.

use std::path::Path;

use tracing::debug;

use crate::cli::{output, CreateArgs};
use crate::config::Config;
use crate::deploy::Deployer;
use crate::error::Result;
use crate::runtime::create_backend;
use crate::{templates, validate};

/// Deploy an application from a template bundle.
pub async fn execute(config: &Config, args: CreateArgs) -> Result<()> {
    output::note(&format!(
        "Creating application '{}' using template '{}'",
        args.name, args.template_name
    ));

    let backend = create_backend(config)?;

    // Host/runtime preconditions gate the deployment
    let reports = validate::run(&validate::default_rules(backend.clone())).await;
    print_reports(&reports);
    validate::ensure_passed(&reports)?;

    let (templates, plan) =
        templates::load_bundle(Path::new(&config.template_dir), &args.template_name)?;

    if let Some(level) = plan.smt_level() {
        debug!(smt_level = level, "bundle declares a target SMT level");
    }

    output::note(&format!(
        "Total pod templates to be processed: {}",
        templates.len()
    ));

    Deployer::new(backend).run(&args.name, &plan, &templates).await?;

    output::ok(&format!("application '{}' deployed", args.name));

    Ok(())
}

fn print_reports(reports: &[validate::CheckReport]) {
    for report in reports {
        match &report.failure {
            None => output::ok(report.message),
            Some(reason) => match report.level {
                validate::CheckLevel::Fatal => output::error(&format!(
                    "{}: {reason}\n  hint: {}",
                    report.name, report.hint
                )),
                validate::CheckLevel::Warn => {
                    output::warn(&format!("{}: {reason}", report.name));
                }
            },
        }
    }
}
