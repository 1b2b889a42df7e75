//! Handler for the `start` command.

use crate::cli::StartArgs;
use crate::config::Config;
use crate::error::Result;
use crate::lifecycle::{LifecycleController, StartOptions};
use crate::runtime::create_backend;

/// Start an application's pods.
pub async fn execute(config: &Config, args: StartArgs) -> Result<()> {
    let backend = create_backend(config)?;

    LifecycleController::new(backend)
        .start(StartOptions {
            name: args.name,
            pod_names: args.pod,
            auto_yes: args.yes,
            skip_logs: args.skip_logs,
        })
        .await
}
