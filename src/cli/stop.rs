//! Handler for the `stop` command.

use crate::cli::StopArgs;
use crate::config::Config;
use crate::error::Result;
use crate::lifecycle::{LifecycleController, StopOptions};
use crate::runtime::create_backend;

/// Stop an application's pods.
pub async fn execute(config: &Config, args: StopArgs) -> Result<()> {
    let backend = create_backend(config)?;

    LifecycleController::new(backend)
        .stop(StopOptions {
            name: args.name,
            pod_names: args.pod,
            auto_yes: args.yes,
        })
        .await
}
