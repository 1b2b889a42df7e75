//! Handler for the `pull` command.

use crate::cli::{output, PullArgs};
use crate::config::Config;
use crate::error::Result;
use crate::runtime::create_backend;

/// Pull a container image through the configured runtime.
pub async fn execute(config: &Config, args: PullArgs) -> Result<()> {
    let backend = create_backend(config)?;

    output::note(&format!("Pulling image '{}'", args.image));
    backend.pull_image(&args.image).await?;
    output::ok(&format!("image '{}' pulled", args.image));

    Ok(())
}
