use clap::Parser;
use podlift::cli::{self, Cli};
use podlift::config::Config;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();

    tokio::select! {
        result = cli::run(cli.command, config) => {
            if let Err(e) = result {
                error!(error = %e, "command failed");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Interrupt received");
        }
    }
}
