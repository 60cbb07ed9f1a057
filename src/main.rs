use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sessiontron::config::{config_schema, load_config};
use sessiontron::startup;
use sessiontron::utils::logger::init_logging;
use tracing::{error, info};

/// Session service: cookie or header identified sessions backed by a configurable store.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "SESSIONTRON_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    /// Print the configuration JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_schema {
        return match config_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render configuration schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} ({})", e, cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);
    info!(
        "Loaded configuration from {} (version {})",
        cli.config.display(),
        env!("CARGO_PKG_VERSION")
    );

    match startup::run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
