// Copyright 2025 Recall Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Instant;

use auto_sender::{commands, logging, Cli, Commands};
use clap::Parser as _;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let opts = Cli::parse();
    let start = Instant::now();
    let res = match opts.command {
        Commands::Run(opts) => {
            let config: auto_sender::config::DisburseConfig = opts.into();
            logging::init(config.log_path.as_deref())?;
            commands::run(config).await
        }
        Commands::RunConfig(opts) => {
            let config = commands::load_config(&opts)?;
            logging::init(config.log_path.as_deref())?;
            commands::run(config).await
        }
        Commands::Balances(opts) => {
            logging::init(None)?;
            commands::balances(opts).await
        }
    };
    let elapsed = start.elapsed();
    match res {
        Ok(_) => {
            info!(?elapsed, "completed");
        }
        Err(error) => {
            warn!(?error, ?elapsed, "completed with error");
            return Err(error);
        }
    }
    Ok(())
}
