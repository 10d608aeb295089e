// Copyright 2025 Recall Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
pub mod amount;
pub mod commands;
pub mod config;
pub mod logging;
pub mod recipients;
pub mod report;
pub mod scheduler;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

use clap::{command, Parser, Subcommand};
use commands::{BalanceOpts, RunConfigOpts, RunOpts};

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Commands {
    /// Send random amounts to every recipient on an interval, settings from flags or env
    #[clap(alias = "start")]
    Run(RunOpts),
    #[clap(alias = "run-file")]
    /// Same as run, with settings from a JSON config file
    RunConfig(RunConfigOpts),
    /// Show the balance of every sender wallet
    Balances(BalanceOpts),
}
