mod balances;
mod disburser;

pub use balances::balances;
pub use disburser::{AttemptOutcome, Disburser, FailureReason};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{error, info};

use crate::config::DisburseConfig;
use crate::recipients::{read_recipients, DoneList};
use crate::scheduler::{Scheduler, TokioClock};
use crate::wallet::{connect_provider, connect_senders};

#[derive(Args, Debug, Clone)]
pub struct RunConfigOpts {
    /// Path to a JSON config file
    #[arg(short, long)]
    pub path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunOpts {
    /// JSON-RPC endpoint of the target chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    /// Sender private keys, comma separated
    #[arg(
        short,
        long = "private-keys",
        env = "PRIVATE_KEYS",
        value_delimiter = ',',
        hide_env_values = true,
        required = true
    )]
    pub keys: Vec<String>,
    /// Smallest amount to send, in whole tokens
    #[arg(long, env = "MIN_AMOUNT", default_value = "0.001")]
    pub min_amount: String,
    /// Upper bound (exclusive) of the amount to send, in whole tokens
    #[arg(long, env = "MAX_AMOUNT", default_value = "0.002")]
    pub max_amount: String,
    /// Seconds to wait after a sweep before starting the next one
    #[arg(
        short,
        long,
        env = "INTERVAL_SECONDS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,
    /// File with one recipient address per line
    #[arg(short, long, env = "RECIPIENTS_FILE", default_value = "address.txt")]
    pub recipients: PathBuf,
    /// Append-only file of recipients every sender has paid
    #[arg(short, long, env = "DONE_FILE", default_value = "done.txt")]
    pub done: PathBuf,
    /// Log file, appended to
    #[arg(long, env = "LOG_FILE", default_value = "logs/autosender.log")]
    pub log_file: PathBuf,
    /// Confirmations to wait for before counting a transfer as sent
    #[arg(long, env = "CONFIRMATIONS", default_value = "1")]
    pub confirmations: usize,
    #[arg(long, env = "GAS_LIMIT", default_value = "21000")]
    pub gas_limit: u64,
    /// Explorer base url for transaction links, e.g. https://sepolia.tea.xyz/tx/
    #[arg(long, env = "EXPLORER_URL")]
    pub explorer_url: Option<String>,
    #[arg(long, env = "TOKEN_SYMBOL", default_value = "TEA")]
    pub symbol: String,
}

impl From<RunOpts> for DisburseConfig {
    fn from(opts: RunOpts) -> Self {
        Self {
            rpc_url: opts.rpc_url,
            private_keys: opts.keys,
            min_amount: opts.min_amount,
            max_amount: opts.max_amount,
            interval_seconds: opts.interval,
            recipients_path: opts.recipients,
            done_path: opts.done,
            log_path: Some(opts.log_file),
            confirmations: opts.confirmations,
            gas_limit: opts.gas_limit,
            explorer_url: opts.explorer_url,
            symbol: opts.symbol,
        }
    }
}

#[derive(Args, Debug, Clone)]
/// Logs the address and balance of every sender
pub struct BalanceOpts {
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    #[arg(
        short,
        long = "private-keys",
        env = "PRIVATE_KEYS",
        value_delimiter = ',',
        hide_env_values = true,
        required = true
    )]
    pub keys: Vec<String>,
    #[arg(long, env = "TOKEN_SYMBOL", default_value = "TEA")]
    pub symbol: String,
}

/// Sweeps until interrupted.
pub async fn run(config: DisburseConfig) -> Result<()> {
    config.validate()?;
    let amounts = config.amount_range()?;
    let recipients = read_recipients(&config.recipients_path).await?;
    let done = DoneList::load(config.done_path.clone()).await?;

    let provider = connect_provider(&config.rpc_url)?;
    let senders = connect_senders(&provider, &config.keys())
        .await
        .context("failed to set up sender wallets")?;

    info!("===== auto sender start =====");
    info!(
        senders = senders.len(),
        recipients = recipients.len(),
        done = done.len(),
        interval_secs = config.interval_seconds,
        "amount: {amounts} {}",
        config.symbol
    );

    let mut disburser = Disburser::new(
        senders,
        recipients,
        done,
        amounts,
        config.transfer_settings(),
    );
    let scheduler = Scheduler::new(config.interval(), TokioClock);
    scheduler.run(&mut disburser, shutdown_signal()).await;
    Ok(())
}

pub fn load_config(opts: &RunConfigOpts) -> Result<DisburseConfig> {
    let config = DisburseConfig::from_file(&opts.path)?;
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(?error, "failed to listen for interrupt");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!(?error, "failed to listen for terminate");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received interrupt"),
        _ = terminate => info!("received terminate"),
    }
}
