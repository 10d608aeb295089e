use anyhow::Context as _;
use ethers::utils::format_ether;
use tracing::{info, warn};

use super::BalanceOpts;
use crate::wallet::{connect_provider, connect_senders};

pub async fn balances(opts: BalanceOpts) -> anyhow::Result<()> {
    let provider = connect_provider(&opts.rpc_url)?;
    let keys: Vec<String> = opts
        .keys
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    let senders = connect_senders(&provider, &keys)
        .await
        .context("failed to set up sender wallets")?;

    for sender in senders {
        let address = sender.address();
        match sender.balance().await {
            Ok(balance) => {
                info!(%address, "balance: {} {}", format_ether(balance), opts.symbol);
            }
            Err(error) => {
                warn!(%address, "failed to query balance: {error:#}");
            }
        }
    }
    Ok(())
}
