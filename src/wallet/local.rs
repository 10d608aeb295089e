use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use ethers::{
    core::types::TransactionRequest,
    middleware::SignerMiddleware,
    prelude::*,
    providers::{Http, Provider},
    utils::to_checksum,
};
use tracing::info;

use super::{Sender, Transfer, TransferReceipt};

const POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub fn connect_provider(rpc_url: &str) -> Result<Provider<Http>> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .with_context(|| format!("invalid rpc url {rpc_url}"))?
        .interval(POLL_INTERVAL);
    Ok(provider)
}

/// Wallet signing locally and submitting through a JSON-RPC endpoint.
pub struct LocalSender {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    address: String,
}

impl LocalSender {
    pub fn new(provider: Provider<Http>, private_key: &str, chain_id: u64) -> Result<Self> {
        let wallet: LocalWallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .context("failed to parse private key")?
            .with_chain_id(chain_id);
        let address = to_checksum(&wallet.address(), None);
        let client = SignerMiddleware::new(provider, wallet);
        Ok(Self { client, address })
    }
}

/// Builds one sender per private key, keeping the configured order.
pub async fn connect_senders(
    provider: &Provider<Http>,
    private_keys: &[String],
) -> Result<Vec<Arc<dyn Sender>>> {
    let chain_id = provider
        .get_chainid()
        .await
        .context("failed to fetch chain id")?
        .as_u64();
    info!(chain_id, "connected to rpc");

    let mut senders: Vec<Arc<dyn Sender>> = Vec::with_capacity(private_keys.len());
    for (i, key) in private_keys.iter().enumerate() {
        let sender = LocalSender::new(provider.clone(), key, chain_id)
            .with_context(|| format!("invalid sender key #{}", i + 1))?;
        info!(address = %sender.address, "using sender wallet");
        senders.push(Arc::new(sender));
    }
    Ok(senders)
}

#[async_trait]
impl Sender for LocalSender {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn balance(&self) -> Result<U256> {
        let balance = self
            .client
            .get_balance(self.client.address(), None)
            .await
            .context("failed to query balance")?;
        Ok(balance)
    }

    async fn gas_price(&self) -> Result<U256> {
        let price = self
            .client
            .get_gas_price()
            .await
            .context("failed to query gas price")?;
        Ok(price)
    }

    async fn submit(&self, transfer: &Transfer) -> Result<TxHash> {
        let to: Address = transfer
            .to
            .parse()
            .with_context(|| format!("invalid recipient address {}", transfer.to))?;
        let tx = TransactionRequest::new()
            .to(to)
            .value(transfer.value)
            .gas_price(transfer.gas_price)
            .gas(transfer.gas_limit);
        let pending_tx = self
            .client
            .send_transaction(tx, None)
            .await
            .context("failed to submit transaction")?;
        Ok(pending_tx.tx_hash())
    }

    async fn confirm(
        &self,
        tx_hash: TxHash,
        confirmations: usize,
    ) -> Result<Option<TransferReceipt>> {
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .confirmations(confirmations)
            .await
            .context("failed to wait for confirmation")?;
        Ok(receipt.map(|receipt| TransferReceipt {
            tx_hash,
            success: receipt.status == Some(U64::from(1)),
            block_number: receipt.block_number.map(|n| n.as_u64()),
        }))
    }
}
