use anyhow::Result;
use async_trait::async_trait;
use ethers::types::{TxHash, U256};

pub mod local;

pub use local::{connect_provider, connect_senders, LocalSender};

/// A native-token transfer ready to be signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub to: String,
    pub value: U256,
    pub gas_price: U256,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    /// Whether the transaction executed successfully on chain
    pub success: bool,
    pub block_number: Option<u64>,
}

/// An account able to sign and submit transfers.
#[async_trait]
pub trait Sender: Send + Sync {
    fn address(&self) -> String;
    async fn balance(&self) -> Result<U256>;
    /// Current price per unit of gas
    async fn gas_price(&self) -> Result<U256>;
    async fn submit(&self, transfer: &Transfer) -> Result<TxHash>;
    /// Waits for `confirmations` blocks. `None` means the transaction was dropped.
    async fn confirm(&self, tx_hash: TxHash, confirmations: usize)
        -> Result<Option<TransferReceipt>>;
}
