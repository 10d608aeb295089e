use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use ethers::types::{TxHash, U256};

use crate::wallet::{Sender, Transfer, TransferReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Every attempt starts with a balance query
    BalanceQuery { sender: String },
    Submit {
        sender: String,
        to: String,
        value: U256,
    },
    Sleep(Duration),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn balance_queries(events: &EventLog) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::BalanceQuery { sender } => Some(sender.clone()),
            _ => None,
        })
        .collect()
}

pub fn submissions(events: &EventLog) -> Vec<(String, String)> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::Submit { sender, to, .. } => Some((sender.clone(), to.clone())),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    BalanceQuery,
    Submit,
    Revert,
    Dropped,
}

pub struct MockSender {
    address: String,
    balance: Mutex<U256>,
    gas_price: U256,
    failure: Mutex<Option<Failure>>,
    failing_recipients: Mutex<HashSet<String>>,
    nonce: AtomicU64,
    events: EventLog,
}

impl MockSender {
    /// A sender with plenty of funds and a gas price of 1 gwei.
    pub fn funded(address: &str, events: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            balance: Mutex::new(U256::exp10(20)),
            gas_price: U256::exp10(9),
            failure: Mutex::new(None),
            failing_recipients: Mutex::new(HashSet::new()),
            nonce: AtomicU64::new(0),
            events: events.clone(),
        })
    }

    pub fn set_balance(&self, balance: U256) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn balance_now(&self) -> U256 {
        *self.balance.lock().unwrap()
    }

    pub fn set_failure(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Submissions to `to` fail until cleared
    pub fn fail_for(&self, to: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(to.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_recipients.lock().unwrap().clear();
        self.set_failure(None);
    }

    pub fn fee(&self, gas_limit: u64) -> U256 {
        self.gas_price * U256::from(gas_limit)
    }

    fn failure(&self) -> Option<Failure> {
        *self.failure.lock().unwrap()
    }
}

#[async_trait]
impl Sender for MockSender {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn balance(&self) -> Result<U256> {
        self.events.lock().unwrap().push(Event::BalanceQuery {
            sender: self.address.clone(),
        });
        if self.failure() == Some(Failure::BalanceQuery) {
            bail!("rpc unavailable");
        }
        Ok(self.balance_now())
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(self.gas_price)
    }

    async fn submit(&self, transfer: &Transfer) -> Result<TxHash> {
        self.events.lock().unwrap().push(Event::Submit {
            sender: self.address.clone(),
            to: transfer.to.clone(),
            value: transfer.value,
        });
        if self.failure() == Some(Failure::Submit)
            || self
                .failing_recipients
                .lock()
                .unwrap()
                .contains(&transfer.to)
        {
            return Err(anyhow!("nonce too low"));
        }
        let cost = transfer.value + transfer.gas_price * U256::from(transfer.gas_limit);
        let mut balance = self.balance.lock().unwrap();
        *balance = balance.saturating_sub(cost);
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(TxHash::from_low_u64_be(nonce + 1))
    }

    async fn confirm(
        &self,
        tx_hash: TxHash,
        _confirmations: usize,
    ) -> Result<Option<TransferReceipt>> {
        match self.failure() {
            Some(Failure::Dropped) => Ok(None),
            failure => Ok(Some(TransferReceipt {
                tx_hash,
                success: failure != Some(Failure::Revert),
                block_number: Some(1),
            })),
        }
    }
}
