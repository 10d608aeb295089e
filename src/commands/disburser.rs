use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use chrono::Utc;
use ethers::types::{TxHash, U256};
use rand::thread_rng;
use tracing::{debug, error, info, warn};

use crate::amount::{Amount, AmountRange};
use crate::config::TransferSettings;
use crate::recipients::DoneList;
use crate::report::{RecipientResult, SenderTally, SweepReport};
use crate::wallet::{Sender, Transfer};

/// Outcome of one sender to recipient transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Confirmed {
        amount: Amount,
        tx_hash: TxHash,
    },
    /// Nothing was submitted
    InsufficientBalance {
        amount: Amount,
        balance: U256,
        required: U256,
    },
    SubmissionError(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Confirmed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    InsufficientBalance,
    SubmissionError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FailureReason::InsufficientBalance => "insufficient-balance",
            FailureReason::SubmissionError => "submission-error",
        };
        write!(f, "{}", reason)
    }
}

impl AttemptOutcome {
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            AttemptOutcome::Confirmed { .. } => None,
            AttemptOutcome::InsufficientBalance { .. } => Some(FailureReason::InsufficientBalance),
            AttemptOutcome::SubmissionError(_) => Some(FailureReason::SubmissionError),
        }
    }
}

/// Sends every sender's transfer to every recipient that is not done yet.
///
/// Recipients are visited in file order and, for each one, senders in configured order.
/// Transfers run one at a time so a sender never has two transactions competing for a nonce.
pub struct Disburser {
    senders: Vec<Arc<dyn Sender>>,
    recipients: Vec<String>,
    done: DoneList,
    amounts: AmountRange,
    settings: TransferSettings,
}

impl Disburser {
    pub fn new(
        senders: Vec<Arc<dyn Sender>>,
        recipients: Vec<String>,
        done: DoneList,
        amounts: AmountRange,
        settings: TransferSettings,
    ) -> Self {
        Self {
            senders,
            recipients,
            done,
            amounts,
            settings,
        }
    }

    pub fn done(&self) -> &DoneList {
        &self.done
    }

    /// Recipients still waiting for a complete sweep
    pub fn remaining(&self) -> usize {
        self.recipients
            .iter()
            .filter(|r| !self.done.contains(r))
            .count()
    }

    pub async fn sweep(&mut self, number: u64) -> SweepReport {
        let started = Utc::now();
        let mut tallies: Vec<SenderTally> = self
            .senders
            .iter()
            .map(|s| SenderTally::new(s.address()))
            .collect();
        let mut results = Vec::new();
        let mut skipped = 0;

        info!(
            sweep = number,
            remaining = self.remaining(),
            "starting sweep"
        );

        for recipient in &self.recipients {
            if self.done.contains(recipient) {
                debug!(%recipient, "already done, skipping");
                skipped += 1;
                continue;
            }

            let mut result = RecipientResult {
                address: recipient.clone(),
                succeeded: 0,
                failed: 0,
            };
            for (sender, tally) in self.senders.iter().zip(tallies.iter_mut()) {
                let outcome = self.attempt(sender.as_ref(), recipient).await;
                match outcome.failure_reason() {
                    None => {
                        tally.confirmed += 1;
                        result.succeeded += 1;
                    }
                    Some(FailureReason::InsufficientBalance) => {
                        tally.insufficient += 1;
                        result.failed += 1;
                    }
                    Some(FailureReason::SubmissionError) => {
                        tally.errors += 1;
                        result.failed += 1;
                    }
                }
            }

            if result.is_complete() {
                match self.done.mark_done(recipient).await {
                    Ok(_) => {
                        info!(%recipient, senders = result.succeeded, "recipient complete, marked done")
                    }
                    Err(error) => {
                        error!(?error, %recipient, "recipient complete but failed to persist done list")
                    }
                }
            } else {
                warn!(
                    %recipient,
                    succeeded = result.succeeded,
                    failed = result.failed,
                    "recipient incomplete, retrying next sweep"
                );
            }
            results.push(result);
        }

        SweepReport {
            number,
            started,
            finished: Utc::now(),
            skipped,
            recipients: results,
            tallies,
        }
    }

    /// Runs one transfer attempt. Never fails; errors become [`AttemptOutcome::SubmissionError`].
    pub async fn attempt(&self, sender: &dyn Sender, recipient: &str) -> AttemptOutcome {
        let amount = self.amounts.sample(&mut thread_rng());
        match self.transfer(sender, recipient, amount).await {
            Ok(outcome) => outcome,
            Err(error) => {
                error!(
                    from = %sender.address(),
                    to = %recipient,
                    reason = %FailureReason::SubmissionError,
                    "transfer failed: {error:#}"
                );
                AttemptOutcome::SubmissionError(format!("{error:#}"))
            }
        }
    }

    async fn transfer(
        &self,
        sender: &dyn Sender,
        recipient: &str,
        amount: Amount,
    ) -> Result<AttemptOutcome> {
        let from = sender.address();
        let value = amount.wei();
        let balance = sender.balance().await?;
        let gas_price = sender.gas_price().await?;
        let fee = gas_price.saturating_mul(U256::from(self.settings.gas_limit));
        let required = value.saturating_add(fee);

        if balance < required {
            warn!(
                %from,
                to = %recipient,
                %balance,
                %required,
                reason = %FailureReason::InsufficientBalance,
                "balance too low to send {amount} {}",
                self.settings.symbol
            );
            return Ok(AttemptOutcome::InsufficientBalance {
                amount,
                balance,
                required,
            });
        }

        info!(%from, to = %recipient, "sending {amount} {}", self.settings.symbol);
        let transfer = Transfer {
            to: recipient.to_string(),
            value,
            gas_price,
            gas_limit: self.settings.gas_limit,
        };
        let tx_hash = sender.submit(&transfer).await?;
        info!(
            %from,
            "tx submitted: {}",
            self.settings.tx_link(&format!("{tx_hash:?}"))
        );

        let receipt = sender
            .confirm(tx_hash, self.settings.confirmations)
            .await
            .with_context(|| format!("failed waiting for tx {tx_hash:?}"))?
            .ok_or_else(|| anyhow!("tx {tx_hash:?} dropped from mempool"))?;
        if !receipt.success {
            bail!("tx {tx_hash:?} failed on chain");
        }

        info!(
            %from,
            to = %recipient,
            tx = ?receipt.tx_hash,
            block = ?receipt.block_number,
            "tx confirmed: {amount} {} sent",
            self.settings.symbol
        );
        Ok(AttemptOutcome::Confirmed { amount, tx_hash })
    }
}
