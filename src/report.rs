use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Per-sender outcome counts for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderTally {
    pub address: String,
    pub confirmed: u32,
    pub insufficient: u32,
    pub errors: u32,
}

impl SenderTally {
    pub fn new(address: String) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.confirmed + self.insufficient + self.errors
    }

    pub fn failures(&self) -> u32 {
        self.insufficient + self.errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientResult {
    pub address: String,
    pub succeeded: u32,
    pub failed: u32,
}

impl RecipientResult {
    /// A recipient is complete only when no sender failed it in this sweep
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub number: u64,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    /// Recipients skipped because they were already done
    pub skipped: usize,
    pub recipients: Vec<RecipientResult>,
    pub tallies: Vec<SenderTally>,
}

impl SweepReport {
    pub fn attempts(&self) -> u32 {
        self.tallies.iter().map(SenderTally::attempts).sum()
    }

    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.recipients
            .iter()
            .filter(|r| r.is_complete())
            .map(|r| r.address.as_str())
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.recipients
            .iter()
            .filter(|r| !r.is_complete())
            .map(|r| r.address.as_str())
    }

    pub fn duration(&self) -> Duration {
        self.finished.signed_duration_since(self.started)
    }

    pub fn display(&self) {
        for tally in &self.tallies {
            info!(
                sweep = self.number,
                sender = %tally.address,
                attempts = tally.attempts(),
                confirmed = tally.confirmed,
                insufficient = tally.insufficient,
                errors = tally.errors,
                "sender tally"
            );
        }
        info!(
            sweep = self.number,
            duration = %HumanDuration(self.duration()),
            attempts = self.attempts(),
            skipped = self.skipped,
            completed = self.completed().count(),
            pending = self.pending().count(),
            "sweep finished"
        );
    }
}

pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.num_seconds();
        let millis = self.0.num_milliseconds() % 1000;

        if total_secs == 0 {
            return write!(f, "{}ms", millis);
        }
        if total_secs < 60 {
            return write!(f, "{}.{:03}s", total_secs, millis);
        }

        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        if minutes < 60 {
            return write!(f, "{}m {}.{:03}s", minutes, seconds, millis);
        }

        let hours = minutes / 60;
        let minutes = minutes % 60;
        write!(f, "{}h {}m {}.{:03}s", hours, minutes, seconds, millis)
    }
}
