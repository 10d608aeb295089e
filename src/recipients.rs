use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt as _;
use tracing::debug;

fn parse_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Reads the ordered recipient list. Addresses are not validated here.
pub async fn read_recipients(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read recipient file {}", path.display()))?;
    Ok(parse_lines(&contents).map(str::to_owned).collect())
}

/// Recipients that every sender has already paid, backed by an append-only file.
#[derive(Debug)]
pub struct DoneList {
    path: PathBuf,
    done: HashSet<String>,
}

impl DoneList {
    /// Loads the done file, treating a missing file as empty. Duplicate lines collapse.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let done = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_lines(&contents).map(str::to_owned).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path=%path.display(), "no done file yet");
                HashSet::new()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read done file {}", path.display()))
            }
        };
        Ok(Self { path, done })
    }

    pub fn contains(&self, address: &str) -> bool {
        self.done.contains(address)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Marks `address` as done and appends it to the file.
    ///
    /// Returns `Ok(false)` without touching the file if it was already done. The in-memory set
    /// is updated before the write, so a failed append still keeps the address out of later
    /// sweeps of this process.
    pub async fn mark_done(&mut self, address: &str) -> Result<bool> {
        if !self.done.insert(address.to_owned()) {
            return Ok(false);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open done file {}", self.path.display()))?;
        file.write_all(format!("{address}\n").as_bytes())
            .await
            .with_context(|| format!("failed to append to done file {}", self.path.display()))?;
        file.flush().await?;
        Ok(true)
    }
}
