//! JSON snapshot of every store, written on shutdown and loaded on startup.

use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use crate::domain::{Category, Order, Product, Ticket};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Unsupported snapshot version {0}")]
    Version(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub taken_at: Option<DateTime<Utc>>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub tickets: Vec<Ticket>,
    pub orders: Vec<Order>,
}

impl StoreSnapshot {
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        info!(
            products = self.products.len(),
            tickets = self.tickets.len(),
            orders = self.orders.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// A missing file is an empty store.
    #[instrument(fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Self = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }
        Ok(snapshot)
    }
}
