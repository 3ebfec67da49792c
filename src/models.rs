// src/models.rs

use serde::{Deserialize, Serialize};

use crate::estimator::INITIAL_BYTES_PER_URL;
use crate::render::DEFAULT_BAR_WIDTH;

/// The list fetched by the binary.
pub const DEFAULT_URLS: [&str; 5] = [
    "https://cdn.pixabay.com/photo/2022/03/06/05/30/clouds-7050884_1280.jpg",
    "https://cdimage.debian.org/cdimage/release/current/amd64/iso-cd/debian-11.2.0-amd64-netinst.iso",
    "https://cdn.pixabay.com/photo/2020/03/09/17/51/narcis-4916584_1280.jpg",
    "https://cdn.pixabay.com/photo/2022/03/01/20/58/peace-genius-7042013_1280.jpg",
    "https://cdn.pixabay.com/photo/2017/06/05/07/58/butterfly-2373175_1280.png",
];

/// Options for a fetch run. Compiled in; nothing reads them at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    pub urls: Vec<String>,
    /// Seed of the per-URL size prediction, in bytes.
    pub initial_bytes_per_url: f64,
    pub bar_width: usize,
    pub max_redirects: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            urls: DEFAULT_URLS.iter().map(|u| u.to_string()).collect(),
            initial_bytes_per_url: INITIAL_BYTES_PER_URL,
            bar_width: DEFAULT_BAR_WIDTH,
            max_redirects: 10,
        }
    }
}

/// How a single transfer ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferStatus {
    Completed,
    Failed(String),
}

/// Outcome of one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReport {
    pub url: String,
    /// Bytes received, including a partial body of a failed transfer.
    pub bytes: u64,
    pub status: TransferStatus,
}

/// Outcome of a whole run, one entry per URL in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    pub transfers: Vec<TransferReport>,
}

impl FetchReport {
    /// Bytes received over the whole run.
    pub fn total_bytes(&self) -> u64 {
        self.transfers.iter().map(|t| t.bytes).sum()
    }

    /// Number of transfers that did not complete.
    pub fn failed(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| matches!(t.status, TransferStatus::Failed(_)))
            .count()
    }
}
