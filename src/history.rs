//! history.rs — in-memory log of recently computed signals for the debug
//! endpoints. Diagnostic only; nothing downstream depends on it.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{DemandBand, DemandSignal, GapType};

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    /// Hashed topic key; raw topics never enter the log.
    pub key_hash: String,
    pub band: DemandBand,
    pub gap_type: GapType,
    pub demand_score: u8,
    pub confidence: f32,
    pub sample_size: usize,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, key_hash: String, s: &DemandSignal) {
        let entry = HistoryEntry {
            ts_unix: now_unix(),
            key_hash,
            band: s.demand_band,
            gap_type: s.content_gap.gap_type,
            demand_score: s.demand_score,
            confidence: s.confidence,
            sample_size: s.sample_size,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
