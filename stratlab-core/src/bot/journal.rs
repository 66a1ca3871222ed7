//! Trade journal — manually recorded trades and their aggregate statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{profit_loss, Side};
use crate::store::{load_json, save_json, KeyValueStore, StoreError};

pub const JOURNAL_KEY: &str = "journal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub size: f64,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl JournalEntry {
    pub fn is_closed(&self) -> bool {
        self.exit_price.is_some()
    }

    /// Realized P&L, `None` while the entry is open.
    pub fn pnl(&self) -> Option<f64> {
        self.exit_price
            .map(|exit| profit_loss(self.side, self.entry_price, exit, self.size))
    }
}

/// Fields for a new journal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub size: f64,
    pub opened_at: i64,
    pub tags: Vec<String>,
    pub notes: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("no journal entry with id {0}")]
    NotFound(u64),

    #[error("journal entry {0} is already closed")]
    AlreadyClosed(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Caller-owned journal backed by a store.
pub struct Journal<S: KeyValueStore> {
    store: S,
    entries: Vec<JournalEntry>,
    next_id: u64,
}

impl<S: KeyValueStore> Journal<S> {
    pub fn open(store: S) -> Result<Self, StoreError> {
        let entries: Vec<JournalEntry> = load_json(&store, JOURNAL_KEY)?.unwrap_or_default();
        let next_id = entries.iter().map(|e| e.id).max().map_or(1, |id| id + 1);
        Ok(Self {
            store,
            entries,
            next_id,
        })
    }

    pub fn add(&mut self, entry: NewEntry) -> Result<u64, StoreError> {
        let id = self.next_id;
        let mut entries = self.entries.clone();
        entries.push(JournalEntry {
            id,
            symbol: entry.symbol,
            side: entry.side,
            entry_price: entry.entry_price,
            exit_price: None,
            size: entry.size,
            opened_at: entry.opened_at,
            closed_at: None,
            tags: entry.tags,
            notes: entry.notes,
        });
        self.commit(entries)?;
        self.next_id += 1;
        Ok(id)
    }

    pub fn close(&mut self, id: u64, exit_price: f64, closed_at: i64) -> Result<f64, JournalError> {
        let mut entries = self.entries.clone();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(JournalError::NotFound(id))?;
        if entry.is_closed() {
            return Err(JournalError::AlreadyClosed(id));
        }
        entry.exit_price = Some(exit_price);
        entry.closed_at = Some(closed_at);
        let pnl = profit_loss(entry.side, entry.entry_price, exit_price, entry.size);
        self.commit(entries)?;
        Ok(pnl)
    }

    pub fn list(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn stats(&self) -> JournalStats {
        journal_stats(&self.entries)
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Save `entries` and adopt them; on failure the journal is unchanged.
    fn commit(&mut self, entries: Vec<JournalEntry>) -> Result<(), StoreError> {
        save_json(&mut self.store, JOURNAL_KEY, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JournalStats {
    pub total_entries: usize,
    pub open_entries: usize,
    pub closed_entries: usize,
    /// Percent of closed entries with positive P&L.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
    pub best_pnl: f64,
    pub worst_pnl: f64,
    pub pnl_by_symbol: BTreeMap<String, f64>,
    /// An entry with several tags counts toward each of them.
    pub pnl_by_tag: BTreeMap<String, f64>,
}

pub fn journal_stats(entries: &[JournalEntry]) -> JournalStats {
    let mut stats = JournalStats {
        total_entries: entries.len(),
        ..JournalStats::default()
    };

    let mut wins = 0usize;
    let mut best = f64::NEG_INFINITY;
    let mut worst = f64::INFINITY;

    for entry in entries {
        let Some(pnl) = entry.pnl() else {
            stats.open_entries += 1;
            continue;
        };
        stats.closed_entries += 1;
        stats.total_pnl += pnl;
        if pnl > 0.0 {
            wins += 1;
        }
        best = best.max(pnl);
        worst = worst.min(pnl);
        *stats.pnl_by_symbol.entry(entry.symbol.clone()).or_insert(0.0) += pnl;
        for tag in &entry.tags {
            *stats.pnl_by_tag.entry(tag.clone()).or_insert(0.0) += pnl;
        }
    }

    if stats.closed_entries > 0 {
        let closed = stats.closed_entries as f64;
        stats.win_rate = wins as f64 / closed * 100.0;
        stats.average_pnl = stats.total_pnl / closed;
        stats.best_pnl = best;
        stats.worst_pnl = worst;
    }
    stats
}
