//! Bot-side state: grid engine, price alerts, trade journal.
//!
//! Every piece is owned by its caller and persists, where it persists at all,
//! through a `KeyValueStore`.

pub mod alerts;
pub mod grid;
pub mod journal;

pub use alerts::{Alert, AlertBook, AlertCondition, AlertTrigger, ALERTS_KEY};
pub use grid::{GridConfig, GridEngine, GridError, GridFill, GridOrderSide, GridSpacing};
pub use journal::{journal_stats, Journal, JournalEntry, JournalError, JournalStats, NewEntry, JOURNAL_KEY};
