//! # forge_history
//!
//! Run history and rolling build metrics for BuildForge.
//!
//! [`HistoryStore`] is an append-only, bounded log of [`forge_runner::RunResult`]
//! records. Metrics (totals, success rate, average duration of succeeded
//! runs, per-target breakdown) are maintained as running sums but always
//! equal a full fold over the retained entries, never incrementally trusted
//! alone.
//!
//! The store holds no locks and claims no thread-safety for simultaneous
//! appends; concurrent use requires external synchronization. Persistence is
//! a caller concern: the CLI serializes [`HistoryEntry`] records and rebuilds
//! the store by re-appending on load.

pub mod metrics;
pub mod store;

pub use metrics::{Metrics, TargetStats};
pub use store::{HistoryEntry, HistoryStore, DEFAULT_RETENTION};
