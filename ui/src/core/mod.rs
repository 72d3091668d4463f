//! Platform-agnostic dashboard logic: typed selections, reconciliation,
//! scoring and persistence. Nothing in here renders.

pub mod error;
pub mod filter;
pub mod format;
pub mod metrics;
pub mod sessions;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod zscore;
