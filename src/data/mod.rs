//! Data module - shard loading and aggregation

pub mod loader;
mod processor;

pub use loader::{LoaderError, ShardLoader};
pub use processor::{
    AgeTotals, Aggregator, DailyTotals, ProcessorError, RankedTotals, WeeklyTotals, AGE_COLS,
    AGE_LABELS,
};
