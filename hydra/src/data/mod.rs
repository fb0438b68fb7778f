//! Market-data management.
//!
//! [`DataManager`] is the single entry point: it persists metrics through a
//! [`DocumentStore`](crate::store::DocumentStore), serves latest and
//! historical reads, prunes old data, and keeps bounded realtime queues and
//! an LRU data cache in memory.
//!
//! # Historical fetch
//!
//! A range is split into fixed windows ([`TimeWindows`], 24 h by default).
//! Each window is one range query. A [`Throttle`] paces consecutive queries
//! so a long backfill doesn't saturate the store:
//!
//! | Throttle | Behavior |
//! |----------|----------|
//! | [`FixedDelay`] | Sleep a fixed time (100 ms default) |
//! | [`TokenBucket`] | Burst up to capacity, then a steady rate |
//! | [`NoDelay`] | Never wait |

mod cache;
mod error;
mod frame;
mod manager;
mod queue;
mod throttle;
mod window;

pub use cache::{CacheError, CacheStats, DataCache};
pub use error::DataError;
pub use frame::{FrameRow, HistoricalFrame};
pub use manager::{ArchiveReport, DataManager, HistoricalQuery, MetricRecord, PartitionSummary};
pub use queue::{
    ErrorEntry, MetricSnapshot, QueueName, RealtimeEntry, RealtimeQueue, SignalEntry,
};
pub use throttle::{FixedDelay, NoDelay, Throttle, TokenBucket, DEFAULT_WINDOW_DELAY};
pub use window::TimeWindows;
