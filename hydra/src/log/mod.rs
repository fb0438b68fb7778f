//! Logging façade used by every Hydra component.
//!
//! Components never call `tracing` directly. They hold an `Arc<dyn Logger>`
//! and log through the `log_*!` macros, so the data layer can run silently
//! under test or have its output captured and asserted on.
//!
//! - [`Logger`]: the interface components depend on
//! - [`TracingLogger`]: production adapter that forwards to `tracing`
//! - [`NoOpLogger`]: discards everything
//! - [`CaptureLogger`]: keeps messages in memory for inspection
//!
//! ```
//! use hydra::log::{Logger, NoOpLogger};
//! use hydra::{log_debug, log_info};
//! use std::sync::Arc;
//!
//! struct Ingestor {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Ingestor {
//!     fn ingest(&self, symbol: &str) {
//!         log_info!(self.logger, "Ingesting {}", symbol);
//!         log_debug!(self.logger, "Ingest finished for {}", symbol);
//!     }
//! }
//!
//! let ingestor = Ingestor { logger: Arc::new(NoOpLogger) };
//! ingestor.ingest("BTCUSDT");
//! ```

mod capture;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use capture::{CaptureLogger, CapturedLine};
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
