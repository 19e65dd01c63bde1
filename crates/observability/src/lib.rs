//! Process-wide logging for the stockroom binaries.
//!
//! Call [`init`] once at startup; it reads `LOG_FORMAT` and `RUST_LOG`.

pub mod tracing;

pub use tracing::{init, init_with, LogFormat};
