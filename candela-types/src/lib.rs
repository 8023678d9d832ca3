//! Candela-specific error taxonomy, configuration primitives, and resolution tokens.
#![warn(missing_docs)]

mod config;
mod error;
mod resolution;
mod status;

pub use config::{BackoffConfig, CandelaConfig};
pub use error::CandelaError;
pub use resolution::Resolution;
pub use status::HistoryStatus;
