//! Content-planning library for LinkedIn post ideas
//!
//! This library keeps post ideas in an in-memory store, moves them through a
//! draft → review → ready → published pipeline, derives dashboard metrics,
//! and imports/exports the whole collection as CSV.

mod cli;
mod config;
mod errors;
mod helper;
mod idea;
mod metrics;
mod notify;
mod store;
mod transcoder;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use idea::*;
pub use metrics::*;
pub use notify::*;
pub use store::*;
pub use transcoder::*;
pub use types::*;
