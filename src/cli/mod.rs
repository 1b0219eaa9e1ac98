//! Interactive session for the ideaboard application
mod app;
mod args;

pub use app::*;
pub use args::*;
