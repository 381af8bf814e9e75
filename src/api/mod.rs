//! HTTP API module.
//!
//! The service accepts a JSON batch of roster records and answers with a fixed
//! plain-text status.

mod sync;

pub use sync::*;
