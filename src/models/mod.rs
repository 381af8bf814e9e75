//! Data models for roster-sync.
//!
//! Roster-side records on one side, SCIM wire types for the Slack directory on the other.

mod directory;
mod record;

pub use directory::*;
pub use record::*;
