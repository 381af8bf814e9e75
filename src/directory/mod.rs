//! Directory client seam.
//!
//! The reconciler talks to the remote user directory only through [`DirectoryClient`].
//! [`SlackDirectory`] is the production implementation over Slack's SCIM and Web APIs.

mod slack;

#[cfg(test)]
pub mod fake;

pub use slack::*;

use async_trait::async_trait;

use crate::models::{ProfileFields, ScimGroup, ScimMember, ScimUser};

/// Errors returned by a directory backend.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Slack API error: {0}")]
    Api(String),
    #[error("failed to parse directory response: {0}")]
    Parse(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Operations the reconciler needs from the remote directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Find the user whose `userName` equals `email` exactly.
    async fn search_user_by_email(&self, email: &str) -> DirectoryResult<Option<ScimUser>>;

    /// Create a user; the returned user carries the directory-assigned id.
    async fn create_user(&self, user: &ScimUser) -> DirectoryResult<ScimUser>;

    /// Replace the user identified by `id`.
    async fn update_user(&self, id: &str, user: &ScimUser) -> DirectoryResult<ScimUser>;

    async fn delete_user(&self, id: &str) -> DirectoryResult<()>;

    /// Set custom profile fields on the user's workspace profile.
    async fn set_profile_fields(&self, user_id: &str, fields: &ProfileFields)
        -> DirectoryResult<()>;

    async fn get_group(&self, id: &str) -> DirectoryResult<ScimGroup>;

    /// Replace the full member list of a group.
    async fn replace_group_members(&self, id: &str, members: &[ScimMember])
        -> DirectoryResult<()>;
}
