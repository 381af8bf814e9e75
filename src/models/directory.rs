//! SCIM and Slack Web API wire models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SCIM_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const SCIM_PATCH_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// A directory user as exchanged with the SCIM `/Users` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_name: String,
    #[serde(default)]
    pub name: ScimName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub emails: Vec<ScimValue>,
    #[serde(default)]
    pub phone_numbers: Vec<ScimValue>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
}

/// A multi-valued attribute entry (email, phone number).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScimValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

impl ScimValue {
    pub fn primary(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            primary: Some(true),
        }
    }
}

/// SCIM list response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    #[serde(default)]
    pub total_results: i64,
    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

/// A directory group as returned by `GET /Groups/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub members: Vec<ScimMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScimMember {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl ScimMember {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: None,
        }
    }
}

/// SCIM PATCH request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<ScimPatchOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchOp {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl ScimPatchRequest {
    /// A PATCH that replaces a group's whole member list.
    pub fn replace_members(members: &[ScimMember]) -> Self {
        Self {
            schemas: vec![SCIM_PATCH_SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "replace".to_string(),
                path: Some("members".to_string()),
                value: Some(serde_json::json!(members)),
            }],
        }
    }
}

/// A single custom profile field value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileField {
    pub value: String,
    #[serde(default)]
    pub alt: String,
}

impl ProfileField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            alt: String::new(),
        }
    }
}

/// Custom profile fields keyed by the workspace's field id.
pub type ProfileFields = BTreeMap<String, ProfileField>;
