//! Slack directory client (reqwest-based).
//!
//! Users and groups go through the SCIM API; custom profile fields go through the
//! Web API method `users.profile.set`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{DirectoryClient, DirectoryError, DirectoryResult};
use crate::config::Config;
use crate::models::{
    ProfileFields, ScimGroup, ScimListResponse, ScimMember, ScimPatchRequest, ScimUser,
};

const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// Slack Web API response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProfileSetRequest<'a> {
    user: &'a str,
    profile: ProfilePayload<'a>,
}

#[derive(Debug, Serialize)]
struct ProfilePayload<'a> {
    fields: &'a ProfileFields,
}

/// Directory client for a Slack workspace.
#[derive(Debug, Clone)]
pub struct SlackDirectory {
    http_client: Client,
    scim_url: String,
    api_url: String,
    token: String,
}

impl SlackDirectory {
    pub fn new(
        http_client: Client,
        scim_url: impl Into<String>,
        api_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            scim_url: scim_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> DirectoryResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("roster-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(
            http_client,
            &config.scim_url,
            &config.api_url,
            &config.token,
        ))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> DirectoryResult<T> {
        let response = self.authorized(builder).send().await?;
        let body = checked(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| DirectoryError::Parse(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> DirectoryResult<()> {
        let response = self.authorized(builder).send().await?;
        checked(response).await?;
        Ok(())
    }
}

/// Turn a non-success status into a [`DirectoryError`].
async fn checked(response: reqwest::Response) -> DirectoryResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());

    match status {
        StatusCode::NOT_FOUND => Err(DirectoryError::NotFound(body)),
        _ => Err(DirectoryError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

/// Escape a value for use inside a SCIM filter string literal.
fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl DirectoryClient for SlackDirectory {
    async fn search_user_by_email(&self, email: &str) -> DirectoryResult<Option<ScimUser>> {
        let url = format!("{}/Users", self.scim_url);
        let filter = format!("userName eq \"{}\"", escape_filter_value(email));
        debug!("SCIM GET {} (filter={})", url, filter);

        let builder = self.http_client.get(&url).query(&[
            ("filter", filter.as_str()),
            ("startIndex", "1"),
            ("count", "1"),
        ]);
        let list: ScimListResponse<ScimUser> = self.send_json(builder).await?;
        Ok(list.resources.into_iter().next())
    }

    async fn create_user(&self, user: &ScimUser) -> DirectoryResult<ScimUser> {
        let url = format!("{}/Users", self.scim_url);
        debug!("SCIM POST {}", url);

        let builder = self
            .http_client
            .post(&url)
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(user);
        self.send_json(builder).await
    }

    async fn update_user(&self, id: &str, user: &ScimUser) -> DirectoryResult<ScimUser> {
        let url = format!("{}/Users/{}", self.scim_url, id);
        debug!("SCIM PUT {}", url);

        let builder = self
            .http_client
            .put(&url)
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(user);
        self.send_json(builder).await
    }

    async fn delete_user(&self, id: &str) -> DirectoryResult<()> {
        let url = format!("{}/Users/{}", self.scim_url, id);
        debug!("SCIM DELETE {}", url);

        self.send_empty(self.http_client.delete(&url)).await
    }

    async fn set_profile_fields(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> DirectoryResult<()> {
        let url = format!("{}/users.profile.set", self.api_url);
        debug!("Slack API POST {} (user={})", url, user_id);

        let body = ProfileSetRequest {
            user: user_id,
            profile: ProfilePayload { fields },
        };
        let envelope: ApiEnvelope = self.send_json(self.http_client.post(&url).json(&body)).await?;
        if envelope.ok {
            Ok(())
        } else {
            Err(DirectoryError::Api(
                envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }

    async fn get_group(&self, id: &str) -> DirectoryResult<ScimGroup> {
        let url = format!("{}/Groups/{}", self.scim_url, id);
        debug!("SCIM GET {}", url);

        self.send_json(self.http_client.get(&url)).await
    }

    async fn replace_group_members(
        &self,
        id: &str,
        members: &[ScimMember],
    ) -> DirectoryResult<()> {
        let url = format!("{}/Groups/{}", self.scim_url, id);
        debug!("SCIM PATCH {} ({} members)", url, members.len());

        let builder = self
            .http_client
            .patch(&url)
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(&ScimPatchRequest::replace_members(members));
        self.send_empty(builder).await
    }
}
