//! Directory reconciliation.
//!
//! Synchronizes one validated [`RosterRecord`] with the remote directory: lookup by
//! email, create/update/delete, custom profile fields, then static group memberships.
//! There is no transaction across these calls, so every completed call is recorded as a
//! [`SyncStep`] and handed back on failure.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::DirectoryConfig;
use crate::directory::{DirectoryClient, DirectoryError};
use crate::models::{
    ProfileField, ProfileFields, RosterRecord, ScimMember, ScimName, ScimUser, ScimValue,
    SyncVariant, UserType, SCIM_USER_SCHEMA,
};

/// Group whose members get a coach display name in the service variant.
pub const COACHES_GROUP: &str = "coaches";

/// One directory operation completed while syncing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SyncStep {
    Lookup { found: Option<String> },
    Created { user_id: String },
    Updated { user_id: String },
    Deleted { user_id: String },
    ProfileSet { user_id: String },
    GroupJoined { group: String, group_id: String },
    GroupSkipped { group: String },
}

/// What happened to a record, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub steps: Vec<SyncStep>,
}

impl SyncReport {
    /// Id of the directory user the record was synced to, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.steps.iter().find_map(|step| match step {
            SyncStep::Created { user_id }
            | SyncStep::Updated { user_id }
            | SyncStep::Deleted { user_id } => Some(user_id.as_str()),
            _ => None,
        })
    }

    pub fn was_deleted(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, SyncStep::Deleted { .. }))
    }
}

/// Renders the steps as a JSON array.
impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.steps).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// A directory failure part-way through a record.
///
/// The message lists the completed steps so partial remote state shows up in logs.
#[derive(Debug, thiserror::Error)]
#[error("{source} (completed steps: {completed})")]
pub struct ReconcileError {
    /// Steps that completed before the failure
    pub completed: SyncReport,
    #[source]
    pub source: DirectoryError,
}

/// Attach the steps completed so far to a directory error.
trait WithSteps<T> {
    fn with_steps(self, report: &SyncReport) -> Result<T, ReconcileError>;
}

impl<T> WithSteps<T> for Result<T, DirectoryError> {
    fn with_steps(self, report: &SyncReport) -> Result<T, ReconcileError> {
        self.map_err(|source| ReconcileError {
            completed: report.clone(),
            source,
        })
    }
}

/// Display name shown in Slack for a record.
pub fn display_name(record: &RosterRecord, variant: SyncVariant) -> String {
    let is_coach = match variant {
        SyncVariant::Batch => record.user_type == UserType::Staff,
        SyncVariant::Service => record.in_group(COACHES_GROUP),
    };
    if is_coach {
        format!("Coach {}", record.last_name)
    } else {
        String::new()
    }
}

/// Candidate directory user built from a record.
pub fn build_user(record: &RosterRecord, variant: SyncVariant) -> ScimUser {
    ScimUser {
        schemas: vec![SCIM_USER_SCHEMA.to_string()],
        id: None,
        user_name: record.email.clone(),
        name: ScimName {
            given_name: record.first_name.clone(),
            family_name: record.last_name.clone(),
        },
        display_name: display_name(record, variant),
        title: Some(record.title.clone()),
        emails: vec![ScimValue::primary(&record.email)],
        phone_numbers: vec![ScimValue::primary(&record.phone)],
        active: record.enable.unwrap_or(true),
    }
}

/// Applies validated records to a directory.
pub struct Reconciler {
    directory: Arc<dyn DirectoryClient>,
    config: DirectoryConfig,
    variant: SyncVariant,
}

impl Reconciler {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        config: DirectoryConfig,
        variant: SyncVariant,
    ) -> Self {
        Self {
            directory,
            config,
            variant,
        }
    }

    pub fn variant(&self) -> SyncVariant {
        self.variant
    }

    /// Synchronize one record and its group memberships.
    pub async fn reconcile(&self, record: &RosterRecord) -> Result<SyncReport, ReconcileError> {
        let mut report = SyncReport::default();

        let existing = self
            .directory
            .search_user_by_email(&record.email)
            .await
            .with_steps(&report)?;
        let existing_id = existing.and_then(|u| u.id);
        report.steps.push(SyncStep::Lookup {
            found: existing_id.clone(),
        });

        let mut user = build_user(record, self.variant);

        let user_id = match existing_id {
            Some(id) if record.enable == Some(false) => {
                info!("{} is disabled, removing from Slack", record.full_name());
                self.directory.delete_user(&id).await.with_steps(&report)?;
                report.steps.push(SyncStep::Deleted { user_id: id });
                return Ok(report);
            }
            Some(id) => {
                info!(
                    "{} already exists so this will only update the user",
                    record.full_name()
                );
                user.id = Some(id.clone());
                let updated = self
                    .directory
                    .update_user(&id, &user)
                    .await
                    .with_steps(&report)?;
                let user_id = updated.id.unwrap_or(id);
                report.steps.push(SyncStep::Updated {
                    user_id: user_id.clone(),
                });
                user_id
            }
            None => {
                let created = self
                    .directory
                    .create_user(&user)
                    .await
                    .with_steps(&report)?;
                let user_id = created.id.ok_or_else(|| ReconcileError {
                    completed: report.clone(),
                    source: DirectoryError::Parse("created user has no id".to_string()),
                })?;
                report.steps.push(SyncStep::Created {
                    user_id: user_id.clone(),
                });
                user_id
            }
        };

        if !user.active {
            return Ok(report);
        }

        if record.user_type != UserType::Staff {
            let fields = self.profile_fields(record);
            self.directory
                .set_profile_fields(&user_id, &fields)
                .await
                .with_steps(&report)?;
            report.steps.push(SyncStep::ProfileSet {
                user_id: user_id.clone(),
            });
        }

        if let Some(groups) = &record.groups {
            for group in groups {
                self.join_group(&user_id, group, &mut report).await?;
            }
        }

        Ok(report)
    }

    fn profile_fields(&self, record: &RosterRecord) -> ProfileFields {
        let mut fields = ProfileFields::new();
        fields.insert(
            self.config.year_field.clone(),
            ProfileField::new(record.year.clone().unwrap_or_default()),
        );
        fields.insert(
            self.config.birthday_field.clone(),
            ProfileField::new(record.birthday.clone().unwrap_or_default()),
        );
        fields
    }

    /// Append `user_id` to the named group's member list.
    ///
    /// Names missing from the group table are skipped without error. The id is appended
    /// even when already present.
    async fn join_group(
        &self,
        user_id: &str,
        group: &str,
        report: &mut SyncReport,
    ) -> Result<(), ReconcileError> {
        let Some(group_id) = self.config.group_id(group) else {
            debug!("Skipping unknown group {:?}", group);
            report.steps.push(SyncStep::GroupSkipped {
                group: group.to_string(),
            });
            return Ok(());
        };

        let current = self
            .directory
            .get_group(group_id)
            .await
            .with_steps(report)?;
        let mut members = current.members;
        members.push(ScimMember::new(user_id));

        self.directory
            .replace_group_members(group_id, &members)
            .await
            .with_steps(report)?;
        report.steps.push(SyncStep::GroupJoined {
            group: group.to_string(),
            group_id: group_id.to_string(),
        });
        Ok(())
    }
}
