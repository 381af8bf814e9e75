//! In-memory directory used by tests.
//!
//! Stores users and groups and records every call so tests can assert on exactly
//! which directory operations a sync performed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DirectoryClient, DirectoryError, DirectoryResult};
use crate::models::{ProfileFields, ScimGroup, ScimMember, ScimUser};

/// One recorded directory operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Create(String),
    Update(String),
    Delete(String),
    SetProfile(String),
    GetGroup(String),
    ReplaceMembers(String),
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, ScimUser>,
    groups: HashMap<String, ScimGroup>,
    profiles: HashMap<String, ProfileFields>,
    calls: Vec<Call>,
    next_id: u32,
    fail_on: Option<&'static str>,
}

#[derive(Debug, Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory pre-populated with empty groups for the given ids.
    pub fn with_groups(ids: &[&str]) -> Self {
        let directory = Self::new();
        {
            let mut state = directory.state.lock().unwrap();
            for id in ids {
                state.groups.insert(
                    id.to_string(),
                    ScimGroup {
                        id: id.to_string(),
                        display_name: id.to_string(),
                        members: Vec::new(),
                    },
                );
            }
        }
        directory
    }

    /// Make every call of the given kind (e.g. "get_group") fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on = Some(operation);
    }

    pub fn insert_user(&self, user: ScimUser) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("U{:04}", state.next_id);
        let mut user = user;
        user.id = Some(id.clone());
        state.users.insert(id.clone(), user);
        id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    pub fn user(&self, id: &str) -> Option<ScimUser> {
        self.state.lock().unwrap().users.get(id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn profile(&self, id: &str) -> Option<ProfileFields> {
        self.state.lock().unwrap().profiles.get(id).cloned()
    }

    pub fn members(&self, group_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .groups
            .get(group_id)
            .map(|g| g.members.iter().map(|m| m.value.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, operation: &'static str, call: Call) -> DirectoryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_on == Some(operation) {
            return Err(DirectoryError::Status {
                status: 500,
                body: format!("{} failed", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn search_user_by_email(&self, email: &str) -> DirectoryResult<Option<ScimUser>> {
        self.record("search", Call::Search(email.to_string()))?;
        let state = self.state.lock().unwrap();
        let found = state
            .users
            .values()
            .find(|u| u.user_name == email)
            .cloned();
        Ok(found)
    }

    async fn create_user(&self, user: &ScimUser) -> DirectoryResult<ScimUser> {
        self.record("create_user", Call::Create(user.user_name.clone()))?;
        let id = self.insert_user(user.clone());
        Ok(self.user(&id).unwrap())
    }

    async fn update_user(&self, id: &str, user: &ScimUser) -> DirectoryResult<ScimUser> {
        self.record("update_user", Call::Update(id.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(id) {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        let mut user = user.clone();
        user.id = Some(id.to_string());
        state.users.insert(id.to_string(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> DirectoryResult<()> {
        self.record("delete_user", Call::Delete(id.to_string()))?;
        self.state.lock().unwrap().users.remove(id);
        Ok(())
    }

    async fn set_profile_fields(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> DirectoryResult<()> {
        self.record("set_profile_fields", Call::SetProfile(user_id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .profiles
            .insert(user_id.to_string(), fields.clone());
        Ok(())
    }

    async fn get_group(&self, id: &str) -> DirectoryResult<ScimGroup> {
        self.record("get_group", Call::GetGroup(id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    async fn replace_group_members(
        &self,
        id: &str,
        members: &[ScimMember],
    ) -> DirectoryResult<()> {
        self.record("replace_group_members", Call::ReplaceMembers(id.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let group = state
            .groups
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        group.members = members.to_vec();
        Ok(())
    }
}
