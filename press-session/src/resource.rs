//! Team resource handle

use press_client::{DocumentResource, PressApi};
use press_core::{validation_error, PressResult, TEAM_DOCTYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Whitelisted team methods as `(alias, server method)`
pub const TEAM_METHODS: [(&str, &str); 3] = [
    ("getTeamMembers", "get_team_members"),
    ("inviteTeamMember", "invite_team_member"),
    ("removeTeamMember", "remove_team_member"),
];

/// Member entry returned by `get_team_members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// User id, usually the email address
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
}

impl TeamMember {
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.name.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Handle to the current team's `Team` document
#[derive(Debug)]
pub struct TeamResource {
    resource: DocumentResource,
}

impl TeamResource {
    /// Bind a handle to `team`; `None` leaves it unbound and every remote
    /// call fails with a validation error
    pub fn new(api: Arc<dyn PressApi>, team: Option<String>) -> Self {
        let resource = TEAM_METHODS.iter().fold(
            DocumentResource::new(api, TEAM_DOCTYPE, team),
            |resource, (alias, method)| resource.with_method(*alias, *method),
        );
        Self { resource }
    }

    pub fn name(&self) -> Option<&str> {
        self.resource.name()
    }

    pub fn resource(&self) -> &DocumentResource {
        &self.resource
    }

    /// The team document, fetched on first use
    pub async fn fetch(&self) -> PressResult<Value> {
        self.resource.fetch().await
    }

    pub async fn reload(&self) -> PressResult<Value> {
        self.resource.reload().await
    }

    pub async fn doc(&self) -> Option<Value> {
        self.resource.doc().await
    }

    /// Call a whitelisted method by alias
    pub async fn call(&self, alias: &str, args: Value) -> PressResult<Value> {
        self.resource.call(alias, args).await
    }

    pub async fn get_team_members(&self) -> PressResult<Vec<TeamMember>> {
        let members = self.call("getTeamMembers", json!({})).await?;
        if members.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(members)?)
    }

    pub async fn invite_team_member(&self, email: &str) -> PressResult<Value> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(validation_error!(
                format!("'{}' is not an email address", email),
                "email",
                "team_resource"
            ));
        }
        self.call("inviteTeamMember", json!({ "email": email })).await
    }

    pub async fn remove_team_member(&self, member: &str) -> PressResult<Value> {
        let member = member.trim();
        if member.is_empty() {
            return Err(validation_error!(
                "Member to remove must not be empty",
                "member",
                "team_resource"
            ));
        }
        self.call("removeTeamMember", json!({ "member": member }))
            .await
    }
}
