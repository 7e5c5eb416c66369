//! Shared types and well-known names

use serde::{Deserialize, Serialize};

/// Local storage key holding the selected team
pub const CURRENT_TEAM_KEY: &str = "current_team";

/// Cookie carrying the logged-in user
pub const USER_ID_COOKIE: &str = "user_id";

/// `user_id` value the server hands out to anonymous visitors
pub const GUEST_USER: &str = "Guest";

/// Where unauthenticated sessions are sent
pub const LOGIN_PATH: &str = "/login";

/// Doctype of the team document on the server
pub const TEAM_DOCTYPE: &str = "Team";

/// A team the current user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidTeam {
    pub name: String,
}

impl ValidTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Values the host page injects at load time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBootstrap {
    /// Team to fall back to; empty when the user has none
    #[serde(default)]
    pub default_team: String,
    /// Teams the user may select without being a system user
    #[serde(default)]
    pub valid_teams: Vec<ValidTeam>,
    /// System users may select any team
    #[serde(default)]
    pub is_system_user: bool,
}

impl TeamBootstrap {
    pub fn new(default_team: impl Into<String>) -> Self {
        Self {
            default_team: default_team.into(),
            ..Default::default()
        }
    }

    pub fn with_valid_team(mut self, name: impl Into<String>) -> Self {
        self.valid_teams.push(ValidTeam::new(name));
        self
    }

    pub fn with_system_user(mut self, is_system_user: bool) -> Self {
        self.is_system_user = is_system_user;
        self
    }

    /// Default team, or `None` when it is empty
    pub fn default_team(&self) -> Option<&str> {
        Some(self.default_team.as_str()).filter(|team| !team.is_empty())
    }

    /// Whether a stored team may be used as-is
    pub fn accepts(&self, team: &str) -> bool {
        team == self.default_team
            || self.valid_teams.iter().any(|valid| valid.name == team)
            || self.is_system_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        let bootstrap = TeamBootstrap::new("acme").with_valid_team("globex");
        assert!(bootstrap.accepts("acme"));
        assert!(bootstrap.accepts("globex"));
        assert!(!bootstrap.accepts("initech"));
        assert!(bootstrap.clone().with_system_user(true).accepts("initech"));
    }

    #[test]
    fn test_empty_default_team() {
        let bootstrap = TeamBootstrap::default();
        assert_eq!(bootstrap.default_team(), None);
        assert_eq!(TeamBootstrap::new("acme").default_team(), Some("acme"));
    }
}
