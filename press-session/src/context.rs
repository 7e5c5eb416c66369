//! Team session context

use crate::cookie::SessionCookies;
use crate::navigation::Navigator;
use crate::resource::TeamResource;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use press_client::{ApiClientConfig, FrappeClient, PressApi};
use press_core::{ConsoleConfig, PressResult, TeamBootstrap, CURRENT_TEAM_KEY, LOGIN_PATH};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Result of [`TeamContext::switch_to_team`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The server allowed the switch; storage was updated and the session reset
    Switched,
    /// The server refused, or could not be asked. Nothing changed.
    Denied,
}

/// Per-session team state.
///
/// Holds the memoized [`TeamResource`] for the session. The slot is filled
/// by the first [`TeamContext::get_team`] call and only emptied by
/// [`TeamContext::reset`].
///
/// Teams the server approved through [`TeamContext::switch_to_team`] are
/// valid for the rest of the context's life, next to the bootstrap's
/// `valid_teams`.
pub struct TeamContext {
    bootstrap: TeamBootstrap,
    cookies: RwLock<SessionCookies>,
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn PressApi>,
    navigator: Arc<dyn Navigator>,
    approved: RwLock<HashSet<String>>,
    team: Mutex<Option<Arc<TeamResource>>>,
}

impl TeamContext {
    pub fn new(
        bootstrap: TeamBootstrap,
        cookies: SessionCookies,
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn PressApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            bootstrap,
            cookies: RwLock::new(cookies),
            store,
            api,
            navigator,
            approved: RwLock::new(HashSet::new()),
            team: Mutex::new(None),
        }
    }

    /// Wire a context from configuration: HTTP client from `[server]`, file
    /// store when `session.storage_path` is set, cookies from `server.cookie`
    pub fn from_config(config: &ConsoleConfig, navigator: Arc<dyn Navigator>) -> PressResult<Self> {
        let api = FrappeClient::new(ApiClientConfig::from_server_config(&config.server))?;

        let store: Arc<dyn KeyValueStore> = match &config.session.storage_path {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };

        let cookies = config
            .server
            .cookie
            .as_deref()
            .map(SessionCookies::parse)
            .unwrap_or_default();

        Ok(Self::new(
            config.session.bootstrap.clone(),
            cookies,
            store,
            Arc::new(api),
            navigator,
        ))
    }

    pub fn bootstrap(&self) -> &TeamBootstrap {
        &self.bootstrap
    }

    /// Replace the cookie snapshot, e.g. after the host logged in again
    pub fn set_cookies(&self, cookies: SessionCookies) {
        *self.cookies.write().unwrap_or_else(PoisonError::into_inner) = cookies;
    }

    /// Resolve the team this session works for.
    ///
    /// Anonymous sessions are redirected to the login page and get `None`
    /// without storage being touched. Otherwise the stored team is used if
    /// the host vouches for it, falling back to the default team (which is
    /// then written back). Storage failures are logged, never returned.
    pub fn get_current_team(&self) -> Option<String> {
        let authenticated = self
            .cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated();
        if !authenticated {
            debug!("No logged-in user, redirecting to {}", LOGIN_PATH);
            self.navigator.redirect(LOGIN_PATH);
            return None;
        }

        let stored = match self.store.get(CURRENT_TEAM_KEY) {
            Ok(stored) => stored.filter(|team| !team.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read {}", CURRENT_TEAM_KEY);
                None
            }
        };

        if let Some(team) = stored {
            if self.accepts(&team) {
                return Some(team);
            }
            debug!(team = %team, "Stored team is not valid for this user");
        }

        let default_team = self.bootstrap.default_team()?.to_string();
        if let Err(e) = self.store.set(CURRENT_TEAM_KEY, &default_team) {
            warn!(error = %e, "Could not persist {}", CURRENT_TEAM_KEY);
        }
        Some(default_team)
    }

    /// The session's team handle, built on first use.
    ///
    /// Later calls return the same handle even if the stored team changed
    /// meanwhile; only [`TeamContext::reset`] drops it.
    pub fn get_team(&self) -> Arc<TeamResource> {
        if let Some(team) = self.cached_team() {
            return team;
        }

        // Resolved outside the lock: it touches storage and the navigator
        let name = self.get_current_team();

        let mut slot = self.team.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(team) = slot.as_ref() {
            return Arc::clone(team);
        }
        info!(team = ?name, "Creating team resource");
        let team = Arc::new(TeamResource::new(Arc::clone(&self.api), name));
        *slot = Some(Arc::clone(&team));
        team
    }

    /// The memoized handle, if [`TeamContext::get_team`] has run
    pub fn cached_team(&self) -> Option<Arc<TeamResource>> {
        self.team
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switch the session to `team` if the server allows it.
    ///
    /// A failed permission check counts as a refusal. On success the team is
    /// stored, the session is reset and the host is asked to reload. Only a
    /// local storage failure is returned as an error.
    pub async fn switch_to_team(&self, team: &str) -> PressResult<SwitchOutcome> {
        let can_switch = match self.api.can_switch_to_team(team).await {
            Ok(can_switch) => can_switch,
            Err(e) => {
                error!(team, error = %e, "Team switch check failed");
                false
            }
        };

        if !can_switch {
            warn!(team, "Not allowed to switch team");
            return Ok(SwitchOutcome::Denied);
        }

        self.approved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(team.to_string());
        self.store.set(CURRENT_TEAM_KEY, team)?;
        info!(team, "Switched team");

        self.reset();
        self.navigator.reload();
        Ok(SwitchOutcome::Switched)
    }

    /// Whether `team` is down to exactly one site
    pub async fn is_last_site(&self, team: &str) -> PressResult<bool> {
        let count = self.api.get_site_count(team).await?;
        Ok(count == 1)
    }

    /// Whether `team` may be used as the current team
    fn accepts(&self, team: &str) -> bool {
        self.bootstrap.accepts(team)
            || self
                .approved
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(team)
    }

    /// Drop the memoized handle and resolve the team again.
    ///
    /// This is what a page reload does to the browser console's state.
    pub fn reset(&self) -> Option<String> {
        self.team
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.get_current_team()
    }
}

impl std::fmt::Debug for TeamContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamContext")
            .field("bootstrap", &self.bootstrap)
            .field("team", &self.cached_team().and_then(|t| t.name().map(String::from)))
            .finish()
    }
}
