//! Press Session - which team is this session working for
//!
//! [`TeamContext`] resolves the active team from local storage and the values
//! injected by the host, validates team switches with the server and hands
//! out one memoized [`TeamResource`] per session.
//!
//! ## Collaborators
//!
//! - [`KeyValueStore`]: persistent local storage (`current_team`)
//! - [`SessionCookies`]: the `user_id` cookie that marks a logged-in user
//! - [`Navigator`]: the host's redirect/reload primitives
//! - [`press_client::PressApi`]: the remote method API

pub mod context;
pub mod cookie;
pub mod global;
pub mod navigation;
pub mod resource;
pub mod storage;

pub use context::{SwitchOutcome, TeamContext};
pub use cookie::SessionCookies;
pub use navigation::{HeadlessNavigator, NavigationEvent, Navigator, RecordingNavigator};
pub use resource::{TeamMember, TeamResource, TEAM_METHODS};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
