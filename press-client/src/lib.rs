//! Press Client - remote access to the press/Frappe method API
//!
//! - [`api`]: the [`PressApi`] trait and its HTTP implementation [`FrappeClient`]
//! - [`resource`]: client-side handles bound to one remote document

pub mod api;
pub mod resource;

pub use api::{
    ApiClientConfig, FrappeClient, PressApi, CAN_SWITCH_TO_TEAM, GET_DOC, GET_SITE_COUNT,
    RUN_DOC_METHOD,
};
pub use resource::DocumentResource;
