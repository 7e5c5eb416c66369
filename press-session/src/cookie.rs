//! Session cookie signal
//!
//! The server sets a readable `user_id` cookie next to the session id. Its
//! presence (and not being `Guest`) is the only login signal the client has.

use press_core::{GUEST_USER, USER_ID_COOKIE};
use std::collections::HashMap;

/// Parsed `Cookie` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    values: HashMap<String, String>,
}

impl SessionCookies {
    /// Parse a `name=value; name2=value2` cookie string.
    /// Values are percent-decoded; malformed pairs are skipped.
    pub fn parse(header: &str) -> Self {
        let values = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                let value = urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((name.to_string(), value))
            })
            .collect();

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The logged-in user, or `None` for anonymous sessions
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID_COOKIE)
            .filter(|user| !user.is_empty() && *user != GUEST_USER)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }
}

impl From<&str> for SessionCookies {
    fn from(header: &str) -> Self {
        Self::parse(header)
    }
}
