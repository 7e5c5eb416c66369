//! Shared fixtures for press-session integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use press_client::PressApi;
use press_core::{ErrorContext, PressError, PressResult, TeamBootstrap};
use press_session::{KeyValueStore, MemoryStore, RecordingNavigator, SessionCookies, TeamContext};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Canned answer for one server method
#[derive(Clone)]
pub enum Reply {
    Message(Value),
    Unreachable,
    Status(u16),
}

/// In-process stand-in for the server
#[derive(Default)]
pub struct ScriptedApi {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(method.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PressApi for ScriptedApi {
    async fn call_method(&self, method: &str, params: Value) -> PressResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        let reply = self.replies.lock().unwrap().get(method).cloned();
        match reply {
            Some(Reply::Message(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(PressError::Server {
                status,
                message: "scripted failure".to_string(),
                exc_type: None,
                context: ErrorContext::new("scripted_api"),
            }),
            Some(Reply::Unreachable) | None => Err(PressError::Network {
                message: format!("no route to {}", method),
                source: None,
                context: ErrorContext::new("scripted_api"),
            }),
        }
    }
}

/// Memory store that counts accesses
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn with_team(team: &str) -> Self {
        Self {
            inner: MemoryStore::with_entries([("current_team", team)]),
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn current_team(&self) -> Option<String> {
        self.inner.get("current_team").unwrap()
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> PressResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> PressResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> PressResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

pub const LOGGED_IN: &str = "sid=abc123; user_id=jane%40example.com";

pub struct Fixture {
    pub context: TeamContext,
    pub store: Arc<CountingStore>,
    pub api: Arc<ScriptedApi>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn fixture(
    bootstrap: TeamBootstrap,
    cookies: &str,
    store: CountingStore,
    api: ScriptedApi,
) -> Fixture {
    let store = Arc::new(store);
    let api = Arc::new(api);
    let navigator = Arc::new(RecordingNavigator::new());
    let context = TeamContext::new(
        bootstrap,
        SessionCookies::parse(cookies),
        store.clone(),
        api.clone(),
        navigator.clone(),
    );
    Fixture {
        context,
        store,
        api,
        navigator,
    }
}
