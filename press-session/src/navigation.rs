//! Host navigation primitives
//!
//! In a browser these are `location.href = ...` and `location.reload()`.
//! Other hosts decide what a redirect or a reload means for them.

use std::sync::{Mutex, PoisonError};
use tracing::info;

pub trait Navigator: Send + Sync {
    /// Send the user to `location`
    fn redirect(&self, location: &str);

    /// Start over with fresh in-memory state
    fn reload(&self);
}

/// Navigator for hosts without a page: it only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessNavigator;

impl Navigator for HeadlessNavigator {
    fn redirect(&self, location: &str) {
        info!(location, "Redirect requested");
    }

    fn reload(&self) {
        info!("Reload requested");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Redirect(String),
    Reload,
}

/// Navigator that remembers what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigationEvent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NavigationEvent::Redirect(location) => Some(location),
                NavigationEvent::Reload => None,
            })
            .collect()
    }

    pub fn reload_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == NavigationEvent::Reload)
            .count()
    }

    fn push(&self, event: NavigationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, location: &str) {
        self.push(NavigationEvent::Redirect(location.to_string()));
    }

    fn reload(&self) {
        self.push(NavigationEvent::Reload);
    }
}
