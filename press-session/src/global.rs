//! Process-wide entry point for callers that cannot be handed a context

use crate::context::{SwitchOutcome, TeamContext};
use press_core::{ErrorContext, PressError, PressResult};
use std::sync::{Arc, OnceLock};

static GLOBAL_CONTEXT: OnceLock<Arc<TeamContext>> = OnceLock::new();

/// Publish `context` for [`switch_to_team`]. The first install wins;
/// returns `false` if a context was already installed.
pub fn install(context: Arc<TeamContext>) -> bool {
    GLOBAL_CONTEXT.set(context).is_ok()
}

pub fn installed() -> Option<Arc<TeamContext>> {
    GLOBAL_CONTEXT.get().cloned()
}

/// [`TeamContext::switch_to_team`] on the installed context
pub async fn switch_to_team(team: &str) -> PressResult<SwitchOutcome> {
    let context = installed().ok_or_else(|| PressError::Config {
        message: "No team context installed".to_string(),
        source: None,
        context: ErrorContext::new("global")
            .with_operation("switch_to_team")
            .with_suggestion("Call press_session::global::install during startup"),
    })?;
    context.switch_to_team(team).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_without_installed_context() {
        assert!(installed().is_none());
        let result = tokio_test::block_on(switch_to_team("acme"));
        assert!(matches!(result, Err(PressError::Config { .. })));
    }
}
