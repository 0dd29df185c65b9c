//! Injected capabilities for the submission reducer.

use crate::alert::AlertPresenter;
use crate::client::AnalysisClient;
use crate::config::Config;
use crate::cookie::TokenReader;
use crate::view::ViewBinding;
use lead_capture_core::environment::Clock;
use std::sync::Arc;

/// Behavioural knobs for the submission controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Cookie holding the CSRF token
    pub csrf_cookie: String,
    /// Drop responses from requests superseded by a later submission
    pub fence_stale_responses: bool,
    /// Alert timings
    pub alerts: AlertPresenter,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SubmissionSettings {
    /// Settings taken from `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            csrf_cookie: config.csrf_cookie.clone(),
            fence_stale_responses: config.fence_stale_responses,
            alerts: AlertPresenter::new(config.alert_fade(), config.alert_remove()),
        }
    }

    /// Enable or disable stale-response fencing
    #[must_use]
    pub fn fenced(mut self, fence: bool) -> Self {
        self.fence_stale_responses = fence;
        self
    }
}

/// Everything the submission reducer touches outside its own state.
///
/// Production wires a real page and HTTP client; tests use
/// [`MemoryView`](crate::view::MemoryView) and
/// [`ScriptedAnalysisClient`](crate::client::ScriptedAnalysisClient).
#[derive(Clone)]
pub struct SubmissionEnvironment {
    view: Arc<dyn ViewBinding>,
    tokens: Arc<dyn TokenReader>,
    client: Arc<dyn AnalysisClient>,
    clock: Arc<dyn Clock>,
    settings: SubmissionSettings,
}

impl SubmissionEnvironment {
    /// Environment with default settings
    #[must_use]
    pub fn new(
        view: Arc<dyn ViewBinding>,
        tokens: Arc<dyn TokenReader>,
        client: Arc<dyn AnalysisClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            view,
            tokens,
            client,
            clock,
            settings: SubmissionSettings::default(),
        }
    }

    /// Replace the settings
    #[must_use]
    pub fn with_settings(mut self, settings: SubmissionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Page surface
    #[must_use]
    pub fn view(&self) -> &dyn ViewBinding {
        self.view.as_ref()
    }

    /// Cookie store
    #[must_use]
    pub fn tokens(&self) -> &dyn TokenReader {
        self.tokens.as_ref()
    }

    /// Analysis client, shared with spawned effects
    #[must_use]
    pub const fn client(&self) -> &Arc<dyn AnalysisClient> {
        &self.client
    }

    /// Clock
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Settings
    #[must_use]
    pub const fn settings(&self) -> &SubmissionSettings {
        &self.settings
    }
}
