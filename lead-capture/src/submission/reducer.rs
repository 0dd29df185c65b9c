//! Reducer for the submission lifecycle.

use crate::alert::Severity;
use crate::error::AnalysisError;
use crate::render::render;
use crate::submission::{RequestId, SubmissionAction, SubmissionEnvironment, SubmissionState, UiState};
use crate::types::{AnalysisRequest, AnalysisResponse};
use crate::view::{Slot, ViewBinding};
use lead_capture_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Hides the loading indicator when dropped.
///
/// Held across response handling so the indicator is cleared on every
/// exit path, including a panic while rendering.
struct LoadingGuard<'a> {
    view: &'a dyn ViewBinding,
}

impl<'a> LoadingGuard<'a> {
    fn new(view: &'a dyn ViewBinding) -> Self {
        Self { view }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.view.set_visible(Slot::LoadingIndicator, false);
    }
}

/// Drives `Idle -> Loading -> {Success, Failed}`.
///
/// - `Submit` validates the email, reveals the loading state and emits the
///   analysis call as an `Effect::Future`
/// - `AnalysisSucceeded` renders the payload
/// - `AnalysisFailed` shows an error alert and hides the results panel
/// - alert actions are delegated to the [`AlertPresenter`](crate::alert::AlertPresenter)
///
/// Requests are never de-duplicated or cancelled. Without fencing, the
/// response that resolves last is what the page shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionReducer;

impl SubmissionReducer {
    /// Create a new submission reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn submit(
        state: &mut SubmissionState,
        env: &SubmissionEnvironment,
    ) -> SmallVec<[Effect<SubmissionAction>; 4]> {
        let view = env.view();
        let settings = env.settings();

        let Some(request) = AnalysisRequest::from_input(&view.value(Slot::EmailInput)) else {
            tracing::warn!("Submission rejected: email is empty");
            let message = AnalysisError::Validation.user_message();
            return smallvec![settings.alerts.show(&mut state.alerts, view, message, Severity::Error)];
        };

        let id = state.begin_request(env.clock().now());
        state.ui = UiState::Loading;

        view.set_visible(Slot::ResultsPanel, true);
        view.set_visible(Slot::LoadingIndicator, true);
        view.set_visible(Slot::ResultContent, false);

        let csrf_token = env.tokens().token(&settings.csrf_cookie).unwrap_or_default();
        if csrf_token.is_empty() {
            tracing::debug!(request = %id, cookie = %settings.csrf_cookie, "No CSRF token, sending empty header");
        }
        tracing::debug!(request = %id, in_flight = state.in_flight(), "Analysis requested");

        let client = Arc::clone(env.client());
        smallvec![Effect::Future(Box::pin(async move {
            let action = match client.analyze(request, csrf_token).await {
                Ok(response) => SubmissionAction::AnalysisSucceeded {
                    request: id,
                    response,
                },
                Err(error) => SubmissionAction::AnalysisFailed { request: id, error },
            };
            Some(action)
        }))]
    }

    fn complete(
        state: &mut SubmissionState,
        env: &SubmissionEnvironment,
        id: RequestId,
        outcome: Result<AnalysisResponse, AnalysisError>,
    ) -> SmallVec<[Effect<SubmissionAction>; 4]> {
        let started = state.finish_request(id);

        if env.settings().fence_stale_responses && state.latest_request() != Some(id) {
            tracing::warn!(
                request = %id,
                latest = ?state.latest_request(),
                "Stale response dropped"
            );
            return smallvec![Effect::None];
        }

        let view = env.view();
        let _loading = LoadingGuard::new(view);
        let latency_ms = started.map(|at| (env.clock().now() - at).num_milliseconds());

        match outcome {
            Ok(response) => {
                let rendered = render(view, &response);
                tracing::info!(
                    request = %id,
                    company = %rendered.company_name,
                    topics = rendered.topics.len(),
                    latency_ms,
                    "Analysis rendered"
                );
                state.ui = UiState::Success(response);
                smallvec![Effect::None]
            },
            Err(error) => {
                tracing::error!(
                    request = %id,
                    kind = error.kind(),
                    %error,
                    latency_ms,
                    "Analysis failed"
                );
                let message = error.user_message().to_string();
                let alert = env
                    .settings()
                    .alerts
                    .show(&mut state.alerts, view, &message, Severity::Error);
                view.set_visible(Slot::ResultsPanel, false);
                state.ui = UiState::Failed(message);
                smallvec![alert]
            },
        }
    }
}

impl Reducer for SubmissionReducer {
    type State = SubmissionState;
    type Action = SubmissionAction;
    type Environment = SubmissionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let alerts = &env.settings().alerts;

        match action {
            SubmissionAction::Submit => Self::submit(state, env),

            SubmissionAction::AnalysisSucceeded { request, response } => {
                Self::complete(state, env, request, Ok(response))
            },

            SubmissionAction::AnalysisFailed { request, error } => {
                Self::complete(state, env, request, Err(error))
            },

            SubmissionAction::ShowAlert { message, severity } => {
                smallvec![alerts.show(&mut state.alerts, env.view(), &message, severity)]
            },

            SubmissionAction::AlertFadeElapsed { alert } => {
                smallvec![alerts.fade(&mut state.alerts, env.view(), alert)]
            },

            SubmissionAction::AlertRemovalElapsed { alert } => {
                alerts.remove(&mut state.alerts, env.view(), alert);
                smallvec![Effect::None]
            },
        }
    }
}
