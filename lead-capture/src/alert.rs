//! Transient inline notifications.
//!
//! At most one alert is visible. Showing a new one removes the previous
//! alert and supersedes its timer: both the fade and the removal delay are
//! scheduled under [`ALERT_TIMER`], so the runtime aborts the older timer
//! before the new one starts. The fade timer hands the id to the removal
//! timer it schedules without being cancelled. A delayed action that still arrives for a
//! superseded alert finds a different [`AlertId`] in [`AlertState`] and is
//! ignored.

use crate::submission::SubmissionAction;
use crate::view::{AlertElement, Slot, ViewBinding};
use lead_capture_core::effect::{Effect, EffectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Registration id of the alert fade/remove timer
pub const ALERT_TIMER: EffectId = EffectId::new("alert-timer");

/// Default delay before an alert starts fading
pub const DEFAULT_FADE_AFTER: Duration = Duration::from_millis(5000);

/// Default delay between fading and removal
pub const DEFAULT_REMOVE_AFTER: Duration = Duration::from_millis(300);

/// Identity of a shown alert, increasing per alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertId(u64);

impl AlertId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information
    #[default]
    Info,
    /// Something worked
    Success,
    /// Something failed
    Error,
}

impl Severity {
    /// Lowercase name, as used in the CSS class
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of the visible alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    /// Fully shown
    Visible,
    /// Fade-out started, removal pending
    Fading,
}

/// The alert currently in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAlert {
    /// Alert identity
    pub id: AlertId,
    /// Severity
    pub severity: Severity,
    /// Message text
    pub message: String,
    /// Current phase
    pub phase: AlertPhase,
}

/// Alert bookkeeping held in the submission state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    last_id: u64,
    active: Option<ActiveAlert>,
}

impl AlertState {
    /// The alert currently shown, if any
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveAlert> {
        self.active.as_ref()
    }

    /// How many alerts have been shown
    #[must_use]
    pub const fn shown(&self) -> u64 {
        self.last_id
    }

    fn next_id(&mut self) -> AlertId {
        self.last_id += 1;
        AlertId(self.last_id)
    }

    fn current(&mut self, id: AlertId) -> Option<&mut ActiveAlert> {
        self.active.as_mut().filter(|alert| alert.id == id)
    }
}

/// Shows alerts and drives their timed dismissal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPresenter {
    fade_after: Duration,
    remove_after: Duration,
}

impl Default for AlertPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_AFTER, DEFAULT_REMOVE_AFTER)
    }
}

impl AlertPresenter {
    /// Presenter with custom timings
    #[must_use]
    pub const fn new(fade_after: Duration, remove_after: Duration) -> Self {
        Self {
            fade_after,
            remove_after,
        }
    }

    /// Delay before fading
    #[must_use]
    pub const fn fade_after(&self) -> Duration {
        self.fade_after
    }

    /// Delay between fading and removal
    #[must_use]
    pub const fn remove_after(&self) -> Duration {
        self.remove_after
    }

    /// Replace any displayed alert with a new one and schedule its fade
    ///
    /// When the page has no form to anchor the alert, nothing is inserted
    /// and no timer is scheduled.
    pub fn show(
        &self,
        state: &mut AlertState,
        view: &dyn ViewBinding,
        message: &str,
        severity: Severity,
    ) -> Effect<SubmissionAction> {
        if let Some(previous) = state.active.take() {
            view.remove_alert(previous.id);
        }

        if !view.contains(Slot::Form) {
            tracing::debug!(%severity, "No form anchor, alert dropped");
            return Effect::None;
        }

        let id = state.next_id();
        view.insert_alert_before(Slot::Form, AlertElement::new(id, severity, message));
        state.active = Some(ActiveAlert {
            id,
            severity,
            message: message.to_string(),
            phase: AlertPhase::Visible,
        });
        tracing::debug!(alert = %id, %severity, "Alert shown");

        Effect::delay(self.fade_after, SubmissionAction::AlertFadeElapsed { alert: id })
            .cancellable(ALERT_TIMER)
    }

    /// Start fading `id` and schedule its removal
    ///
    /// No-op unless `id` is the visible, not yet fading alert.
    pub fn fade(
        &self,
        state: &mut AlertState,
        view: &dyn ViewBinding,
        id: AlertId,
    ) -> Effect<SubmissionAction> {
        let Some(alert) = state.current(id).filter(|a| a.phase == AlertPhase::Visible) else {
            tracing::trace!(alert = %id, "Stale fade ignored");
            return Effect::None;
        };

        alert.phase = AlertPhase::Fading;
        view.fade_alert(id);

        Effect::delay(self.remove_after, SubmissionAction::AlertRemovalElapsed { alert: id })
            .cancellable(ALERT_TIMER)
    }

    /// Remove `id` from the page
    ///
    /// No-op unless `id` is the current alert. Returns whether it was removed.
    pub fn remove(&self, state: &mut AlertState, view: &dyn ViewBinding, id: AlertId) -> bool {
        if state.current(id).is_none() {
            tracing::trace!(alert = %id, "Stale removal ignored");
            return false;
        }

        state.active = None;
        view.remove_alert(id);
        tracing::debug!(alert = %id, "Alert removed");
        true
    }
}
