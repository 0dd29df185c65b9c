//! State types for the submission controller.

use crate::alert::AlertState;
use crate::types::AnalysisResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sequence number of a submission.
///
/// Issued in increasing order, one per accepted submission. Used to
/// correlate responses in logs and to fence stale responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw sequence number.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// What the visitor currently sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    /// Nothing submitted yet
    #[default]
    Idle,

    /// A submission started and no response has been handled since
    ///
    /// Overlapping requests are not tracked here: without fencing the first
    /// response to resolve moves the page to `Success` or `Failed` while the
    /// others are still in flight, and the last one to resolve wins. Use
    /// [`SubmissionState::in_flight`] for the request count.
    Loading,

    /// The last handled response was rendered
    Success(AnalysisResponse),

    /// The last handled response failed with this message
    Failed(String),
}

/// Submission controller state.
///
/// Rebuilt per session; nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    /// Current UI state
    pub ui: UiState,

    /// Alert bookkeeping
    pub alerts: AlertState,

    last_request: u64,
    in_flight: BTreeMap<RequestId, DateTime<Utc>>,
}

impl SubmissionState {
    /// Create an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests awaiting a response.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Most recently issued request, if any.
    #[must_use]
    pub const fn latest_request(&self) -> Option<RequestId> {
        if self.last_request == 0 {
            None
        } else {
            Some(RequestId(self.last_request))
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Issue the next request id and record when it started.
    pub(crate) fn begin_request(&mut self, now: DateTime<Utc>) -> RequestId {
        self.last_request += 1;
        let id = RequestId(self.last_request);
        self.in_flight.insert(id, now);
        id
    }

    /// Mark `id` answered, returning when it started.
    pub(crate) fn finish_request(&mut self, id: RequestId) -> Option<DateTime<Utc>> {
        self.in_flight.remove(&id)
    }
}
