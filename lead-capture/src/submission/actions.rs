//! Actions for the submission controller.

use crate::alert::{AlertId, Severity};
use crate::error::AnalysisError;
use crate::submission::types::RequestId;
use crate::types::AnalysisResponse;

/// Inputs to the submission reducer.
///
/// `Submit` and `ShowAlert` come from the page; the rest are fed back by
/// effects (the analysis call and the alert timer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionAction {
    /// The visitor submitted the form
    Submit,

    /// The analysis call returned a payload
    AnalysisSucceeded {
        /// Request this answers
        request: RequestId,
        /// Parsed payload
        response: AnalysisResponse,
    },

    /// The analysis call failed
    AnalysisFailed {
        /// Request this answers
        request: RequestId,
        /// What went wrong
        error: AnalysisError,
    },

    /// Show an alert outside the request lifecycle
    ShowAlert {
        /// Message text
        message: String,
        /// Severity
        severity: Severity,
    },

    /// An alert's display time is over
    AlertFadeElapsed {
        /// Alert that scheduled the timer
        alert: AlertId,
    },

    /// An alert finished fading
    AlertRemovalElapsed {
        /// Alert that scheduled the timer
        alert: AlertId,
    },
}

impl SubmissionAction {
    /// Whether this action ends a request
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AnalysisSucceeded { .. } | Self::AnalysisFailed { .. }
        )
    }

    /// Request this action answers, if any
    #[must_use]
    pub const fn request(&self) -> Option<RequestId> {
        match self {
            Self::AnalysisSucceeded { request, .. } | Self::AnalysisFailed { request, .. } => {
                Some(*request)
            },
            _ => None,
        }
    }
}
