//! The submission controller.
//!
//! Owns the request lifecycle of the lead capture form:
//!
//! ```text
//! Idle ──Submit──► Loading ──AnalysisSucceeded──► Success
//!   ▲                 │
//!   │                 └──AnalysisFailed─────────► Failed
//!   └──────────── next Submit from any state ◄──────┘
//! ```
//!
//! Validation failures never leave the current state. Each accepted
//! submission issues exactly one request; overlapping requests all run to
//! completion and every completion hides the loading indicator.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod types;

pub use actions::SubmissionAction;
pub use environment::{SubmissionEnvironment, SubmissionSettings};
pub use reducer::SubmissionReducer;
pub use types::{RequestId, SubmissionState, UiState};
