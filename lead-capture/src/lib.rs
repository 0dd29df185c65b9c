//! # Lead Capture
//!
//! The lead capture form pipeline: a visitor submits an email, the analysis
//! endpoint answers with company enrichment data, and the page renders it.
//!
//! ## Architecture
//!
//! ```text
//! Submit ──► SubmissionReducer ──► validate email
//!                 │                   │ empty ──► AlertPresenter (error)
//!                 │                   ▼
//!                 │             Loading state + Effect::Future(AnalysisClient)
//!                 │                   │
//!                 ◄── AnalysisSucceeded ──► render() ──► Normalizer
//!                 ◄── AnalysisFailed ─────► AlertPresenter, hide results
//!                 │
//!                 └── loading indicator hidden on every completion
//! ```
//!
//! All page access goes through [`view::ViewBinding`] and all cookie access
//! through [`cookie::TokenReader`], both injected via
//! [`submission::SubmissionEnvironment`]. The reducer and the normalizer are
//! therefore testable without a browser.
//!
//! ## Example
//!
//! ```no_run
//! use lead_capture::client::ScriptedAnalysisClient;
//! use lead_capture::cookie::CookieJar;
//! use lead_capture::submission::{
//!     SubmissionAction, SubmissionEnvironment, SubmissionReducer, SubmissionState,
//! };
//! use lead_capture::view::{MemoryView, Slot, ViewBinding};
//! use lead_capture_core::environment::SystemClock;
//! use lead_capture_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), lead_capture_runtime::StoreError> {
//! let view = Arc::new(MemoryView::new());
//! view.set_value(Slot::EmailInput, "jane@acme.io");
//!
//! let env = SubmissionEnvironment::new(
//!     view.clone(),
//!     Arc::new(CookieJar::new("csrf_token=abc123")),
//!     Arc::new(ScriptedAnalysisClient::demo()),
//!     Arc::new(SystemClock),
//! );
//! let store = Store::new(SubmissionState::default(), SubmissionReducer::new(), env);
//!
//! store.send(SubmissionAction::Submit).await?;
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod normalize;
pub mod render;
pub mod submission;
pub mod types;
pub mod view;

pub use alert::{AlertId, AlertPresenter, Severity};
pub use client::{AnalysisClient, HttpAnalysisClient, ScriptedAnalysisClient};
pub use config::Config;
pub use error::AnalysisError;
pub use types::{AnalysisRequest, AnalysisResponse};
