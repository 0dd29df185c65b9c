//! Wire types exchanged with the analysis endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze-email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Trimmed, non-empty email address
    pub email: String,
}

impl AnalysisRequest {
    /// Build a request from raw form input.
    ///
    /// Returns `None` when the input is empty after trimming. No other
    /// format validation is done here; the endpoint owns that.
    #[must_use]
    pub fn from_input(raw: &str) -> Option<Self> {
        let email = raw.trim();
        if email.is_empty() {
            None
        } else {
            Some(Self {
                email: email.to_string(),
            })
        }
    }
}

/// Successful analysis payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Company domain, possibly with a scheme (e.g. `acme.io` or `https://acme.io`)
    pub company_domain: String,

    /// Company profile URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,

    /// Talking points separated by `|`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheat_sheet_bullets: Option<String>,
}

impl AnalysisResponse {
    /// Create a response carrying only a domain
    #[must_use]
    pub fn for_domain(company_domain: impl Into<String>) -> Self {
        Self {
            company_domain: company_domain.into(),
            linkedin_profile: None,
            cheat_sheet_bullets: None,
        }
    }

    /// Set the profile URL
    #[must_use]
    pub fn with_linkedin_profile(mut self, url: impl Into<String>) -> Self {
        self.linkedin_profile = Some(url.into());
        self
    }

    /// Set the raw bullet string
    #[must_use]
    pub fn with_bullets(mut self, bullets: impl Into<String>) -> Self {
        self.cheat_sheet_bullets = Some(bullets.into());
        self
    }
}

/// Body returned alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisErrorBody {
    /// Human-readable reason, when the endpoint provides one
    #[serde(default)]
    pub error: Option<String>,
}
