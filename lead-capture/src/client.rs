//! Clients for the analysis endpoint.

use crate::config::Config;
use crate::error::AnalysisError;
use crate::normalize::extract_json_object;
use crate::types::{AnalysisErrorBody, AnalysisRequest, AnalysisResponse};
use reqwest::Client;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Header carrying the CSRF token
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Future returned by [`AnalysisClient::analyze`]
pub type AnalysisFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AnalysisResponse, AnalysisError>> + Send + 'a>>;

/// Sends one analysis request
///
/// `csrf_token` is sent verbatim, empty when the cookie was missing.
pub trait AnalysisClient: Send + Sync {
    /// Analyze `request`
    fn analyze(&self, request: AnalysisRequest, csrf_token: String) -> AnalysisFuture<'_>;
}

/// HTTP client for `POST /api/analyze-email`
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    url: String,
    lenient: bool,
}

impl HttpAnalysisClient {
    /// Client for the given endpoint URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            lenient: false,
        }
    }

    /// Client configured from `config`
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Transport`] if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.analyze_url(),
            lenient: config.lenient_json,
        })
    }

    /// Recover JSON wrapped in surrounding text when the strict parse fails
    #[must_use]
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(
        &self,
        request: AnalysisRequest,
        csrf_token: String,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let response = self
            .client
            .post(&self.url)
            .header(CSRF_HEADER, csrf_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AnalysisErrorBody>(&body)
                .ok()
                .and_then(|body| body.error);
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                message,
            });
        }

        self.parse(&body)
    }

    fn parse(&self, body: &str) -> Result<AnalysisResponse, AnalysisError> {
        match serde_json::from_str(body) {
            Ok(response) => Ok(response),
            Err(strict) if self.lenient => extract_json_object(body)
                .and_then(|object| serde_json::from_str(object).ok())
                .ok_or_else(|| AnalysisError::Parse(strict.to_string())),
            Err(e) => Err(AnalysisError::Parse(e.to_string())),
        }
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn analyze(&self, request: AnalysisRequest, csrf_token: String) -> AnalysisFuture<'_> {
        Box::pin(self.post(request, csrf_token))
    }
}

/// Outcome replayed by [`ScriptedAnalysisClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedReply {
    /// Simulated latency
    pub latency: Duration,
    /// Result to return
    pub outcome: Result<AnalysisResponse, AnalysisError>,
}

impl ScriptedReply {
    /// Immediate success
    #[must_use]
    pub const fn success(response: AnalysisResponse) -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: Ok(response),
        }
    }

    /// Immediate failure
    #[must_use]
    pub const fn failure(error: AnalysisError) -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: Err(error),
        }
    }

    /// Delay the reply by `latency`
    #[must_use]
    pub fn after(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// A request seen by [`ScriptedAnalysisClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request body
    pub request: AnalysisRequest,
    /// CSRF header value
    pub csrf_token: String,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<ScriptedReply>,
    fallback: Option<ScriptedReply>,
    requests: Vec<RecordedRequest>,
}

/// In-process client replaying scripted replies in order
///
/// Once the queue is empty every call gets the fallback reply, or a
/// transport error when none is set.
#[derive(Debug, Default)]
pub struct ScriptedAnalysisClient {
    script: Mutex<Script>,
}

impl ScriptedAnalysisClient {
    /// Client with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that answers every call with `reply`
    #[must_use]
    pub fn always(reply: ScriptedReply) -> Self {
        let client = Self::new();
        client.script().fallback = Some(reply);
        client
    }

    /// Client serving [`demo_response`] after a short delay
    #[must_use]
    pub fn demo() -> Self {
        Self::always(ScriptedReply::success(demo_response()).after(Duration::from_millis(250)))
    }

    /// Queue a reply
    #[must_use]
    pub fn then(self, reply: ScriptedReply) -> Self {
        self.script().replies.push_back(reply);
        self
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script().requests.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, request: AnalysisRequest, csrf_token: String) -> ScriptedReply {
        let mut script = self.script();
        script.requests.push(RecordedRequest {
            request,
            csrf_token,
        });
        script
            .replies
            .pop_front()
            .or_else(|| script.fallback.clone())
            .unwrap_or_else(|| {
                ScriptedReply::failure(AnalysisError::Transport("no scripted reply".to_string()))
            })
    }
}

impl AnalysisClient for ScriptedAnalysisClient {
    fn analyze(&self, request: AnalysisRequest, csrf_token: String) -> AnalysisFuture<'_> {
        let reply = self.next_reply(request, csrf_token);
        Box::pin(async move {
            if !reply.latency.is_zero() {
                tokio::time::sleep(reply.latency).await;
            }
            reply.outcome
        })
    }
}

/// Canned payload served in offline mode
#[must_use]
pub fn demo_response() -> AnalysisResponse {
    AnalysisResponse::for_domain("www.example-labs.io")
        .with_linkedin_profile("https://www.linkedin.com/company/example-labs")
        .with_bullets(
            "Series B developer tooling company|Recently expanded to \"EMEA, APAC\"\
             |Hiring platform engineers|Uses a usage-based pricing model",
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_recovers_wrapped_object() {
        let client = HttpAnalysisClient::new("http://localhost").lenient(true);
        let response = client
            .parse("Here you go:\n{\"company_domain\":\"acme.io\"}\nThanks")
            .unwrap();
        assert_eq!(response.company_domain, "acme.io");
    }

    #[test]
    fn strict_parse_rejects_wrapped_object() {
        let client = HttpAnalysisClient::new("http://localhost");
        let error = client
            .parse("Here you go: {\"company_domain\":\"acme.io\"}")
            .unwrap_err();
        assert_eq!(error.kind(), "parse");
    }

    #[test]
    fn from_config_targets_analyze_url() {
        let client = HttpAnalysisClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.url(), "http://localhost:5000/api/analyze-email");
    }

    #[tokio::test]
    async fn scripted_replies_in_order_then_fallback() {
        let client = ScriptedAnalysisClient::always(ScriptedReply::failure(AnalysisError::Parse(
            "late".into(),
        )))
        .then(ScriptedReply::success(AnalysisResponse::for_domain("a.io")));

        let request = AnalysisRequest::from_input("a@a.io").unwrap();
        let first = client.analyze(request.clone(), "t".into()).await;
        let second = client.analyze(request.clone(), String::new()).await;

        assert_eq!(first.unwrap().company_domain, "a.io");
        assert!(matches!(second, Err(AnalysisError::Parse(_))));

        let seen = client.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].csrf_token, "t");
        assert_eq!(seen[1].csrf_token, "");
    }

    #[tokio::test]
    async fn empty_script_is_a_transport_error() {
        let client = ScriptedAnalysisClient::new();
        let result = client
            .analyze(AnalysisRequest::from_input("a@b.c").unwrap(), String::new())
            .await;
        assert!(matches!(result, Err(AnalysisError::Transport(_))));
    }

    #[test]
    fn demo_payload_has_quoted_bullet() {
        let topics = crate::render::topics(demo_response().cheat_sheet_bullets.as_deref());
        assert_eq!(topics.len(), 4);
        assert_eq!(topics[1], "Recently expanded to \"EMEA, APAC\"");
    }
}
