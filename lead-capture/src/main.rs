//! `lead-capture <email>`: submit one email and print the resulting page.
//!
//! Reads configuration from `LEAD_CAPTURE_*` variables and the cookie
//! header from `LEAD_CAPTURE_COOKIE`. Set `LEAD_CAPTURE_OFFLINE=true` to
//! render the canned demo payload without a running analysis service.

use anyhow::{Context, bail};
use lead_capture::client::{AnalysisClient, HttpAnalysisClient, ScriptedAnalysisClient};
use lead_capture::config::Config;
use lead_capture::cookie::CookieJar;
use lead_capture::submission::{
    SubmissionAction, SubmissionEnvironment, SubmissionReducer, SubmissionSettings,
    SubmissionState, UiState,
};
use lead_capture::view::{MemoryView, Slot, ViewBinding};
use lead_capture_core::environment::SystemClock;
use lead_capture_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const COOKIE_VAR: &str = "LEAD_CAPTURE_COOKIE";
const LOG_VAR: &str = "LEAD_CAPTURE_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_VAR)
                .unwrap_or_else(|_| "lead_capture=debug,lead_capture_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let Some(email) = std::env::args().nth(1) else {
        bail!("usage: lead-capture <email>");
    };

    let config = Config::from_env().context("loading configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let client: Arc<dyn AnalysisClient> = if config.offline {
        tracing::info!("Offline mode, serving demo payload");
        Arc::new(ScriptedAnalysisClient::demo())
    } else {
        Arc::new(HttpAnalysisClient::from_config(&config).context("building HTTP client")?)
    };

    let view = Arc::new(MemoryView::new());
    view.set_value(Slot::EmailInput, &email);

    let cookies = std::env::var(COOKIE_VAR).unwrap_or_default();
    let env = SubmissionEnvironment::new(
        view.clone(),
        Arc::new(CookieJar::new(cookies)),
        client,
        Arc::new(SystemClock),
    )
    .with_settings(SubmissionSettings::from_config(&config));

    let store = Store::new(SubmissionState::new(), SubmissionReducer::new(), env);

    // Validation failures never produce a terminal action; they only alert.
    if email.trim().is_empty() {
        store.send(SubmissionAction::Submit).await?;
    } else {
        store
            .send_and_wait_for(
                SubmissionAction::Submit,
                SubmissionAction::is_terminal,
                config.request_timeout() + Duration::from_secs(1),
            )
            .await
            .context("waiting for the analysis response")?;
    }

    print!("{view}");

    let ui = store.state(|s| s.ui.clone()).await;
    store.shutdown(Duration::from_secs(1)).await?;

    if let UiState::Failed(message) = ui {
        bail!("analysis failed: {message}");
    }
    Ok(())
}
