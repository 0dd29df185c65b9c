//! Counting log events in tests

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Counts events whose message equals a fixed string
///
/// Installed as the thread's default subscriber, so it sees every event
/// emitted by tasks on a current-thread test runtime.
///
/// # Example
///
/// ```
/// use lead_capture_testing::logs::EventCounter;
///
/// let counter = EventCounter::new("Cancelling effect");
/// let _guard = counter.install();
///
/// tracing::debug!("Cancelling effect");
/// tracing::debug!("Something else");
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct EventCounter {
    message: &'static str,
    count: Arc<AtomicUsize>,
}

impl EventCounter {
    /// Count events logged with exactly `message`
    #[must_use]
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make this counter the thread's default subscriber until the guard drops
    #[must_use]
    pub fn install(&self) -> DefaultGuard {
        tracing_subscriber::registry().with(self.clone()).set_default()
    }

    /// Matching events seen so far
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageVisitor(String::new());
        event.record(&mut message);
        if message.0 == self.message {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
