//! The page surface the pipeline writes to.
//!
//! [`ViewBinding`] is the only way the reducer and the renderer touch the
//! page. [`MemoryView`] is an in-memory document used by tests and the CLI.

use crate::alert::{AlertId, Severity};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Addressable elements of the lead capture page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// The submission form, also the anchor alerts are inserted before
    Form,
    /// Email input field
    EmailInput,
    /// Container for loading indicator and result content
    ResultsPanel,
    /// Spinner shown while a request is in flight
    LoadingIndicator,
    /// Result content area
    ResultContent,
    /// Company display name
    CompanyName,
    /// Link to the company website
    WebsiteLink,
    /// Link to the company profile
    ProfileLink,
    /// List of talking points
    TopicList,
}

impl Slot {
    /// Every slot, in page order
    pub const ALL: [Self; 9] = [
        Self::Form,
        Self::EmailInput,
        Self::ResultsPanel,
        Self::LoadingIndicator,
        Self::ResultContent,
        Self::CompanyName,
        Self::WebsiteLink,
        Self::ProfileLink,
        Self::TopicList,
    ];

    /// Element id in the page markup
    #[must_use]
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::Form => "emailForm",
            Self::EmailInput => "email",
            Self::ResultsPanel => "results",
            Self::LoadingIndicator => "loading",
            Self::ResultContent => "analysisResult",
            Self::CompanyName => "companyName",
            Self::WebsiteLink => "companyWebsite",
            Self::ProfileLink => "linkedinLink",
            Self::TopicList => "topicsList",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// An inline notification element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertElement {
    /// Identity used by later fade/remove calls
    pub id: AlertId,
    /// Severity, rendered as the CSS class
    pub severity: Severity,
    /// Plain-text message
    pub message: String,
    /// Whether the fade-out has started
    pub fading: bool,
}

impl AlertElement {
    /// A fresh, fully visible alert
    #[must_use]
    pub fn new(id: AlertId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id,
            severity,
            message: message.into(),
            fading: false,
        }
    }

    /// CSS class list, e.g. `alert alert-error`
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("alert alert-{}", self.severity)
    }
}

/// Capability to read and mutate the page.
///
/// Methods take `&self`; implementations use interior mutability so one
/// binding can be shared between the reducer and its observers. Operations
/// on a slot the page does not contain are no-ops.
pub trait ViewBinding: Send + Sync {
    /// Whether the page contains `slot`
    fn contains(&self, slot: Slot) -> bool;

    /// Current value of an input slot
    fn value(&self, slot: Slot) -> String;

    /// Set the value of an input slot
    fn set_value(&self, slot: Slot, value: &str);

    /// Replace the plain-text content of `slot`
    fn set_text(&self, slot: Slot, text: &str);

    /// Set or clear the href of a link slot
    fn set_href(&self, slot: Slot, href: Option<&str>);

    /// Show or hide `slot`
    fn set_visible(&self, slot: Slot, visible: bool);

    /// Replace the items of a list slot, one plain-text item each
    fn replace_items(&self, slot: Slot, items: &[String]);

    /// Smooth-scroll `slot` into view
    fn scroll_into_view(&self, slot: Slot);

    /// Insert `alert` immediately before `anchor`
    fn insert_alert_before(&self, anchor: Slot, alert: AlertElement);

    /// Start fading the alert; returns whether it was present
    fn fade_alert(&self, id: AlertId) -> bool;

    /// Remove the alert; returns whether it was present
    fn remove_alert(&self, id: AlertId) -> bool;
}

#[derive(Debug, Clone, Default)]
struct Element {
    text: String,
    href: Option<String>,
    visible: bool,
    items: Vec<String>,
}

#[derive(Debug, Default)]
struct Document {
    elements: HashMap<Slot, Element>,
    alerts: Vec<AlertElement>,
    scrolls: Vec<Slot>,
}

/// In-memory page.
///
/// Starts out like the page markup: results panel, loading indicator and
/// result content hidden, everything else visible.
#[derive(Debug)]
pub struct MemoryView {
    document: Mutex<Document>,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryView {
    /// A page containing every slot
    #[must_use]
    pub fn new() -> Self {
        Self::with_slots(Slot::ALL)
    }

    /// A page containing every slot except `missing`
    #[must_use]
    pub fn without(missing: Slot) -> Self {
        Self::with_slots(Slot::ALL.into_iter().filter(|slot| *slot != missing))
    }

    fn with_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        let elements = slots
            .into_iter()
            .map(|slot| {
                let visible = !matches!(
                    slot,
                    Slot::ResultsPanel | Slot::LoadingIndicator | Slot::ResultContent
                );
                (
                    slot,
                    Element {
                        visible,
                        ..Element::default()
                    },
                )
            })
            .collect();

        Self {
            document: Mutex::new(Document {
                elements,
                ..Document::default()
            }),
        }
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, slot: Slot, f: impl FnOnce(&Element) -> T) -> Option<T> {
        self.document().elements.get(&slot).map(f)
    }

    fn write(&self, slot: Slot, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.document().elements.get_mut(&slot) {
            f(element);
        }
    }

    /// Text (or input value) of `slot`
    #[must_use]
    pub fn text(&self, slot: Slot) -> String {
        self.read(slot, |e| e.text.clone()).unwrap_or_default()
    }

    /// Href of `slot`, if set
    #[must_use]
    pub fn href(&self, slot: Slot) -> Option<String> {
        self.read(slot, |e| e.href.clone()).flatten()
    }

    /// Whether `slot` is present and visible
    #[must_use]
    pub fn is_visible(&self, slot: Slot) -> bool {
        self.read(slot, |e| e.visible).unwrap_or(false)
    }

    /// List items of `slot`
    #[must_use]
    pub fn items(&self, slot: Slot) -> Vec<String> {
        self.read(slot, |e| e.items.clone()).unwrap_or_default()
    }

    /// Alerts currently in the page, in document order
    #[must_use]
    pub fn alerts(&self) -> Vec<AlertElement> {
        self.document().alerts.clone()
    }

    /// Every scroll request so far
    #[must_use]
    pub fn scrolls(&self) -> Vec<Slot> {
        self.document().scrolls.clone()
    }
}

impl ViewBinding for MemoryView {
    fn contains(&self, slot: Slot) -> bool {
        self.document().elements.contains_key(&slot)
    }

    fn value(&self, slot: Slot) -> String {
        self.text(slot)
    }

    fn set_value(&self, slot: Slot, value: &str) {
        self.set_text(slot, value);
    }

    fn set_text(&self, slot: Slot, text: &str) {
        self.write(slot, |e| text.clone_into(&mut e.text));
    }

    fn set_href(&self, slot: Slot, href: Option<&str>) {
        self.write(slot, |e| e.href = href.map(str::to_string));
    }

    fn set_visible(&self, slot: Slot, visible: bool) {
        self.write(slot, |e| e.visible = visible);
    }

    fn replace_items(&self, slot: Slot, items: &[String]) {
        self.write(slot, |e| e.items = items.to_vec());
    }

    fn scroll_into_view(&self, slot: Slot) {
        let mut document = self.document();
        if document.elements.contains_key(&slot) {
            document.scrolls.push(slot);
        }
    }

    fn insert_alert_before(&self, anchor: Slot, alert: AlertElement) {
        let mut document = self.document();
        if document.elements.contains_key(&anchor) {
            document.alerts.push(alert);
        }
    }

    fn fade_alert(&self, id: AlertId) -> bool {
        let mut document = self.document();
        match document.alerts.iter_mut().find(|alert| alert.id == id) {
            Some(alert) => {
                alert.fading = true;
                true
            },
            None => false,
        }
    }

    fn remove_alert(&self, id: AlertId) -> bool {
        let mut document = self.document();
        let before = document.alerts.len();
        document.alerts.retain(|alert| alert.id != id);
        document.alerts.len() != before
    }
}

impl fmt::Display for MemoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.document();
        let shown = |slot: Slot| document.elements.get(&slot).is_some_and(|e| e.visible);
        let text = |slot: Slot| {
            document
                .elements
                .get(&slot)
                .map_or("", |e| e.text.as_str())
        };

        for alert in &document.alerts {
            let fading = if alert.fading { " (fading)" } else { "" };
            writeln!(f, "[{}] {}{fading}", alert.class_name(), alert.message)?;
        }

        writeln!(f, "{}: {}", Slot::EmailInput, text(Slot::EmailInput))?;

        if !shown(Slot::ResultsPanel) {
            return writeln!(f, "{}: hidden", Slot::ResultsPanel);
        }
        if shown(Slot::LoadingIndicator) {
            writeln!(f, "{}: analyzing...", Slot::LoadingIndicator)?;
        }
        if !shown(Slot::ResultContent) {
            return Ok(());
        }

        writeln!(f, "{}: {}", Slot::CompanyName, text(Slot::CompanyName))?;
        for slot in [Slot::WebsiteLink, Slot::ProfileLink] {
            let href = document
                .elements
                .get(&slot)
                .and_then(|e| e.href.as_deref())
                .filter(|_| shown(slot));
            match href {
                Some(href) => writeln!(f, "{slot}: {href}")?,
                None => writeln!(f, "{slot}: (hidden)")?,
            }
        }
        writeln!(f, "{}:", Slot::TopicList)?;
        if let Some(list) = document.elements.get(&Slot::TopicList) {
            for item in &list.items {
                writeln!(f, "  - {item}")?;
            }
        }
        Ok(())
    }
}
