//! Read-only access to the ambient cookie store.

/// Source of named tokens (the CSRF cookie in practice).
///
/// Implementations must not mutate the underlying store.
pub trait TokenReader: Send + Sync {
    /// Value stored under `name`, or `None` when absent
    fn token(&self, name: &str) -> Option<String>;
}

/// Look up `name` in a `"; "`-separated cookie header.
///
/// Only an exact name match is returned; `xcsrf_token=...` does not match
/// `csrf_token`. With duplicated names the first occurrence wins.
///
/// # Examples
///
/// ```
/// use lead_capture::cookie::cookie_value;
///
/// let header = "theme=dark; csrf_token=abc123; csrf_token=later";
/// assert_eq!(cookie_value(header, "csrf_token"), Some("abc123"));
/// assert_eq!(cookie_value(header, "session"), None);
/// ```
#[must_use]
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }

    cookies
        .split(';')
        .map(str::trim_start)
        .filter_map(|pair| pair.split_once('='))
        .find_map(|(key, value)| (key == name).then_some(value))
}

/// A cookie store captured from a `Cookie` header string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    header: String,
}

impl CookieJar {
    /// Capture the given cookie header
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    /// The raw header
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }
}

impl TokenReader for CookieJar {
    fn token(&self, name: &str) -> Option<String> {
        cookie_value(&self.header, name).map(str::to_string)
    }
}
