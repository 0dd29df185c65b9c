//! Text normalization for the analysis payload.
//!
//! Pure functions: no view or network access, so every rule here is covered
//! by unit tests and property tests.

/// Domain suffixes stripped by [`derive_company_name`].
///
/// Compound suffixes come first so that `acme.co.uk` loses `.co.uk` rather
/// than only `.uk`.
pub const RECOGNIZED_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "com.au", "com", "org", "net", "io", "ai", "co", "uk", "de", "fr", "it",
    "es", "nl", "se", "no", "fi", "dk", "pl", "be", "at", "ch",
];

const WWW_PREFIX: &str = "www.";

/// Derive a display name from a company domain.
///
/// Strips a leading `www.` and one trailing recognized suffix, splits the
/// rest on runs of non-alphanumeric characters and upper-cases the first
/// letter of each word. The remainder of each word is kept as-is, so
/// `"openAI.com"` becomes `"OpenAI"`.
///
/// # Examples
///
/// ```
/// use lead_capture::normalize::derive_company_name;
///
/// assert_eq!(derive_company_name("www.acme-corp.io"), "Acme Corp");
/// assert_eq!(derive_company_name("internal-tool"), "Internal Tool");
/// ```
#[must_use]
pub fn derive_company_name(domain: &str) -> String {
    let host = strip_scheme(domain.trim());
    let host = strip_prefix_ignore_case(host, WWW_PREFIX).unwrap_or(host);
    let stem = strip_recognized_suffix(host);

    stem.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a bullet string on `|`, honouring double-quoted spans.
///
/// A pipe splits only when an even number of `"` follows it on the rest of
/// the line, so pipes inside a balanced quoted span never split. With an
/// unmatched quote this parity rule is what decides, not the opening quote.
/// Segments are trimmed and empty segments dropped; quote characters and
/// backslashes are kept in the output.
///
/// # Examples
///
/// ```
/// use lead_capture::normalize::split_topics;
///
/// let topics = split_topics(r#"Fast onboarding|Handles "edge, cases"|Scales"#);
/// assert_eq!(topics, ["Fast onboarding", r#"Handles "edge, cases""#, "Scales"]);
/// ```
#[must_use]
pub fn split_topics(raw: &str) -> Vec<String> {
    let mut quotes_after = raw.matches('"').count();
    let mut topics = Vec::new();
    let mut start = 0;

    for (index, c) in raw.char_indices() {
        match c {
            '"' => quotes_after -= 1,
            '|' if quotes_after % 2 == 0 => {
                push_topic(&mut topics, &raw[start..index]);
                start = index + 1;
            },
            _ => {},
        }
    }
    push_topic(&mut topics, &raw[start..]);

    topics
}

/// Slice out the outermost `{...}` span of `text`.
///
/// Used to recover a JSON object wrapped in prose or code fences.
///
/// # Examples
///
/// ```
/// use lead_capture::normalize::extract_json_object;
///
/// assert_eq!(extract_json_object("Sure! {\"a\": 1} Done."), Some("{\"a\": 1}"));
/// assert_eq!(extract_json_object("no json here"), None);
/// ```
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn push_topic(topics: &mut Vec<String>, segment: &str) {
    let topic = segment.trim();
    if !topic.is_empty() {
        topics.push(topic.to_string());
    }
}

fn strip_scheme(domain: &str) -> &str {
    domain
        .split_once("://")
        .filter(|(scheme, _)| is_url_scheme(scheme))
        .map_or(domain, |(_, rest)| rest)
        .trim_end_matches('/')
}

/// Whether `scheme` matches `<alpha>[alnum+.-]*`
pub(crate) fn is_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn strip_recognized_suffix(host: &str) -> &str {
    for suffix in RECOGNIZED_SUFFIXES {
        let Some(split) = host.len().checked_sub(suffix.len() + 1) else {
            continue;
        };
        let Some(tail) = host.get(split..) else {
            continue;
        };
        if tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(suffix) {
            return &host[..split];
        }
    }
    host
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
