//! Maps a successful analysis onto the page.

use crate::normalize::{derive_company_name, is_url_scheme, split_topics};
use crate::types::AnalysisResponse;
use crate::view::{Slot, ViewBinding};

/// Single topic shown when the payload has none
pub const NO_TOPICS: &str = "No topics available";

/// What [`render`] wrote to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    /// Display name derived from the domain
    pub company_name: String,
    /// Website href
    pub website_url: String,
    /// Profile href, `None` when the link was hidden
    pub linkedin_profile: Option<String>,
    /// Topic list items, in order
    pub topics: Vec<String>,
}

/// Website href for a company domain
///
/// A domain that already carries a URL scheme is kept verbatim; anything
/// else is prefixed with `https://`.
///
/// ```
/// use lead_capture::render::website_url;
///
/// assert_eq!(website_url("acme.io"), "https://acme.io");
/// assert_eq!(website_url("http://acme.io"), "http://acme.io");
/// ```
#[must_use]
pub fn website_url(domain: &str) -> String {
    let domain = domain.trim();
    let has_scheme = domain
        .split_once("://")
        .is_some_and(|(scheme, _)| is_url_scheme(scheme));

    if has_scheme {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Topic list items for a raw bullet string
///
/// Falls back to the single [`NO_TOPICS`] item whenever splitting yields
/// nothing.
#[must_use]
pub fn topics(bullets: Option<&str>) -> Vec<String> {
    let topics = bullets.map(split_topics).unwrap_or_default();
    if topics.is_empty() {
        vec![NO_TOPICS.to_string()]
    } else {
        topics
    }
}

/// Write `response` to the result slots and reveal them
pub fn render(view: &dyn ViewBinding, response: &AnalysisResponse) -> RenderedResult {
    let company_name = derive_company_name(&response.company_domain);
    view.set_text(Slot::CompanyName, &company_name);

    let website_url = website_url(&response.company_domain);
    view.set_href(Slot::WebsiteLink, Some(website_url.as_str()));

    let linkedin_profile = response
        .linkedin_profile
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);
    view.set_href(Slot::ProfileLink, linkedin_profile.as_deref());
    view.set_visible(Slot::ProfileLink, linkedin_profile.is_some());

    let topics = topics(response.cheat_sheet_bullets.as_deref());
    view.replace_items(Slot::TopicList, &topics);

    view.set_visible(Slot::ResultsPanel, true);
    view.set_visible(Slot::LoadingIndicator, false);
    view.set_visible(Slot::ResultContent, true);
    view.scroll_into_view(Slot::ResultsPanel);

    RenderedResult {
        company_name,
        website_url,
        linkedin_profile,
        topics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MemoryView;

    #[test]
    fn renders_full_payload() {
        let view = MemoryView::new();
        let response = AnalysisResponse::for_domain("www.acme-corp.io")
            .with_linkedin_profile("https://linkedin.com/company/acme")
            .with_bullets(r#"Fast onboarding|Handles "edge, cases"|Scales"#);

        let rendered = render(&view, &response);

        assert_eq!(view.text(Slot::CompanyName), "Acme Corp");
        assert_eq!(
            view.href(Slot::WebsiteLink).as_deref(),
            Some("https://www.acme-corp.io")
        );
        assert!(view.is_visible(Slot::ProfileLink));
        assert_eq!(
            view.href(Slot::ProfileLink).as_deref(),
            Some("https://linkedin.com/company/acme")
        );
        assert_eq!(view.items(Slot::TopicList), rendered.topics);
        assert_eq!(rendered.topics.len(), 3);
        assert!(view.is_visible(Slot::ResultsPanel));
        assert!(view.is_visible(Slot::ResultContent));
        assert!(!view.is_visible(Slot::LoadingIndicator));
        assert_eq!(view.scrolls(), vec![Slot::ResultsPanel]);
    }

    #[test]
    fn missing_profile_hides_link_and_clears_href() {
        let view = MemoryView::new();
        let _ = render(
            &view,
            &AnalysisResponse::for_domain("a.com").with_linkedin_profile("https://old"),
        );

        let rendered = render(
            &view,
            &AnalysisResponse::for_domain("b.com").with_linkedin_profile("   "),
        );

        assert_eq!(rendered.linkedin_profile, None);
        assert!(!view.is_visible(Slot::ProfileLink));
        assert_eq!(view.href(Slot::ProfileLink), None);
    }

    #[test]
    fn empty_bullets_fall_back() {
        assert_eq!(topics(None), vec![NO_TOPICS]);
        assert_eq!(topics(Some("")), vec![NO_TOPICS]);
        assert_eq!(topics(Some(" | ")), vec![NO_TOPICS]);
    }

    #[test]
    fn topics_are_rebuilt_each_time() {
        let view = MemoryView::new();
        let _ = render(&view, &AnalysisResponse::for_domain("a.io").with_bullets("one|two"));
        let _ = render(&view, &AnalysisResponse::for_domain("a.io").with_bullets("three"));

        assert_eq!(view.items(Slot::TopicList), vec!["three"]);
    }

    #[test]
    fn markup_is_kept_as_text() {
        assert_eq!(topics(Some("<b>bold</b>")), vec!["<b>bold</b>"]);
    }

    #[test]
    fn website_keeps_existing_scheme() {
        assert_eq!(website_url("https://acme.io"), "https://acme.io");
        assert_eq!(website_url(" acme.io "), "https://acme.io");
        assert_eq!(website_url("httpacme.io"), "https://httpacme.io");
    }
}
