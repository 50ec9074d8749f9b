//! Anchors with an `href`.

use super::{run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{ElementRecord, LinkRecord};

/// Phrases that say nothing about the destination. Matched as substrings of
/// the lower-cased link text.
pub const GENERIC_LINK_TEXT: &[&str] = &[
    "click here",
    "read more",
    "more",
    "link",
    "here",
    "more info",
];

pub(crate) fn has_generic_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    GENERIC_LINK_TEXT.iter().any(|g| lower.contains(g))
}

pub(crate) fn classify_link(element: ElementRecord) -> LinkRecord {
    LinkRecord {
        href: element.attr("href").unwrap_or_default().to_string(),
        has_generic_text: has_generic_text(&element.text),
        is_empty_link: element.text.is_empty(),
        has_title: element.non_empty_attr("title").is_some(),
        opens_in_new_window: element.attr("target") == Some("_blank"),
        element,
    }
}

pub async fn extract(probe: &dyn PageProbe) -> Result<Vec<LinkRecord>, ExtractError> {
    let elements: Vec<ElementRecord> = run_script(probe, Category::Links).await?;
    Ok(elements.into_iter().map(classify_link).collect())
}
