//! ARIA landmarks, explicit and implicit.

use std::collections::HashMap;

use super::{run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{ElementRecord, LandmarkKind, LandmarkRecord};

/// Explicit `role` wins, then the sectioning tag; anything else is a region.
pub(crate) fn landmark_kind(element: &ElementRecord) -> LandmarkKind {
    element
        .attr("role")
        .and_then(LandmarkKind::from_role)
        .or_else(|| LandmarkKind::from_tag(&element.tag_name))
        .unwrap_or(LandmarkKind::Region)
}

pub(crate) fn classify(elements: Vec<ElementRecord>) -> Vec<LandmarkRecord> {
    let kinds: Vec<LandmarkKind> = elements.iter().map(landmark_kind).collect();
    let mut counts: HashMap<LandmarkKind, usize> = HashMap::new();
    for kind in &kinds {
        *counts.entry(*kind).or_default() += 1;
    }

    elements
        .into_iter()
        .zip(kinds)
        .map(|(element, kind)| LandmarkRecord {
            has_label: element.non_empty_attr("aria-label").is_some()
                || element.non_empty_attr("aria-labelledby").is_some(),
            is_unique: counts.get(&kind) == Some(&1),
            landmark_type: kind,
            element,
        })
        .collect()
}

pub async fn extract(probe: &dyn PageProbe) -> Result<Vec<LandmarkRecord>, ExtractError> {
    let elements: Vec<ElementRecord> = run_script(probe, Category::Landmarks).await?;
    Ok(classify(elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, attrs: &[(&str, &str)]) -> ElementRecord {
        ElementRecord {
            selector: tag.into(),
            tag_name: tag.into(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_takes_precedence_over_tag() {
        assert_eq!(
            landmark_kind(&el("header", &[("role", "navigation")])),
            LandmarkKind::Navigation
        );
        assert_eq!(landmark_kind(&el("footer", &[])), LandmarkKind::Contentinfo);
        assert_eq!(
            landmark_kind(&el("div", &[("role", "search")])),
            LandmarkKind::Search
        );
        assert_eq!(
            landmark_kind(&el("aside", &[("role", "presentation")])),
            LandmarkKind::Complementary
        );
        assert_eq!(
            landmark_kind(&el("div", &[("role", "presentation")])),
            LandmarkKind::Region
        );
    }

    #[test]
    fn test_uniqueness_and_labels() {
        let records = classify(vec![
            el("nav", &[("aria-label", "Primary")]),
            el("nav", &[("aria-labelledby", "")]),
            el("main", &[]),
        ]);
        assert!(!records[0].is_unique);
        assert!(!records[1].is_unique);
        assert!(records[2].is_unique);
        assert!(records[0].has_label);
        assert!(!records[1].has_label);
        assert_eq!(records[2].landmark_type, LandmarkKind::Main);
    }
}
