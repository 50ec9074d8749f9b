//! HTML snapshot, simplified accessibility nodes, language attributes, media.

use serde::Deserialize;

use super::{non_blank, run_script, truncate_chars, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{
    AccessibilityNode, AccessibilityProperties, LanguageAttribute, MediaElement, MediaKind,
};

const NAME_CHARS: usize = 100;

pub async fn html_source(probe: &dyn PageProbe) -> Result<String, ExtractError> {
    run_script(probe, Category::Html).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNode {
    selector: String,
    tag_name: String,
    aria_label: Option<String>,
    #[serde(default)]
    text: String,
    role: Option<String>,
    id: Option<String>,
    class_name: Option<String>,
}

/// Name is the `aria-label`, falling back to the text content.
pub(crate) fn classify_node(raw: RawNode) -> AccessibilityNode {
    let name = non_blank(raw.aria_label)
        .or_else(|| non_blank(Some(raw.text)))
        .map(|n| truncate_chars(n.trim(), NAME_CHARS));
    AccessibilityNode {
        name,
        role: non_blank(raw.role),
        selector: raw.selector,
        properties: AccessibilityProperties {
            tag_name: raw.tag_name,
            id: non_blank(raw.id),
            class_name: non_blank(raw.class_name),
        },
    }
}

pub async fn accessibility_tree(
    probe: &dyn PageProbe,
) -> Result<Vec<AccessibilityNode>, ExtractError> {
    let raw: Vec<RawNode> = run_script(probe, Category::Accessibility).await?;
    Ok(raw.into_iter().map(classify_node).collect())
}

pub async fn language_attributes(
    probe: &dyn PageProbe,
) -> Result<Vec<LanguageAttribute>, ExtractError> {
    run_script(probe, Category::Languages).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMedia {
    selector: String,
    tag_name: String,
    #[serde(default)]
    has_controls: bool,
    #[serde(default)]
    autoplay: bool,
    /// Lower-cased `kind` of each child `<track>`; empty when unset.
    #[serde(default)]
    track_kinds: Vec<String>,
}

/// A `<track>` without `kind` is a subtitles track.
fn is_caption_track(kind: &str) -> bool {
    matches!(kind, "" | "captions" | "subtitles")
}

pub(crate) fn classify_media(raw: RawMedia) -> Option<MediaElement> {
    let kind = match raw.tag_name.as_str() {
        "video" => MediaKind::Video,
        "audio" => MediaKind::Audio,
        _ => return None,
    };
    Some(MediaElement {
        selector: raw.selector,
        kind,
        has_controls: raw.has_controls,
        has_transcript: false,
        has_captions: raw.track_kinds.iter().any(|k| is_caption_track(k)),
        auto_plays: raw.autoplay,
    })
}

pub async fn media_elements(probe: &dyn PageProbe) -> Result<Vec<MediaElement>, ExtractError> {
    let raw: Vec<RawMedia> = run_script(probe, Category::Media).await?;
    Ok(raw.into_iter().filter_map(classify_media).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(aria_label: Option<&str>, text: &str) -> RawNode {
        RawNode {
            selector: "#btn".into(),
            tag_name: "button".into(),
            aria_label: aria_label.map(str::to_string),
            text: text.into(),
            role: None,
            id: Some("btn".into()),
            class_name: Some(String::new()),
        }
    }

    #[test]
    fn test_node_name_prefers_aria_label() {
        assert_eq!(
            classify_node(node(Some("Close dialog"), "X")).name.as_deref(),
            Some("Close dialog")
        );
        assert_eq!(classify_node(node(Some(""), "Submit")).name.as_deref(), Some("Submit"));
        assert_eq!(classify_node(node(None, "  ")).name, None);
    }

    #[test]
    fn test_node_properties() {
        let n = classify_node(node(None, "Go"));
        assert_eq!(n.properties.tag_name, "button");
        assert_eq!(n.properties.id.as_deref(), Some("btn"));
        assert_eq!(n.properties.class_name, None);
        assert_eq!(n.role, None);
    }

    fn media(tag: &str, kinds: &[&str]) -> RawMedia {
        RawMedia {
            selector: tag.into(),
            tag_name: tag.into(),
            has_controls: true,
            autoplay: false,
            track_kinds: kinds.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_captions_detection() {
        assert!(classify_media(media("video", &["captions"])).unwrap().has_captions);
        assert!(classify_media(media("video", &["subtitles"])).unwrap().has_captions);
        assert!(classify_media(media("video", &[""])).unwrap().has_captions);
        assert!(!classify_media(media("video", &["chapters", "metadata"])).unwrap().has_captions);
        assert!(!classify_media(media("audio", &[])).unwrap().has_captions);
    }

    #[test]
    fn test_media_kind_and_transcript() {
        let m = classify_media(media("audio", &[])).unwrap();
        assert_eq!(m.kind, MediaKind::Audio);
        assert!(!m.has_transcript);
        assert!(m.has_controls);
        assert!(classify_media(media("iframe", &[])).is_none());
    }
}
