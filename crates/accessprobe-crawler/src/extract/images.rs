//! `<img>` elements and CSS background images.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{non_blank, run_script, truncate_chars, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{Dimensions, ImageRecord};

const CONTEXT_CHARS: usize = 100;

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(["']?([^"')]+)["']?\)"#).expect("valid background-image regex")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawImage {
    selector: String,
    src: String,
    alt: Option<String>,
    width: f64,
    height: f64,
    #[serde(default)]
    context: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBackground {
    selector: String,
    background_image: String,
    aria_label: Option<String>,
    width: f64,
    height: f64,
    #[serde(default)]
    context: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawImages {
    #[serde(default)]
    images: Vec<RawImage>,
    #[serde(default)]
    backgrounds: Vec<RawBackground>,
}

fn context(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| truncate_chars(text, CONTEXT_CHARS))
}

/// `alt=""` marks a decorative image; a missing `alt` does not.
pub(crate) fn classify_img(raw: RawImage) -> ImageRecord {
    let has_empty_alt = raw.alt.as_deref() == Some("");
    ImageRecord {
        selector: raw.selector,
        src: raw.src,
        alt: raw.alt,
        dimensions: Dimensions {
            width: raw.width,
            height: raw.height,
        },
        is_decorative: has_empty_alt,
        has_empty_alt,
        is_background_image: false,
        context: context(&raw.context),
    }
}

/// First `url(...)` in a computed `background-image` value.
pub(crate) fn background_url(value: &str) -> Option<&str> {
    CSS_URL
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Background images are decorative unless the element carries an `aria-label`.
pub(crate) fn classify_background(raw: RawBackground) -> Option<ImageRecord> {
    let src = background_url(&raw.background_image)?.to_string();
    let alt = non_blank(raw.aria_label);
    Some(ImageRecord {
        selector: raw.selector,
        src,
        is_decorative: alt.is_none(),
        alt,
        dimensions: Dimensions {
            width: raw.width,
            height: raw.height,
        },
        has_empty_alt: false,
        is_background_image: true,
        context: context(&raw.context),
    })
}

pub(crate) fn classify(raw: RawImages) -> Vec<ImageRecord> {
    let mut records: Vec<ImageRecord> = raw.images.into_iter().map(classify_img).collect();
    records.extend(raw.backgrounds.into_iter().filter_map(classify_background));
    records
}

pub async fn extract(probe: &dyn PageProbe) -> Result<Vec<ImageRecord>, ExtractError> {
    let raw: RawImages = run_script(probe, Category::Images).await?;
    Ok(classify(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn img(alt: Option<&str>) -> RawImage {
        RawImage {
            selector: "html > body:nth-of-type(1) > img:nth-of-type(1)".into(),
            src: "https://example.com/logo.png".into(),
            alt: alt.map(str::to_string),
            width: 120.0,
            height: 40.0,
            context: String::new(),
        }
    }

    #[test]
    fn test_missing_alt_is_not_decorative() {
        let record = classify_img(img(None));
        assert_eq!(record.alt, None);
        assert!(!record.is_decorative);
        assert!(!record.has_empty_alt);
    }

    #[test]
    fn test_empty_alt_is_decorative() {
        let record = classify_img(img(Some("")));
        assert_eq!(record.alt.as_deref(), Some(""));
        assert!(record.is_decorative);
        assert!(record.has_empty_alt);
    }

    #[test]
    fn test_whitespace_alt_is_not_trimmed() {
        let record = classify_img(img(Some(" ")));
        assert!(!record.is_decorative);
        assert!(!record.has_empty_alt);
    }

    #[test]
    fn test_context_is_truncated() {
        let mut raw = img(Some("Logo"));
        raw.context = format!("  {}  ", "a".repeat(150));
        let record = classify_img(raw);
        assert_eq!(record.context.map(|c| c.chars().count()), Some(100));
    }

    #[test]
    fn test_background_url_forms() {
        assert_eq!(background_url(r#"url("https://x.test/a.png")"#), Some("https://x.test/a.png"));
        assert_eq!(background_url("url('/hero.jpg')"), Some("/hero.jpg"));
        assert_eq!(background_url("url(/plain.gif)"), Some("/plain.gif"));
        assert_eq!(background_url("linear-gradient(red, blue)"), None);
    }

    #[test]
    fn test_background_decorative_unless_labelled() {
        let raw: RawImages = serde_json::from_value(json!({
            "images": [],
            "backgrounds": [
                {"selector": "#hero", "backgroundImage": "url(\"/hero.jpg\")", "ariaLabel": null,
                 "width": 800.0, "height": 300.0, "context": "Welcome"},
                {"selector": "#banner", "backgroundImage": "url(\"/b.jpg\")", "ariaLabel": "Team photo",
                 "width": 800.0, "height": 300.0, "context": ""},
                {"selector": "#grad", "backgroundImage": "none", "ariaLabel": null,
                 "width": 1.0, "height": 1.0}
            ]
        }))
        .unwrap();
        let records = classify(raw);
        assert_eq!(records.len(), 2);

        assert!(records[0].is_background_image);
        assert!(records[0].is_decorative);
        assert!(!records[0].has_empty_alt);
        assert_eq!(records[0].src, "/hero.jpg");
        assert_eq!(records[0].context.as_deref(), Some("Welcome"));

        assert!(!records[1].is_decorative);
        assert_eq!(records[1].alt.as_deref(), Some("Team photo"));
        assert_eq!(records[1].context, None);
    }
}
