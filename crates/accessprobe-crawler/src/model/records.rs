//! Per-element record types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Layout box in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl From<BoundingBox> for Dimensions {
    fn from(b: BoundingBox) -> Self {
        Self {
            width: b.width,
            height: b.height,
        }
    }
}

/// Shape shared by most extracted items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    /// CSS selector that resolves to this element in the captured DOM.
    pub selector: String,
    /// Lower-case local name.
    pub tag_name: String,
    /// Trimmed text content.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl ElementRecord {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub selector: String,
    pub src: String,
    /// Raw `alt` attribute (or `aria-label` for background images).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub dimensions: Dimensions,
    pub is_decorative: bool,
    pub has_empty_alt: bool,
    pub is_background_image: bool,
    /// Up to 100 characters of surrounding text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    /// 1 through 6.
    pub level: u8,
    pub is_empty: bool,
    pub has_proper_nesting: bool,
}

impl HeadingRecord {
    pub fn text(&self) -> &str {
        &self.element.text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    pub href: String,
    pub has_generic_text: bool,
    pub is_empty_link: bool,
    pub has_title: bool,
    pub opens_in_new_window: bool,
}

impl LinkRecord {
    pub fn text(&self) -> &str {
        &self.element.text
    }

    /// In-page anchor such as a "skip to content" link.
    pub fn is_skip_link(&self) -> bool {
        self.href.starts_with('#')
    }
}

/// One foreground/background pair sampled from a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSample {
    pub selector: String,
    /// `#rrggbb`
    pub foreground: String,
    /// `#rrggbb`
    pub background: String,
    pub contrast: f64,
    #[serde(rename = "meetsAA")]
    pub meets_aa: bool,
    #[serde(rename = "meetsAAA")]
    pub meets_aaa: bool,
    /// Computed font size in CSS pixels.
    pub font_size: f64,
    pub is_large_text: bool,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElementRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    pub is_focusable: bool,
    /// Always true: focus styles are not inspected.
    pub has_visible_focus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_described_by: Option<String>,
    pub touch_target_size: Dimensions,
    pub meets_touch_target_size: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKind {
    Banner,
    Navigation,
    Main,
    Complementary,
    Contentinfo,
    Search,
    Form,
    Region,
}

impl LandmarkKind {
    /// Kind named by an explicit ARIA `role` value.
    pub fn from_role(role: &str) -> Option<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "banner" => Some(Self::Banner),
            "navigation" => Some(Self::Navigation),
            "main" => Some(Self::Main),
            "complementary" => Some(Self::Complementary),
            "contentinfo" => Some(Self::Contentinfo),
            "search" => Some(Self::Search),
            "form" => Some(Self::Form),
            "region" => Some(Self::Region),
            _ => None,
        }
    }

    /// Implicit kind of a sectioning tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "header" => Some(Self::Banner),
            "nav" => Some(Self::Navigation),
            "main" => Some(Self::Main),
            "aside" => Some(Self::Complementary),
            "footer" => Some(Self::Contentinfo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    pub landmark_type: LandmarkKind,
    pub has_label: bool,
    /// No other landmark of the same kind exists on the page.
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub selector: String,
    pub inputs: Vec<ElementRecord>,
    pub has_submit: bool,
    pub has_validation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAnalysis {
    pub unlabeled_inputs: Vec<ElementRecord>,
    pub missing_fieldsets: Vec<ElementRecord>,
    /// Not analysed; always empty.
    pub no_error_association: Vec<ElementRecord>,
    pub missing_required: Vec<ElementRecord>,
    /// Not analysed; always empty.
    pub poor_instructions: Vec<ElementRecord>,
    /// Not analysed; always empty.
    pub inaccessible_validation: Vec<ElementRecord>,
    pub forms: Vec<FormSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityProperties {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Flattened view of an element as assistive technology would name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub selector: String,
    pub properties: AccessibilityProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageAttribute {
    pub selector: String,
    pub lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaElement {
    pub selector: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub has_controls: bool,
    /// Not detected; always false.
    pub has_transcript: bool,
    pub has_captions: bool,
    pub auto_plays: bool,
}
