//! In-page extractors.
//!
//! Every category ships one JavaScript body under `scripts/`. The body is
//! wrapped with a shared prelude (`__ap` helpers for selectors, attributes,
//! and geometry), evaluated read-only in the page, and the raw JSON it
//! returns is classified in Rust.

pub mod colors;
pub mod forms;
pub mod headings;
pub mod images;
pub mod interactive;
pub mod landmarks;
pub mod links;
pub mod metadata;
pub mod supplementary;

use std::fmt;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::PageProbe;
use crate::error::ExtractError;

const PRELUDE: &str = include_str!("scripts/prelude.js");

/// Extraction category; one script and one slot in the evidence document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Html,
    Metadata,
    Images,
    Forms,
    Headings,
    Links,
    Colors,
    Interactive,
    Landmarks,
    Accessibility,
    Languages,
    Media,
}

impl Category {
    /// Document order of the evidence fields.
    pub const ALL: [Category; 12] = [
        Category::Html,
        Category::Metadata,
        Category::Images,
        Category::Forms,
        Category::Headings,
        Category::Links,
        Category::Colors,
        Category::Interactive,
        Category::Landmarks,
        Category::Accessibility,
        Category::Languages,
        Category::Media,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Html => "html",
            Category::Metadata => "metadata",
            Category::Images => "images",
            Category::Forms => "forms",
            Category::Headings => "headings",
            Category::Links => "links",
            Category::Colors => "colors",
            Category::Interactive => "interactive",
            Category::Landmarks => "landmarks",
            Category::Accessibility => "accessibility",
            Category::Languages => "languages",
            Category::Media => "media",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn body(self) -> &'static str {
        match self {
            Category::Html => include_str!("scripts/html.js"),
            Category::Metadata => include_str!("scripts/metadata.js"),
            Category::Images => include_str!("scripts/images.js"),
            Category::Forms => include_str!("scripts/forms.js"),
            Category::Headings => include_str!("scripts/headings.js"),
            Category::Links => include_str!("scripts/links.js"),
            Category::Colors => include_str!("scripts/colors.js"),
            Category::Interactive => include_str!("scripts/interactive.js"),
            Category::Landmarks => include_str!("scripts/landmarks.js"),
            Category::Accessibility => include_str!("scripts/accessibility.js"),
            Category::Languages => include_str!("scripts/languages.js"),
            Category::Media => include_str!("scripts/media.js"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const MARKER_PREFIX: &str = "/* accessprobe:";

/// Full expression for `category`: a marker comment, then an IIFE around prelude and body.
pub fn build_script(category: Category) -> String {
    format!(
        "{MARKER_PREFIX}{} */ (() => {{\n{PRELUDE}\n{}\n}})()",
        category.name(),
        category.body()
    )
}

/// Recover the category from a script produced by [`build_script`].
pub fn script_category(script: &str) -> Option<Category> {
    let rest = script.strip_prefix(MARKER_PREFIX)?;
    let (name, _) = rest.split_once(" */")?;
    Category::from_name(name)
}

/// Evaluate the category's script and decode its raw result.
pub(crate) async fn run_script<T: DeserializeOwned>(
    probe: &dyn PageProbe,
    category: Category,
) -> Result<T, ExtractError> {
    let start = Instant::now();
    let value = probe
        .evaluate(&build_script(category))
        .await
        .map_err(|source| ExtractError::Script { category, source })?;
    let decoded = serde_json::from_value(value)
        .map_err(|source| ExtractError::Decode { category, source })?;
    debug!("{} script finished in {:?}", category, start.elapsed());
    Ok(decoded)
}

/// First `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// `Some(text)` unless blank.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
