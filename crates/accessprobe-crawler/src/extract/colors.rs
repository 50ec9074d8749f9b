//! Foreground/background contrast of text-bearing elements.

use serde::Deserialize;
use tracing::debug;

use super::{run_script, truncate_chars, Category};
use crate::browser::PageProbe;
use crate::contrast::{self, contrast_ratio, is_large_text, parse_css_color, resolve_pair};
use crate::error::ExtractError;
use crate::model::ColorSample;

const CONTEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawColor {
    selector: String,
    color: String,
    #[serde(default)]
    background_color: String,
    #[serde(default)]
    font_size: String,
    #[serde(default)]
    font_weight: String,
    text: String,
}

/// Samples kept for the document plus colour values that could not be read.
#[derive(Debug, Default)]
pub struct ColorExtraction {
    pub samples: Vec<ColorSample>,
    /// Offending colour value of every sample dropped for its syntax.
    pub unsupported: Vec<String>,
}

impl ColorExtraction {
    /// Warning describing dropped samples, if any were dropped.
    pub fn warning(&self) -> Option<String> {
        if self.unsupported.is_empty() {
            return None;
        }
        let mut examples: Vec<&str> = Vec::new();
        for value in &self.unsupported {
            if examples.len() == MAX_EXAMPLES {
                break;
            }
            if !examples.contains(&value.as_str()) {
                examples.push(value);
            }
        }
        Some(format!(
            "colors: skipped {} samples with unsupported colour values ({})",
            self.unsupported.len(),
            examples.join(", ")
        ))
    }
}

const MAX_EXAMPLES: usize = 3;

#[derive(Debug)]
pub(crate) enum Classified {
    Sample(ColorSample),
    Blank,
    /// Carries the colour value that could not be parsed.
    Unsupported(String),
}

pub(crate) fn classify_sample(raw: RawColor) -> Classified {
    let text = raw.text.trim();
    if text.is_empty() {
        return Classified::Blank;
    }
    let Some((fg, bg)) = resolve_pair(&raw.color, &raw.background_color) else {
        debug!(
            "Skipping {}: unparseable colours {:?} on {:?}",
            raw.selector, raw.color, raw.background_color
        );
        let bad = if parse_css_color(&raw.color).is_none() {
            raw.color
        } else {
            raw.background_color
        };
        return Classified::Unsupported(bad);
    };

    let ratio = contrast_ratio(fg, bg);
    let font_size = contrast::parse_px(&raw.font_size).unwrap_or(0.0);
    Classified::Sample(ColorSample {
        selector: raw.selector,
        foreground: fg.to_hex(),
        background: bg.to_hex(),
        contrast: ratio,
        meets_aa: contrast::meets_aa(ratio),
        meets_aaa: contrast::meets_aaa(ratio),
        font_size,
        is_large_text: is_large_text(font_size, &raw.font_weight),
        context: truncate_chars(text, CONTEXT_CHARS),
    })
}

pub async fn extract(probe: &dyn PageProbe) -> Result<ColorExtraction, ExtractError> {
    let raw: Vec<RawColor> = run_script(probe, Category::Colors).await?;
    let mut extraction = ColorExtraction::default();
    for sample in raw {
        match classify_sample(sample) {
            Classified::Sample(sample) => extraction.samples.push(sample),
            Classified::Blank => {}
            Classified::Unsupported(value) => extraction.unsupported.push(value),
        }
    }
    Ok(extraction)
}
