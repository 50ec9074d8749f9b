//! Page-level aggregates and the evidence document itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::records::{
    AccessibilityNode, ColorSample, FormAnalysis, HeadingRecord, ImageRecord,
    InteractiveElementRecord, LandmarkRecord, LanguageAttribute, LinkRecord, MediaElement,
};

/// Document-level metadata. Fields absent from the DOM stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructureSummary {
    #[serde(rename = "hasH1")]
    pub has_h1: bool,
    #[serde(rename = "h1Count")]
    pub h1_count: usize,
    pub heading_hierarchy: Vec<u8>,
    pub landmark_count: usize,
    pub skip_link_count: usize,
}

impl DocumentStructureSummary {
    /// Roll up the extracted collections.
    pub fn derive(
        headings: &[HeadingRecord],
        landmarks: &[LandmarkRecord],
        links: &[LinkRecord],
    ) -> Self {
        let heading_hierarchy: Vec<u8> = headings.iter().map(|h| h.level).collect();
        let h1_count = heading_hierarchy.iter().filter(|&&l| l == 1).count();
        Self {
            has_h1: h1_count > 0,
            h1_count,
            heading_hierarchy,
            landmark_count: landmarks.len(),
            skip_link_count: links.iter().filter(|l| l.is_skip_link()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub timestamp: DateTime<Utc>,
    /// Navigation plus extraction, in milliseconds.
    #[serde(rename = "extractionTime")]
    pub extraction_time_ms: u64,
    #[serde(rename = "pageLoadTime")]
    pub page_load_time_ms: u64,
    pub errors: Vec<String>,
    /// One entry per extractor category that failed and was left empty.
    pub warnings: Vec<String>,
}

/// Everything extracted from one page, handed to the caller as a plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDocument {
    pub url: String,
    pub html_source: String,
    pub page_metadata: PageMetadata,
    pub images: Vec<ImageRecord>,
    pub forms: FormAnalysis,
    pub headings: Vec<HeadingRecord>,
    pub links: Vec<LinkRecord>,
    pub colors: Vec<ColorSample>,
    pub interactive_elements: Vec<InteractiveElementRecord>,
    pub landmarks: Vec<LandmarkRecord>,
    pub accessibility_tree: Vec<AccessibilityNode>,
    pub has_skip_links: bool,
    pub language_attributes: Vec<LanguageAttribute>,
    pub media_elements: Vec<MediaElement>,
    pub document_structure: DocumentStructureSummary,
    pub extraction_metadata: ExtractionMetadata,
}

impl EvidenceDocument {
    /// Whether any category degraded during extraction.
    pub fn has_gaps(&self) -> bool {
        !self.extraction_metadata.warnings.is_empty()
            || !self.extraction_metadata.errors.is_empty()
    }
}
