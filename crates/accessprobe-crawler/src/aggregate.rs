//! Fan-out of every extractor against one page, fan-in into an [`EvidenceDocument`].

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::extract::{
    colors, forms, headings, images, interactive, landmarks, links, metadata, supplementary,
};
use crate::model::{DocumentStructureSummary, EvidenceDocument, ExtractionMetadata};

/// Unwrap a category result, or record the failure and fall back to empty.
fn isolate<T: Default>(result: Result<T, ExtractError>, warnings: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            let message = format!("{} extraction failed: {}", e.category(), e);
            warn!("{}", message);
            warnings.push(message);
            T::default()
        }
    }
}

/// Run every extractor concurrently against a loaded page.
///
/// Never fails: a category that errors is left empty and reported in
/// `extraction_metadata.warnings`, in category order.
pub async fn extract_evidence(
    probe: &dyn PageProbe,
    url: &str,
    page_load: Duration,
) -> EvidenceDocument {
    let start = Instant::now();

    let (
        html_source,
        page_metadata,
        images,
        forms,
        headings,
        links,
        colors,
        interactive_elements,
        landmarks,
        accessibility_tree,
        language_attributes,
        media_elements,
    ) = tokio::join!(
        supplementary::html_source(probe),
        metadata::extract(probe),
        images::extract(probe),
        forms::extract(probe),
        headings::extract(probe),
        links::extract(probe),
        colors::extract(probe),
        interactive::extract(probe),
        landmarks::extract(probe),
        supplementary::accessibility_tree(probe),
        supplementary::language_attributes(probe),
        supplementary::media_elements(probe),
    );

    let mut warnings = Vec::new();
    let html_source = isolate(html_source, &mut warnings);
    let page_metadata = isolate(page_metadata, &mut warnings);
    let images = isolate(images, &mut warnings);
    let forms = isolate(forms, &mut warnings);
    let headings = isolate(headings, &mut warnings);
    let links = isolate(links, &mut warnings);
    let colors = isolate(colors, &mut warnings);
    if let Some(message) = colors.warning() {
        warn!("{}", message);
        warnings.push(message);
    }
    let colors = colors.samples;
    let interactive_elements = isolate(interactive_elements, &mut warnings);
    let landmarks = isolate(landmarks, &mut warnings);
    let accessibility_tree = isolate(accessibility_tree, &mut warnings);
    let language_attributes = isolate(language_attributes, &mut warnings);
    let media_elements = isolate(media_elements, &mut warnings);

    let document_structure = DocumentStructureSummary::derive(&headings, &landmarks, &links);
    let extraction = start.elapsed();
    debug!(
        "Extracted {} in {:?} ({} warnings)",
        url,
        extraction,
        warnings.len()
    );

    EvidenceDocument {
        url: url.to_string(),
        html_source,
        page_metadata,
        images,
        forms,
        has_skip_links: document_structure.skip_link_count > 0,
        headings,
        links,
        colors,
        interactive_elements,
        landmarks,
        accessibility_tree,
        language_attributes,
        media_elements,
        document_structure,
        extraction_metadata: ExtractionMetadata {
            timestamp: Utc::now(),
            extraction_time_ms: millis(page_load + extraction),
            page_load_time_ms: millis(page_load),
            errors: Vec::new(),
            warnings,
        },
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
