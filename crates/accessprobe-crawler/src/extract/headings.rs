//! Heading outline.

use super::{run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{ElementRecord, HeadingRecord};

/// Level of an `h1`..`h6` tag name.
pub(crate) fn heading_level(tag_name: &str) -> Option<u8> {
    let level = tag_name
        .strip_prefix('h')
        .or_else(|| tag_name.strip_prefix('H'))?
        .parse::<u8>()
        .ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Build records in document order. A heading skips levels when it is more
/// than one deeper than its predecessor; the first heading never does.
pub(crate) fn classify(elements: Vec<ElementRecord>) -> Vec<HeadingRecord> {
    let mut previous: Option<u8> = None;
    elements
        .into_iter()
        .filter_map(|element| {
            let level = heading_level(&element.tag_name)?;
            let has_proper_nesting = previous.is_none_or(|prev| level <= prev + 1);
            previous = Some(level);
            Some(HeadingRecord {
                is_empty: element.text.is_empty(),
                element,
                level,
                has_proper_nesting,
            })
        })
        .collect()
}

pub async fn extract(probe: &dyn PageProbe) -> Result<Vec<HeadingRecord>, ExtractError> {
    let elements: Vec<ElementRecord> = run_script(probe, Category::Headings).await?;
    Ok(classify(elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> ElementRecord {
        ElementRecord {
            selector: format!("h{level}"),
            tag_name: format!("h{level}"),
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn nesting(levels: &[u8]) -> Vec<bool> {
        classify(levels.iter().map(|&l| heading(l, "x")).collect())
            .iter()
            .map(|h| h.has_proper_nesting)
            .collect()
    }

    #[test]
    fn test_skipped_level_is_flagged() {
        assert_eq!(nesting(&[1, 2, 4]), vec![true, true, false]);
    }

    #[test]
    fn test_sequential_levels_are_fine() {
        assert_eq!(nesting(&[1, 2, 3]), vec![true, true, true]);
    }

    #[test]
    fn test_going_back_up_is_fine() {
        assert_eq!(nesting(&[1, 2, 3, 2, 1, 2]), vec![true; 6]);
    }

    #[test]
    fn test_first_heading_is_always_proper() {
        assert_eq!(nesting(&[3, 4, 6]), vec![true, true, false]);
    }

    #[test]
    fn test_empty_heading() {
        let records = classify(vec![heading(1, ""), heading(2, "Intro")]);
        assert!(records[0].is_empty);
        assert!(!records[1].is_empty);
        assert_eq!(records[1].text(), "Intro");
        assert_eq!(records[1].level, 2);
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("H6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
    }
}
