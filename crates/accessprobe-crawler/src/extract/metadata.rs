//! Document-level metadata.

use serde::Deserialize;

use super::{non_blank, run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::PageMetadata;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawMetadata {
    title: Option<String>,
    lang: Option<String>,
    viewport: Option<String>,
    description: Option<String>,
    charset: Option<String>,
}

impl From<RawMetadata> for PageMetadata {
    fn from(raw: RawMetadata) -> Self {
        PageMetadata {
            title: non_blank(raw.title).map(|t| t.trim().to_string()),
            lang: non_blank(raw.lang).map(|l| l.trim().to_string()),
            viewport: non_blank(raw.viewport),
            description: non_blank(raw.description),
            charset: non_blank(raw.charset),
        }
    }
}

pub async fn extract(probe: &dyn PageProbe) -> Result<PageMetadata, ExtractError> {
    let raw: RawMetadata = run_script(probe, Category::Metadata).await?;
    Ok(raw.into())
}
