//! Page-signal extraction for WCAG assessment.
//!
//! A [`Crawler`] loads one URL in headless Chrome, runs every extractor
//! concurrently against the loaded page, and returns an
//! [`EvidenceDocument`]. Navigation failure is the only error it returns;
//! a failing extractor leaves its category empty and adds a warning.
//!
//! ```no_run
//! # async fn run() -> Result<(), accessprobe_crawler::NavigationError> {
//! let config = accessprobe_config::Config::default();
//! let doc = accessprobe_crawler::crawl_page("https://example.com", &config).await?;
//! println!("{} images", doc.images.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod browser;
pub mod contrast;
pub mod error;
pub mod extract;
pub mod model;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::extract_evidence;
pub use browser::{BrowserDriver, BrowserPage, ChromeDriver, ChromePage, PageProbe};
pub use error::{BrowserError, ExtractError, NavigationError};
pub use extract::Category;
pub use model::*;
pub use session::{crawl_page, Crawler, LoadedPage};
