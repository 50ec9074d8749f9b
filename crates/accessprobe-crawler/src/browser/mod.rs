//! Browser seams.
//!
//! Extractors only need [`PageProbe`]; the session manager drives pages
//! through [`BrowserPage`] and obtains them from a [`BrowserDriver`].
//! [`ChromeDriver`] is the production implementation.

mod chrome;

use std::time::Duration;

use accessprobe_cdp::{CdpError, DeviceMetrics, NavigationOutcome};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::BrowserError;

pub use chrome::{ChromeDriver, ChromePage};

/// Read-only script evaluation against a loaded page.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Evaluate `expression` in the page and return its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError>;
}

/// A browser tab the session manager can prepare, load, and dispose of.
#[async_trait]
pub trait BrowserPage: PageProbe {
    /// Apply viewport and user agent before navigation.
    async fn configure(&self, metrics: DeviceMetrics, user_agent: &str) -> Result<(), CdpError>;

    /// Load `url`, returning once the network is idle.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<NavigationOutcome, CdpError>;

    /// Close the tab. Safe to call more than once.
    async fn close(&self) -> Result<(), CdpError>;
}

/// Source of fresh pages.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Page: BrowserPage + 'static;

    /// Open a blank page, launching or reconnecting to the browser as needed.
    async fn new_page(&self) -> Result<Self::Page, BrowserError>;

    /// Close the connection and terminate any browser this driver started.
    async fn shutdown(&self);
}
