//! Session manager: owns the browser, loads pages, guarantees they close.

use std::sync::Arc;
use std::time::{Duration, Instant};

use accessprobe_cdp::{DeviceMetrics, NavigationOutcome};
use accessprobe_config::{BrowserConfig, Config, ExtractionConfig};
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::aggregate::extract_evidence;
use crate::browser::{BrowserDriver, BrowserPage, ChromeDriver, PageProbe};
use crate::error::{BrowserError, NavigationError};
use crate::model::EvidenceDocument;

/// Closes the page when dropped unless it was closed explicitly.
///
/// Dropping happens on cancellation and panics, where no `.await` is
/// possible, so the close is spawned onto the current runtime.
struct PageGuard<P: BrowserPage + 'static> {
    page: Arc<P>,
    armed: bool,
}

impl<P: BrowserPage + 'static> PageGuard<P> {
    fn new(page: P) -> Self {
        Self {
            page: Arc::new(page),
            armed: true,
        }
    }

    async fn close(mut self) {
        self.armed = false;
        if let Err(e) = self.page.close().await {
            warn!("Failed to close page: {}", e);
        }
    }
}

impl<P: BrowserPage + 'static> Drop for PageGuard<P> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let page = self.page.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!("Failed to close abandoned page: {}", e);
                    }
                });
            }
            Err(_) => warn!("Page dropped outside a runtime; leaving it to browser shutdown"),
        }
    }
}

/// A page that navigated successfully and is ready for extraction.
pub struct LoadedPage<P: BrowserPage + 'static> {
    url: String,
    outcome: NavigationOutcome,
    page_load: Duration,
    guard: PageGuard<P>,
}

impl<P: BrowserPage + 'static> LoadedPage<P> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn outcome(&self) -> &NavigationOutcome {
        &self.outcome
    }

    /// Time from issuing the navigation to network idle.
    pub fn page_load(&self) -> Duration {
        self.page_load
    }

    pub fn probe(&self) -> &dyn PageProbe {
        self.guard.page.as_ref()
    }

    /// Close the underlying tab now instead of on drop.
    pub async fn close(self) {
        self.guard.close().await;
    }
}

/// Loads pages in a browser and turns them into evidence documents.
///
/// One browser is reused across sequential requests; concurrent requests
/// each get their own page.
pub struct Crawler<D: BrowserDriver = ChromeDriver> {
    driver: D,
    browser: BrowserConfig,
    extraction: ExtractionConfig,
}

impl Crawler<ChromeDriver> {
    pub fn new(config: &Config) -> Self {
        let driver = ChromeDriver::new(config.browser.clone(), &config.extraction);
        Self::with_driver(driver, config)
    }
}

impl<D: BrowserDriver> Crawler<D> {
    pub fn with_driver(driver: D, config: &Config) -> Self {
        Self {
            driver,
            browser: config.browser.clone(),
            extraction: config.extraction.clone(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Open a page, apply viewport and user agent, and load `url`.
    ///
    /// Any failure closes the page before returning.
    pub async fn open_session(&self, url: &str) -> Result<LoadedPage<D::Page>, NavigationError> {
        let guard = PageGuard::new(self.driver.new_page().await?);

        match self.load(guard.page.as_ref(), url).await {
            Ok((outcome, page_load)) => {
                info!(
                    "Loaded {} (status {:?}) in {:?}",
                    url, outcome.status, page_load
                );
                Ok(LoadedPage {
                    url: url.to_string(),
                    outcome,
                    page_load,
                    guard,
                })
            }
            Err(e) => {
                warn!("Navigation to {} failed: {}", url, e);
                guard.close().await;
                Err(e)
            }
        }
    }

    async fn load(
        &self,
        page: &D::Page,
        url: &str,
    ) -> Result<(NavigationOutcome, Duration), NavigationError> {
        let metrics =
            DeviceMetrics::desktop(self.browser.viewport_width, self.browser.viewport_height);
        page.configure(metrics, &self.browser.user_agent)
            .await
            .map_err(BrowserError::from)?;

        let timeout = self.extraction.navigation_timeout();
        let start = Instant::now();
        let outcome = match tokio::time::timeout(timeout, page.navigate(url, timeout)).await {
            Ok(result) => {
                result.map_err(|e| NavigationError::from_cdp(url, timeout, e))?
            }
            Err(_) => {
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                    after: timeout,
                });
            }
        };
        let page_load = start.elapsed();

        if !outcome.is_ok() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: outcome.status.unwrap_or_default(),
            });
        }
        Ok((outcome, page_load))
    }

    /// Close a loaded page. Close failures are logged, never returned.
    pub async fn close_session(&self, page: LoadedPage<D::Page>) {
        debug!("Closing session for {}", page.url());
        page.close().await;
    }

    /// Run `f` against a freshly loaded page and close it afterwards.
    pub async fn with_session<T, F>(&self, url: &str, f: F) -> Result<T, NavigationError>
    where
        F: for<'a> FnOnce(&'a LoadedPage<D::Page>) -> BoxFuture<'a, T>,
    {
        let page = self.open_session(url).await?;
        let value = f(&page).await;
        self.close_session(page).await;
        Ok(value)
    }

    /// Load `url` and extract its evidence document.
    pub async fn crawl(&self, url: &str) -> Result<EvidenceDocument, NavigationError> {
        self.with_session(url, |page| {
            Box::pin(extract_evidence(page.probe(), page.url(), page.page_load()))
        })
        .await
    }

    /// Close the browser connection and terminate a browser we launched.
    pub async fn shutdown(&self) {
        self.driver.shutdown().await;
    }
}

/// Crawl one URL with a browser used only for this call.
///
/// The browser gets its own port and profile, so concurrent calls never
/// share or terminate each other's Chrome.
pub async fn crawl_page(url: &str, config: &Config) -> Result<EvidenceDocument, NavigationError> {
    let driver = ChromeDriver::dedicated(config.browser.clone(), &config.extraction);
    let crawler = Crawler::with_driver(driver, config);
    let result = crawler.crawl(url).await;
    crawler.shutdown().await;
    result
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
