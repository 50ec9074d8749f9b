//! Crawler error types.

use std::time::Duration;

use accessprobe_cdp::CdpError;
use thiserror::Error;

use crate::extract::Category;

/// Browser lifecycle errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Page setup failed: {0}")]
    PageSetup(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                BrowserError::ConnectionFailed(msg)
            }
            CdpError::SessionClosed => BrowserError::NotConnected,
            other => BrowserError::PageSetup(other.to_string()),
        }
    }
}

/// The page could not be loaded. The only error that aborts a crawl.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Main document answered with a non-2xx status.
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Network idle was not reached in time.
    #[error("navigation to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// The browser refused or aborted the load (DNS failure, bad scheme, ...).
    #[error("navigation to {url} failed: {reason}")]
    Failed { url: String, reason: String },

    /// Browser could not be launched, connected to, or prepared.
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl NavigationError {
    /// Map a CDP navigation failure for `url`.
    pub(crate) fn from_cdp(url: &str, after: Duration, e: CdpError) -> Self {
        match e {
            CdpError::Timeout(_) => NavigationError::Timeout {
                url: url.to_string(),
                after,
            },
            CdpError::NavigationFailed(reason) => NavigationError::Failed {
                url: url.to_string(),
                reason,
            },
            other => NavigationError::Browser(other.into()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            NavigationError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NavigationError::Timeout { .. })
    }
}

/// A single extractor category failed. Absorbed into warnings by the aggregator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("script evaluation failed: {source}")]
    Script {
        category: Category,
        #[source]
        source: CdpError,
    },

    #[error("unexpected result shape: {source}")]
    Decode {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractError {
    pub fn category(&self) -> Category {
        match self {
            ExtractError::Script { category, .. } | ExtractError::Decode { category, .. } => {
                *category
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cdp_timeout() {
        let err = NavigationError::from_cdp(
            "https://example.com",
            Duration::from_secs(30),
            CdpError::Timeout("exceeded".into()),
        );
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_from_cdp_navigation_failed() {
        let err = NavigationError::from_cdp(
            "https://nope.invalid",
            Duration::from_secs(1),
            CdpError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".into()),
        );
        match err {
            NavigationError::Failed { reason, .. } => {
                assert_eq!(reason, "net::ERR_NAME_NOT_RESOLVED")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_cdp_other_is_browser() {
        let err = NavigationError::from_cdp("u", Duration::ZERO, CdpError::SessionClosed);
        assert!(matches!(
            err,
            NavigationError::Browser(BrowserError::NotConnected)
        ));
    }

    #[test]
    fn test_status_display() {
        let err = NavigationError::Status {
            url: "https://example.com/missing".into(),
            status: 404,
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "https://example.com/missing responded with HTTP 404"
        );
    }

    #[test]
    fn test_extract_error_category() {
        let err = ExtractError::Script {
            category: Category::Colors,
            source: CdpError::JavaScript("boom".into()),
        };
        assert_eq!(err.category(), Category::Colors);
        assert!(err.to_string().contains("boom"));
    }
}
