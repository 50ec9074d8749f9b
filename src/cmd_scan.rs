//! `scan` command.

use std::path::PathBuf;

use accessprobe_config::Config;
use accessprobe_crawler::{crawl_page, Crawler, NavigationError};
use anyhow::Context;
use tracing::{info, warn};

pub(crate) struct ScanArgs {
    pub url: String,
    pub pretty: bool,
    pub output: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub port: Option<u16>,
    pub chrome: Option<PathBuf>,
    pub headed: bool,
}

impl ScanArgs {
    /// Apply command-line overrides on top of the file configuration.
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(ms) = self.timeout_ms {
            config.extraction.navigation_timeout_ms = ms;
        }
        if let Some(port) = self.port {
            config.browser.debug_port = port;
        }
        if let Some(chrome) = &self.chrome {
            config.browser.chrome_path = Some(chrome.clone());
        }
        if self.headed {
            config.browser.headless = false;
        }
    }
}

/// Reject anything that is not an absolute http(s), file, or data URL.
pub(crate) fn check_url(url: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
    match parsed.scheme() {
        "http" | "https" | "file" | "data" => Ok(()),
        other => anyhow::bail!("unsupported URL scheme: {other}"),
    }
}

/// Crawl with `config`, which already carries this command's overrides.
pub(crate) async fn run(args: ScanArgs, config: Config) -> anyhow::Result<()> {
    check_url(&args.url)?;

    info!("Scanning {}", args.url);
    let result = if args.port.is_some() {
        // Attach to (or start) the browser on the requested port.
        let crawler = Crawler::new(&config);
        let result = crawler.crawl(&args.url).await;
        crawler.shutdown().await;
        result
    } else {
        crawl_page(&args.url, &config).await
    };
    let doc = match result {
        Ok(doc) => doc,
        Err(e @ NavigationError::Browser(_)) => {
            return Err(e).context("browser unavailable (try `accessprobe check-browser`)");
        }
        Err(e) => return Err(e).context("page could not be loaded"),
    };

    for warning in &doc.extraction_metadata.warnings {
        warn!("{}", warning);
    }
    info!(
        "{} images, {} links, {} colour samples in {} ms",
        doc.images.len(),
        doc.links.len(),
        doc.colors.len(),
        doc.extraction_metadata.extraction_time_ms
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ScanArgs {
        ScanArgs {
            url: "https://example.com".into(),
            pretty: false,
            output: None,
            timeout_ms: None,
            port: None,
            chrome: None,
            headed: false,
        }
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let args = ScanArgs {
            timeout_ms: Some(5_000),
            port: Some(9400),
            headed: true,
            ..args()
        };
        args.apply(&mut config);
        assert_eq!(config.extraction.navigation_timeout_ms, 5_000);
        assert_eq!(config.browser.debug_port, 9400);
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = Config::default();
        args().apply(&mut config);
        assert_eq!(config.extraction.navigation_timeout_ms, 30_000);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_check_url() {
        assert!(check_url("https://example.com/page").is_ok());
        assert!(check_url("data:text/html,<p>x</p>").is_ok());
        assert!(check_url("example.com").is_err());
        assert!(check_url("ftp://example.com").is_err());
    }
}
