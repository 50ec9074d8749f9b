//! Chrome-backed driver: locates, launches, and connects to Chrome over CDP.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use accessprobe_cdp::{CdpClient, CdpError, DeviceMetrics, NavigationOutcome, PageSession};
use accessprobe_config::{BrowserConfig, ExtractionConfig};
use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{BrowserDriver, BrowserPage, PageProbe};
use crate::error::BrowserError;

const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Well-known install locations, probed in order.
#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];
#[cfg(target_os = "linux")]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];
#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CHROME_CANDIDATES: &[&str] = &[];

/// File Chrome writes into its profile once the debugger listens; the
/// first line is the port it picked.
const ACTIVE_PORT_FILE: &str = "DevToolsActivePort";

/// A Chrome process started by this driver.
struct LaunchedChrome {
    child: Child,
    endpoint: String,
    /// Throwaway profile of a dedicated browser, removed after the process.
    _profile: Option<TempDir>,
}

/// Manages one Chrome instance and the CDP connection to it.
///
/// A shared driver attaches to whatever answers on the configured debug port
/// and launches Chrome there if nothing does. A dedicated driver always
/// launches its own Chrome on an OS-assigned port with a throwaway profile,
/// so concurrent dedicated drivers never see each other's browser.
pub struct ChromeDriver {
    config: BrowserConfig,
    request_timeout: Duration,
    dedicated: bool,
    client: RwLock<Option<Arc<CdpClient>>>,
    chrome_process: Mutex<Option<LaunchedChrome>>,
}

impl ChromeDriver {
    pub fn new(browser: BrowserConfig, extraction: &ExtractionConfig) -> Self {
        Self {
            config: browser,
            request_timeout: extraction.request_timeout(),
            dedicated: false,
            client: RwLock::new(None),
            chrome_process: Mutex::new(None),
        }
    }

    /// Driver that owns a private Chrome; `debug_port` and `profile_dir` are ignored.
    pub fn dedicated(browser: BrowserConfig, extraction: &ExtractionConfig) -> Self {
        Self {
            dedicated: true,
            ..Self::new(browser, extraction)
        }
    }

    /// Resolve the Chrome executable: configured path first, then known locations.
    pub fn find_chrome(configured: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = configured {
            return path.exists().then(|| path.to_path_buf());
        }
        CHROME_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Whether something answers on the debug port.
    pub async fn is_chrome_running(&self) -> bool {
        Self::answers(&self.config.endpoint()).await
    }

    async fn answers(endpoint: &str) -> bool {
        let url = format!("{}/json/version", endpoint);
        match reqwest::get(&url).await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Arguments passed to a Chrome we launch ourselves. Port 0 lets the OS pick.
    pub(crate) fn launch_args(config: &BrowserConfig, port: u16, profile_dir: &Path) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", port),
            format!("--user-data-dir={}", profile_dir.display()),
            format!(
                "--window-size={},{}",
                config.viewport_width, config.viewport_height
            ),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-accelerated-2d-canvas".to_string(),
            "--disable-gpu".to_string(),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }
        args.extend(config.extra_args.iter().cloned());
        args
    }

    /// Port announced in a `DevToolsActivePort` file.
    pub(crate) fn parse_active_port(contents: &str) -> Option<u16> {
        contents
            .lines()
            .next()?
            .trim()
            .parse()
            .ok()
            .filter(|port| *port != 0)
    }

    /// Wait for Chrome to announce its debugger port in `profile_dir`.
    pub(crate) async fn wait_for_active_port(
        profile_dir: &Path,
        timeout: Duration,
    ) -> Result<u16, BrowserError> {
        let path = profile_dir.join(ACTIVE_PORT_FILE);
        let deadline = Instant::now() + timeout;
        loop {
            // Chrome may still be writing the file; retry until it parses.
            if let Ok(contents) = tokio::fs::read_to_string(&path).await {
                if let Some(port) = Self::parse_active_port(&contents) {
                    return Ok(port);
                }
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::LaunchFailed(format!(
                    "Chrome did not report a debugging port within {:?}",
                    timeout
                )));
            }
            tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;
        }
    }

    async fn launch_chrome(&self, port: u16, profile_dir: &Path) -> Result<Child, BrowserError> {
        let chrome_path = Self::find_chrome(self.config.chrome_path.as_deref())
            .ok_or(BrowserError::ChromeNotFound)?;

        if let Err(e) = std::fs::create_dir_all(profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!(
            "Launching {} with profile at {}",
            chrome_path.display(),
            profile_dir.display()
        );

        let child = Command::new(&chrome_path)
            .args(Self::launch_args(&self.config, port, profile_dir))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Endpoint of the configured debug port, launching Chrome there if needed.
    async fn shared_endpoint(&self) -> Result<String, BrowserError> {
        let endpoint = self.config.endpoint();
        if Self::answers(&endpoint).await {
            info!("Chrome already running on port {}", self.config.debug_port);
            return Ok(endpoint);
        }

        info!(
            "Chrome not running on port {}, launching...",
            self.config.debug_port
        );
        let child = self
            .launch_chrome(self.config.debug_port, &self.config.get_profile_dir())
            .await?;
        *self.chrome_process.lock().await = Some(LaunchedChrome {
            child,
            endpoint: endpoint.clone(),
            _profile: None,
        });

        let deadline = Instant::now() + self.config.launch_timeout();
        loop {
            tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;
            if Self::answers(&endpoint).await {
                return Ok(endpoint);
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::LaunchFailed(format!(
                    "Chrome did not open port {} within {:?}",
                    self.config.debug_port,
                    self.config.launch_timeout()
                )));
            }
        }
    }

    /// Endpoint of this driver's own Chrome, launching it on first use.
    async fn dedicated_endpoint(&self) -> Result<String, BrowserError> {
        let mut process = self.chrome_process.lock().await;
        if let Some(launched) = process.as_ref() {
            return Ok(launched.endpoint.clone());
        }

        let profile = tempfile::Builder::new()
            .prefix("accessprobe-profile-")
            .tempdir()
            .map_err(|e| BrowserError::LaunchFailed(format!("profile directory: {}", e)))?;
        let child = self.launch_chrome(0, profile.path()).await?;
        let port = Self::wait_for_active_port(profile.path(), self.config.launch_timeout()).await?;
        let endpoint = format!("http://127.0.0.1:{}", port);
        info!("Dedicated Chrome listening on port {}", port);

        *process = Some(LaunchedChrome {
            child,
            endpoint: endpoint.clone(),
            _profile: Some(profile),
        });
        Ok(endpoint)
    }

    /// Connect to Chrome, launching it when needed.
    pub async fn connect(&self) -> Result<Arc<CdpClient>, BrowserError> {
        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref().filter(|c| c.is_connected()) {
            return Ok(client.clone());
        }
        if slot.take().is_some() {
            warn!("CDP connection lost, reconnecting");
        }

        let endpoint = if self.dedicated {
            self.dedicated_endpoint().await?
        } else {
            self.shared_endpoint().await?
        };

        let client = Arc::new(CdpClient::connect_with_timeout(&endpoint, self.request_timeout).await?);
        info!("Connected to {} at {}", client.browser(), endpoint);
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<ChromePage, BrowserError> {
        let client = self.connect().await?;
        let session = client.new_page().await?;
        debug!("Opened page {}", session.target_id());
        Ok(ChromePage {
            client,
            session,
            closed: AtomicBool::new(false),
        })
    }

    async fn shutdown(&self) {
        if let Some(client) = self.client.write().await.take() {
            client.disconnect().await;
            info!("Browser connection closed");
        }
        if let Some(mut launched) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            if let Err(e) = launched.child.kill().await {
                warn!("Failed to kill Chrome: {}", e);
            }
        }
    }
}

/// One Chrome tab attached through a flattened CDP session.
pub struct ChromePage {
    client: Arc<CdpClient>,
    session: PageSession,
    closed: AtomicBool,
}

#[async_trait]
impl PageProbe for ChromePage {
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        self.session.evaluate(expression).await
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn configure(&self, metrics: DeviceMetrics, user_agent: &str) -> Result<(), CdpError> {
        self.session.set_device_metrics(metrics).await?;
        self.session.set_user_agent(user_agent).await
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<NavigationOutcome, CdpError> {
        self.session.navigate(url, timeout).await
    }

    async fn close(&self) -> Result<(), CdpError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.close_page(&self.session).await?;
        debug!("Closed page {}", self.session.target_id());
        Ok(())
    }
}

#[cfg(test)]
#[path = "chrome_tests.rs"]
mod tests;
