//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitStream;
use futures::StreamExt;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, CdpResponse, PageInfo};
use crate::session::PageSession;
use crate::transport::{Transport, WsStream};

type WsSource = SplitStream<WsStream>;
type EventHandlers = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CDP client for browser automation.
///
/// Owns one WebSocket to the browser endpoint; page sessions are multiplexed
/// over it with flattened session IDs.
pub struct CdpClient {
    /// HTTP endpoint for target discovery.
    http_endpoint: Url,
    /// Browser WebSocket URL.
    browser_ws_url: String,
    /// Browser product string reported by `/json/version`.
    browser: String,
    transport: Arc<Transport>,
    /// Event channels by session ID.
    event_handlers: EventHandlers,
    /// Background task handle.
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        Self::connect_with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// Connect with an explicit per-request timeout.
    pub async fn connect_with_timeout(
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self, CdpError> {
        let http_endpoint = Url::parse(endpoint)?;
        let version_url = http_endpoint.join("/json/version")?;
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let transport = Arc::new(Transport::new(ws_sink, request_timeout));
        let event_handlers: EventHandlers = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let transport = transport.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, transport, event_handlers).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            browser: version.browser,
            transport,
            event_handlers,
            recv_task,
        })
    }

    /// WebSocket receive loop.
    async fn receive_loop(
        mut ws_source: WsSource,
        transport: Arc<Transport>,
        event_handlers: EventHandlers,
    ) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) if resp.id.is_some() => transport.resolve(resp),
                        Ok(resp) if resp.is_event() => {
                            let session_id = resp.session_id.clone().unwrap_or_default();
                            let handlers = event_handlers.read().await;
                            if let Some(tx) = handlers.get(&session_id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        transport.fail_all();
        // Dropping the senders wakes every session still waiting on events.
        event_handlers.write().await.clear();
    }

    /// Send a browser-level CDP command and wait for the response.
    pub async fn call(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, CdpError> {
        self.transport.call(method, params, None).await
    }

    /// Get browser WebSocket URL.
    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Browser product string, e.g. `HeadlessChrome/124.0.6367.60`.
    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// Whether the receive loop is still running.
    pub fn is_connected(&self) -> bool {
        !self.recv_task.is_finished()
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// Create a new blank page and attach a session to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // Chrome requires PUT method for /json/new
        let create_url = self.http_endpoint.join("/json/new?about:blank")?;

        let client = reqwest::Client::new();
        let page_info: PageInfo = client.put(create_url).send().await?.json().await?;
        debug!("Created new page: {}", page_info.id);

        match self.attach(&page_info.id).await {
            Ok(session) => Ok(session),
            Err(e) => {
                // The target exists even though attaching failed.
                let _ = self.close_target(&page_info.id).await;
                Err(e)
            }
        }
    }

    async fn attach(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.transport.clone(),
            event_rx,
        );

        Ok(session)
    }

    /// Close a page and stop routing its events.
    pub async fn close_page(&self, page: &PageSession) -> Result<(), CdpError> {
        self.event_handlers.write().await.remove(page.session_id());
        self.close_target(page.target_id()).await
    }

    /// Close a target by ID.
    pub async fn close_target(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        debug!("Closed target {}", target_id);
        Ok(())
    }

    /// Close the WebSocket; pending requests fail with [`CdpError::SessionClosed`].
    pub async fn disconnect(&self) {
        self.transport.close().await;
        self.recv_task.abort();
        self.transport.fail_all();
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
