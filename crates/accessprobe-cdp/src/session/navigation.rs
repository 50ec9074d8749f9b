//! Navigation operations for CDP page session.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::error::CdpError;
use crate::protocol::CdpResponse;

use super::core::PageSession;

/// What the browser reported about a completed navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOutcome {
    pub frame_id: String,
    /// Loader of the document that reached network idle. Differs from the
    /// one `Page.navigate` returned when the page redirected itself.
    pub loader_id: Option<String>,
    /// HTTP status of the main document; `None` for schemes without one
    /// (`about:`, `data:`, some `file:` loads).
    pub status: Option<u16>,
    /// Wall-clock time from issuing `Page.navigate` to network idle.
    pub elapsed: Duration,
}

impl NavigationOutcome {
    /// Whether the main document response was a success. Missing status counts as success.
    pub fn is_ok(&self) -> bool {
        self.status.is_none_or(|s| (200..300).contains(&s))
    }
}

/// Navigation-relevant event for the main frame being loaded.
#[derive(Debug, PartialEq)]
pub(crate) enum NavigationEvent {
    /// A new document committed in the frame.
    FrameNavigated { loader_id: String },
    DocumentResponse { loader_id: Option<String>, status: u16 },
    NetworkIdle { loader_id: Option<String> },
}

/// Follows the main frame's loader across client-side redirects
/// (`location.replace`, meta refresh) so the wait ends on the document
/// that actually stays.
#[derive(Debug)]
pub(crate) struct NavigationTracker {
    loader_id: Option<String>,
    /// Latest main-document response, with the loader that received it.
    response: Option<(Option<String>, u16)>,
}

impl NavigationTracker {
    pub(crate) fn new(loader_id: Option<String>) -> Self {
        Self {
            loader_id,
            response: None,
        }
    }

    fn is_current(&self, loader_id: Option<&str>) -> bool {
        match (self.loader_id.as_deref(), loader_id) {
            (Some(current), Some(id)) => current == id,
            _ => true,
        }
    }

    /// Apply an event; returns `true` once the current document is idle.
    pub(crate) fn observe(&mut self, event: NavigationEvent) -> bool {
        match event {
            NavigationEvent::FrameNavigated { loader_id } => {
                if self.loader_id.as_deref() != Some(loader_id.as_str()) {
                    debug!(
                        "Frame moved from loader {:?} to {}",
                        self.loader_id, loader_id
                    );
                    self.loader_id = Some(loader_id);
                }
                false
            }
            NavigationEvent::DocumentResponse { loader_id, status } => {
                self.response = Some((loader_id, status));
                false
            }
            NavigationEvent::NetworkIdle { loader_id } => self.is_current(loader_id.as_deref()),
        }
    }

    pub(crate) fn loader_id(&self) -> Option<&str> {
        self.loader_id.as_deref()
    }

    /// Status of the current document, if its response was seen.
    pub(crate) fn status(&self) -> Option<u16> {
        self.response
            .as_ref()
            .filter(|(loader, _)| self.is_current(loader.as_deref()))
            .map(|(_, status)| *status)
    }
}

impl PageSession {
    /// Navigate to URL and wait until the network has gone idle.
    ///
    /// The whole sequence (command, document response, idle) is bounded by
    /// `timeout`. Navigation events are only produced while this runs.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<NavigationOutcome, CdpError> {
        let mut events = self.events.lock().await;
        // Stale lifecycle events from about:blank must not satisfy the wait.
        while events.try_recv().is_ok() {}

        self.set_navigation_events(true).await?;
        let result = tokio::time::timeout(timeout, self.load(url, &mut events))
            .await
            .map_err(|_| {
                CdpError::Timeout(format!("Navigation to {} exceeded {:?}", url, timeout))
            })
            .and_then(|loaded| loaded);

        if let Err(e) = self.set_navigation_events(false).await {
            debug!("Failed to stop navigation events: {}", e);
        }
        while events.try_recv().is_ok() {}

        let outcome = result?;
        debug!(
            "Navigated to {} (status {:?}) in {:?}",
            url, outcome.status, outcome.elapsed
        );
        Ok(outcome)
    }

    async fn load(
        &self,
        url: &str,
        events: &mut UnboundedReceiver<CdpResponse>,
    ) -> Result<NavigationOutcome, CdpError> {
        let start = Instant::now();
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(CdpError::NavigationFailed(error.to_string()));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();
        let mut tracker = NavigationTracker::new(result["loaderId"].as_str().map(str::to_string));

        while let Some(event) = events.recv().await {
            let Some(event) = Self::navigation_event(&event, &frame_id) else {
                continue;
            };
            if tracker.observe(event) {
                return Ok(NavigationOutcome {
                    loader_id: tracker.loader_id().map(str::to_string),
                    status: tracker.status(),
                    frame_id,
                    elapsed: start.elapsed(),
                });
            }
        }
        Err(CdpError::SessionClosed)
    }

    /// Classify an event against the main frame `frame_id`.
    pub(crate) fn navigation_event(event: &CdpResponse, frame_id: &str) -> Option<NavigationEvent> {
        let params = event.params.as_ref()?;
        let loader_id = || params["loaderId"].as_str().map(str::to_string);
        // Responses without a frame id are still attributed to the main frame.
        let in_frame = params["frameId"].as_str().is_none_or(|id| id == frame_id);

        match event.method.as_deref()? {
            "Page.frameNavigated" => {
                let frame = &params["frame"];
                if frame["id"].as_str() != Some(frame_id) || frame.get("parentId").is_some() {
                    return None;
                }
                frame["loaderId"]
                    .as_str()
                    .map(|id| NavigationEvent::FrameNavigated {
                        loader_id: id.to_string(),
                    })
            }
            "Network.responseReceived" if in_frame && params["type"] == "Document" => params
                ["response"]["status"]
                .as_u64()
                .map(|status| NavigationEvent::DocumentResponse {
                    loader_id: loader_id(),
                    status: status as u16,
                }),
            "Page.lifecycleEvent"
                if params["frameId"].as_str() == Some(frame_id) && params["name"] == "networkIdle" =>
            {
                Some(NavigationEvent::NetworkIdle {
                    loader_id: loader_id(),
                })
            }
            _ => None,
        }
    }
}
