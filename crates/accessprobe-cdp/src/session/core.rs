//! Core session struct and CDP command dispatch.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::error::CdpError;
use crate::protocol::{CdpResponse, DeviceMetrics};
use crate::transport::Transport;

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    pub(super) target_id: String,
    /// Session ID for this target.
    pub(super) session_id: String,
    /// Transport shared with the client.
    pub(super) transport: Arc<Transport>,
    /// Events routed to this session by the client's receive loop.
    pub(super) events: Mutex<mpsc::UnboundedReceiver<CdpResponse>>,
}

impl PageSession {
    /// Create a new page session.
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
        events: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            transport,
            events: Mutex::new(events),
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Turn the event stream navigation tracking relies on on or off.
    ///
    /// Off between navigations so a loaded page stays quiet while scripts run.
    pub(crate) async fn set_navigation_events(&self, enabled: bool) -> Result<(), CdpError> {
        if enabled {
            self.call("Page.enable", None).await?;
            self.call("Network.enable", None).await?;
            self.call(
                "Page.setLifecycleEventsEnabled",
                Some(json!({"enabled": true})),
            )
            .await?;
        } else {
            self.call("Network.disable", None).await?;
            self.call("Page.disable", None).await?;
        }

        debug!(
            "Navigation events {} for session {}",
            if enabled { "enabled" } else { "disabled" },
            self.session_id
        );
        Ok(())
    }

    /// Override the layout viewport.
    pub async fn set_device_metrics(&self, metrics: DeviceMetrics) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(serde_json::to_value(metrics)?),
        )
        .await?;
        Ok(())
    }

    /// Override the user agent for every request this page makes.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<(), CdpError> {
        self.call(
            "Emulation.setUserAgentOverride",
            Some(json!({"userAgent": user_agent})),
        )
        .await?;
        Ok(())
    }
}
