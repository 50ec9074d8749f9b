//! Chrome DevTools Protocol (CDP) client used by the AccessProbe crawler.
//!
//! Connects to Chrome/Chromium over WebSocket and speaks the CDP JSON-RPC
//! protocol. Only the surface needed for read-only page inspection is
//! implemented: target creation, navigation with network-idle detection and
//! main-document status capture, device emulation and script evaluation.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --headless=new --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect and inspect:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://127.0.0.1:9222").await?;
//!    let page = client.new_page().await?;
//!    let outcome = page.navigate("https://example.com", Duration::from_secs(30)).await?;
//!    let title = page.evaluate("document.title").await?;
//!    client.close_page(&page).await?;
//!    ```

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::{NavigationOutcome, PageSession};
