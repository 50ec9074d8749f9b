//! Endpoint discovery against a stubbed `/json/version`.

use accessprobe_cdp::{CdpClient, CdpError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_connect_rejects_incomplete_version_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "HeadlessChrome/124.0.0.0"
        })))
        .mount(&server)
        .await;

    let err = CdpClient::connect(&server.uri()).await.err().expect("should fail");
    assert!(matches!(err, CdpError::ChromeNotAvailable(_)), "{err:?}");
}

#[tokio::test]
async fn test_connect_fails_when_websocket_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "HeadlessChrome/124.0.0.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/browser/abc"
        })))
        .mount(&server)
        .await;

    let err = CdpClient::connect(&server.uri()).await.err().expect("should fail");
    assert!(matches!(err, CdpError::ConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_connect_without_listener() {
    let err = CdpClient::connect("http://127.0.0.1:1").await.err().expect("should fail");
    assert!(matches!(err, CdpError::ChromeNotAvailable(_)), "{err:?}");
}
