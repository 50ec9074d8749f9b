use super::*;

#[test]
fn test_find_chrome_prefers_configured_path() {
    let fake = tempfile::NamedTempFile::new().unwrap();
    let found = ChromeDriver::find_chrome(Some(fake.path()));
    assert_eq!(found.as_deref(), Some(fake.path()));
}

#[test]
fn test_find_chrome_missing_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-chrome");
    assert!(ChromeDriver::find_chrome(Some(&missing)).is_none());
}

#[test]
fn test_launch_args_headless() {
    let config = BrowserConfig {
        extra_args: vec!["--lang=en-US".to_string()],
        ..Default::default()
    };
    let args = ChromeDriver::launch_args(&config, 9333, Path::new("/tmp/profile"));

    assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
    assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
    assert!(args.contains(&"--window-size=1920,1080".to_string()));
    assert!(args.contains(&"--headless=new".to_string()));
    assert!(args.contains(&"--no-sandbox".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("--lang=en-US"));
}

#[test]
fn test_launch_args_headed() {
    let config = BrowserConfig {
        headless: false,
        ..Default::default()
    };
    let args = ChromeDriver::launch_args(&config, 9222, Path::new("/tmp/profile"));
    assert!(!args.iter().any(|a| a.starts_with("--headless")));
}

#[test]
fn test_launch_args_os_assigned_port() {
    let args = ChromeDriver::launch_args(&BrowserConfig::default(), 0, Path::new("/tmp/p1"));
    assert!(args.contains(&"--remote-debugging-port=0".to_string()));
    assert!(args.contains(&"--user-data-dir=/tmp/p1".to_string()));
}

#[test]
fn test_parse_active_port() {
    assert_eq!(
        ChromeDriver::parse_active_port("41235\n/devtools/browser/5f0c\n"),
        Some(41235)
    );
    assert_eq!(ChromeDriver::parse_active_port("41235"), Some(41235));
    assert_eq!(ChromeDriver::parse_active_port(""), None);
    assert_eq!(ChromeDriver::parse_active_port("0\n"), None);
    // Half-written file
    assert_eq!(ChromeDriver::parse_active_port("41x"), None);
}

#[tokio::test]
async fn test_wait_for_active_port_sees_late_file() {
    let profile = tempfile::tempdir().unwrap();
    let file = profile.path().join("DevToolsActivePort");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::fs::write(&file, "50123\n/devtools/browser/abc\n")
            .await
            .unwrap();
    });

    let port = ChromeDriver::wait_for_active_port(profile.path(), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(port, 50123);
}

#[tokio::test]
async fn test_wait_for_active_port_times_out() {
    let profile = tempfile::tempdir().unwrap();
    let err = ChromeDriver::wait_for_active_port(profile.path(), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, BrowserError::LaunchFailed(_)), "{err:?}");
}

/// Stub answering `/json/version` like a browser someone else started.
async fn foreign_browser() -> wiremock::MockServer {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_shared_driver_attaches_to_running_browser() {
    let server = foreign_browser().await;
    let missing = tempfile::tempdir().unwrap().path().join("no-chrome");
    let config = BrowserConfig {
        debug_port: server.address().port(),
        chrome_path: Some(missing),
        ..Default::default()
    };

    // Attaches instead of launching, then fails on the stub's empty version info.
    let err = ChromeDriver::new(config, &ExtractionConfig::default())
        .connect()
        .await
        .err()
        .unwrap();
    assert!(matches!(err, BrowserError::ConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_dedicated_driver_ignores_browser_on_configured_port() {
    let server = foreign_browser().await;
    let missing = tempfile::tempdir().unwrap().path().join("no-chrome");
    let config = BrowserConfig {
        debug_port: server.address().port(),
        chrome_path: Some(missing),
        ..Default::default()
    };

    let driver = ChromeDriver::dedicated(config, &ExtractionConfig::default());
    let err = driver.connect().await.err().unwrap();
    assert!(matches!(err, BrowserError::ChromeNotFound), "{err:?}");

    // Nothing was launched or attached, so shutdown has nothing to stop.
    driver.shutdown().await;
    assert!(driver.chrome_process.lock().await.is_none());
}

#[tokio::test]
async fn test_nothing_listening_is_not_running() {
    // Port 1 is privileged and never hosts a debugger in test environments.
    let config = BrowserConfig {
        debug_port: 1,
        ..Default::default()
    };
    let driver = ChromeDriver::new(config, &ExtractionConfig::default());
    assert!(!driver.is_chrome_running().await);
}

#[tokio::test]
async fn test_answering_endpoint_is_running() {
    let server = foreign_browser().await;

    let config = BrowserConfig {
        debug_port: server.address().port(),
        ..Default::default()
    };
    let driver = ChromeDriver::new(config, &ExtractionConfig::default());
    assert!(driver.is_chrome_running().await);
}
