//! `check-browser` command.

use accessprobe_config::Config;
use accessprobe_crawler::{BrowserDriver, ChromeDriver};

pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let driver = ChromeDriver::new(config.browser.clone(), &config.extraction);

    match ChromeDriver::find_chrome(config.browser.chrome_path.as_deref()) {
        Some(path) => println!("Chrome executable: {}", path.display()),
        None => println!("Chrome executable: not found"),
    }

    let endpoint = config.browser.endpoint();
    if !driver.is_chrome_running().await {
        println!("Debug endpoint {endpoint}: not listening (will launch on scan)");
        return Ok(());
    }

    let client = driver.connect().await?;
    println!("Debug endpoint {endpoint}: {}", client.browser());
    driver.shutdown().await;
    Ok(())
}
