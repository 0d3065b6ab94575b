//! Headless Chrome page fetcher using chromiumoxide.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::time::{sleep, Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser wrapper for rendering race card pages
pub struct Browser {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a new headless browser instance
    pub async fn launch() -> Result<Self> {
        let chrome_path = if cfg!(target_os = "macos") {
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"
        } else if cfg!(target_os = "windows") {
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe"
        } else {
            "google-chrome"
        };

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg("--lang=ja-JP")
            .window_size(1280, 1024)
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        // The CDP handler must be polled for the browser to make progress
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self { browser, handle })
    }

    /// Load `url` and return its HTML once `ready_selector` has rendered.
    ///
    /// On timeout the current HTML is returned anyway; the parser decides
    /// whether the page is usable.
    pub async fn fetch_page(&self, url: &str, ready_selector: &str, timeout: Duration) -> Result<String> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| anyhow!("Failed to open {}: {}", url, e))?;

        if !Self::wait_for_selector(&page, ready_selector, timeout).await {
            tracing::debug!("{} did not render {} within {:?}", url, ready_selector, timeout);
        }

        let html = page
            .content()
            .await
            .map_err(|e| anyhow!("Failed to get page content: {}", e));

        let _ = page.close().await;
        html
    }

    async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn close(mut self) -> Result<()> {
        let _ = self.browser.close().await;
        self.handle.abort();
        Ok(())
    }
}
