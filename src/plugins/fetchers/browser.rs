use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use crate::config::ScraperConfig;
use crate::plugins::traits::Fetcher;
use crate::utils::error::AppError;

/// Fetcher for pages that only populate after client-side scripts run.
///
/// Launches a fresh headless Chrome per fetch, scrolls to the bottom of
/// the page, dwells while scripts load, then captures the rendered DOM.
/// The browser is dropped (and the process reaped) when the fetch ends.
pub struct BrowserFetcher {
    dwell: Duration,
    user_agent: String,
    chrome_path: Option<String>,
}

impl BrowserFetcher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            dwell: Duration::from_secs(config.browser_dwell_secs),
            user_agent: config.user_agent.clone(),
            chrome_path: config.chrome_path.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, _label: &str, url: &str) -> crate::Result<String> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("failed to create launch options: {e}")))?;

        if let Some(chrome_path) = &self.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("failed to launch browser: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("failed to create tab: {e}")))?;

        tab.set_user_agent(&self.user_agent, None, None)
            .map_err(|e| AppError::Browser(format!("failed to set user agent: {e}")))?;

        tab.navigate_to(url)
            .map_err(|e| AppError::Browser(format!("navigation failed: {e}")))?;

        tab.wait_until_navigated()
            .map_err(|e| AppError::Browser(format!("page load failed: {e}")))?;

        // Scroll to the bottom so lazy-loaded listings start fetching,
        // then give scripts time to populate the page.
        tab.evaluate("window.scrollTo(0, document.body.scrollHeight)", false)
            .map_err(|e| AppError::Browser(format!("scroll failed: {e}")))?;
        tokio::time::sleep(self.dwell).await;

        let html = tab
            .get_content()
            .map_err(|e| AppError::Browser(format!("failed to get page content: {e}")))?;

        // Close tab to free resources
        let _ = tab.close(true);

        Ok(html)
    }
}
