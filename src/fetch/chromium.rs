//! Headless Chromium sessions for the rendered fetch strategy
//!
//! Every session launches its own browser process with a throwaway profile
//! directory, so nothing (cookies, cache, proxy settings) is shared between
//! attempts or between concurrent requests.

use crate::fetch::rendered::{BrowserLauncher, BrowserSession};
use crate::fetch::FetchError;
use crate::identity::FetchIdentity;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Interval between two lookups of the readiness selector
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

const BASE_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-networking",
    "--disable-sync",
    "--no-first-run",
    "--window-size=1366,768",
];

/// Launches one headless Chromium per session, using the executable
/// chromiumoxide detects on the system
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn browser_config(
        &self,
        identity: &FetchIdentity,
        profile_dir: &Path,
    ) -> Result<BrowserConfig, FetchError> {
        let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();
        args.push(format!("--user-agent={}", identity.user_agent));

        if let Some(language) = identity.header("Accept-Language") {
            args.push(format!("--accept-lang={}", language));
        }

        if let Some(proxy) = &identity.proxy {
            args.push(format!("--proxy-server={}", proxy));
        }

        BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile_dir)
            .args(args)
            .build()
            .map_err(|e| FetchError::Navigation {
                message: format!("Invalid browser configuration: {}", e),
            })
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(
        &self,
        identity: &FetchIdentity,
    ) -> Result<Box<dyn BrowserSession>, FetchError> {
        let profile_dir =
            std::env::temp_dir().join(format!("sumi-quill-{:016x}", rand::random::<u64>()));
        let config = self.browser_config(identity, &profile_dir)?;

        let (mut browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile(&profile_dir).await;
                return Err(FetchError::Navigation {
                    message: format!("Failed to launch browser: {}", e),
                });
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // The session never existed from the caller's point of view
                let _ = browser.close().await;
                handler_task.abort();
                remove_profile(&profile_dir).await;
                return Err(FetchError::Navigation {
                    message: format!("Failed to open page: {}", e),
                });
            }
        };

        tracing::debug!("Launched browser session (profile {})", profile_dir.display());

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            profile_dir,
        }))
    }
}

/// A live browser process with a single page
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    profile_dir: PathBuf,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), FetchError> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| FetchError::Navigation {
                message: format!("Failed to navigate to {}: {}", url, e),
            })?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str) -> Result<(), FetchError> {
        // Polls until the element shows up; the caller bounds the total wait
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.page
            .content()
            .await
            .map_err(|e| FetchError::Navigation {
                message: format!("Failed to capture page content: {}", e),
            })
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        let ChromiumSession {
            mut browser,
            page: _,
            handler_task,
            profile_dir,
        } = *self;

        let closed = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        remove_profile(&profile_dir).await;

        closed.map(|_| ()).map_err(|e| FetchError::Navigation {
            message: format!("Failed to close browser: {}", e),
        })
    }
}

/// Deletes a session's profile directory, which may not exist yet
async fn remove_profile(profile_dir: &Path) {
    match tokio::fs::remove_dir_all(profile_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!(
            "Could not remove browser profile {}: {}",
            profile_dir.display(),
            e
        ),
    }
}
