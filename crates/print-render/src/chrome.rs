//! Chromium-backed [`PdfRenderer`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{NavigateParams, PrintToPdfParams};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::engine::{Backoff, Disconnected, Engine, EngineState, Launcher};
use crate::error::RenderError;
use crate::idle::{NetEvent, wait_for_idle};
use crate::options::LaunchOptions;
use crate::renderer::{A4_HEIGHT_IN, A4_WIDTH_IN, PdfRenderer};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Launches headless Chromium with the configured profile.
pub struct ChromeLauncher {
    options: LaunchOptions,
}

#[async_trait]
impl Launcher for ChromeLauncher {
    type Browser = Browser;

    async fn launch(&self) -> Result<(Browser, Disconnected), RenderError> {
        let config = self.options.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the DevTools socket; when it ends the browser
        // is gone.
        let disconnected: Disconnected = Box::pin(async move {
            while let Some(event) = handler.next().await {
                match event {
                    Ok(()) => {}
                    Err(CdpError::Ws(e)) => {
                        warn!(error = %e, "DevTools connection lost");
                        break;
                    }
                    Err(e) => debug!(error = %e, "DevTools handler error"),
                }
            }
        });

        Ok((browser, disconnected))
    }
}

/// The process-wide browser: one instance, one page per render, bounded
/// render concurrency.
pub struct BrowserEngine {
    engine: Engine<Browser>,
    options: LaunchOptions,
    permits: Arc<Semaphore>,
}

impl BrowserEngine {
    pub async fn launch(options: LaunchOptions) -> Result<Self, RenderError> {
        info!(mode = ?options.mode, args = ?options.args(), "launching browser");
        let launcher = ChromeLauncher {
            options: options.clone(),
        };
        let engine = Engine::start(launcher, Backoff::default()).await?;
        let permits = Arc::new(Semaphore::new(options.max_concurrent_renders.max(1)));
        Ok(Self {
            engine,
            options,
            permits,
        })
    }

    pub async fn state(&self) -> EngineState {
        self.engine.slot().state().await
    }

    /// Renders that could start right now without waiting for a permit.
    pub fn available_render_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Let in-flight renders finish, close the browser over DevTools, and
    /// reap the child process.
    pub async fn shutdown(&self) {
        let slots = self.options.max_concurrent_renders.max(1) as u32;
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, self.permits.acquire_many(slots)).await;
        if drained.is_err() {
            warn!("renders still in flight at shutdown");
        }
        self.permits.close();

        if let Some(browser) = self.engine.shutdown().await {
            match Arc::try_unwrap(browser) {
                Ok(mut browser) => {
                    if let Err(e) = browser.close().await {
                        warn!(error = %e, "browser close failed");
                    }
                    match browser.wait().await {
                        Ok(status) => info!(?status, "browser exited"),
                        Err(e) => warn!(error = %e, "failed to reap browser process"),
                    }
                }
                Err(_) => warn!("browser handle still shared at shutdown, dropping it"),
            }
        }

        if !self.engine.stop(SHUTDOWN_GRACE).await {
            warn!("browser supervisor aborted");
        }
    }

    async fn render_on(&self, page: &Page, source: &Url, output: &Path) -> Result<(), RenderError> {
        page.execute(EnableParams::default()).await?;

        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await?
            .map(|e| NetEvent::Started(e.request_id.clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await?
            .map(|e| NetEvent::Finished(e.request_id.clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await?
            .map(|e| NetEvent::Finished(e.request_id.clone()));
        let events = Box::pin(futures::stream::select(
            started,
            futures::stream::select(finished, failed),
        ));

        let timeout = self.options.render_timeout;
        let settle = async {
            page.goto(NavigateParams::new(source.as_str()))
                .await
                .map_err(|e| RenderError::Navigation {
                    url: source.to_string(),
                    message: e.to_string(),
                })?;
            wait_for_idle(events, self.options.idle_window, self.options.max_inflight).await;
            Ok::<(), RenderError>(())
        };
        tokio::time::timeout(timeout, settle)
            .await
            .map_err(|_| RenderError::Timeout(timeout))??;

        let params = PrintToPdfParams {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            ..Default::default()
        };
        let bytes = page
            .pdf(params)
            .await
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        tokio::fs::write(output, &bytes)
            .await
            .map_err(|source| RenderError::Io {
                path: output.display().to_string(),
                source,
            })?;
        debug!(path = %output.display(), bytes = bytes.len(), "pdf written");
        Ok(())
    }
}

#[async_trait]
impl PdfRenderer for BrowserEngine {
    async fn ready(&self) -> bool {
        self.state().await == EngineState::Ready
    }

    async fn render_to_pdf(&self, source: &Url, output: &Path) -> Result<PathBuf, RenderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RenderError::NotReady("shut down"))?;
        let browser = self.engine.current().await?;

        let page = browser.new_page("about:blank").await?;
        let result = self.render_on(&page, source, output).await;
        if let Err(e) = page.close().await {
            warn!(error = %e, "failed to close page");
        }

        result.map(|()| output.to_path_buf())
    }
}
