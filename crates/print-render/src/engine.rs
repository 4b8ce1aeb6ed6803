//! Browser lifecycle supervision.
//!
//! `Uninitialized -> Launching -> Ready -> Disconnected -> Launching -> Ready ...`
//!
//! One supervisor task owns the connection future of the current browser.
//! When it resolves the browser is gone; the supervisor marks the slot
//! disconnected and relaunches with capped exponential backoff. Renders in
//! flight on the dead browser fail on their own and are not retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Launching,
    Ready,
    Disconnected,
    ShutDown,
}

impl EngineState {
    fn as_str(self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Launching => "launching",
            EngineState::Ready => "ready",
            EngineState::Disconnected => "disconnected",
            EngineState::ShutDown => "shut down",
        }
    }
}

/// Resolves when the browser's connection ends.
pub type Disconnected = BoxFuture<'static, ()>;

/// Starts one browser instance.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    type Browser: Send + Sync + 'static;

    async fn launch(&self) -> Result<(Self::Browser, Disconnected), RenderError>;
}

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(10),
        }
    }
}

struct Slot<B> {
    state: EngineState,
    browser: Option<Arc<B>>,
    generation: u64,
}

/// The shared browser handle plus its lifecycle state.
pub struct EngineSlot<B> {
    inner: RwLock<Slot<B>>,
}

impl<B> Default for EngineSlot<B> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Slot {
                state: EngineState::Uninitialized,
                browser: None,
                generation: 0,
            }),
        }
    }
}

impl<B> EngineSlot<B> {
    pub async fn state(&self) -> EngineState {
        self.inner.read().await.state
    }

    /// Number of successful launches so far.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// The live browser, or an error naming the current state.
    pub async fn current(&self) -> Result<Arc<B>, RenderError> {
        let slot = self.inner.read().await;
        match (&slot.state, &slot.browser) {
            (EngineState::Ready, Some(browser)) => Ok(Arc::clone(browser)),
            (state, _) => Err(RenderError::NotReady(state.as_str())),
        }
    }

    async fn transition(&self, next: EngineState) -> bool {
        let mut slot = self.inner.write().await;
        if slot.state == EngineState::ShutDown {
            return false;
        }
        slot.state = next;
        if next != EngineState::Ready {
            slot.browser = None;
        }
        true
    }

    async fn install(&self, browser: B) -> Option<u64> {
        let mut slot = self.inner.write().await;
        if slot.state == EngineState::ShutDown {
            return None;
        }
        slot.generation += 1;
        slot.state = EngineState::Ready;
        slot.browser = Some(Arc::new(browser));
        Some(slot.generation)
    }

    async fn shut_down(&self) -> Option<Arc<B>> {
        let mut slot = self.inner.write().await;
        slot.state = EngineState::ShutDown;
        slot.browser.take()
    }
}

/// A launched, self-healing browser.
pub struct Engine<B> {
    slot: Arc<EngineSlot<B>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl<B: Send + Sync + 'static> Engine<B> {
    /// Launch the first browser and start supervising it. A failed first
    /// launch is returned to the caller; later launches are retried.
    pub async fn start<L>(launcher: L, backoff: Backoff) -> Result<Self, RenderError>
    where
        L: Launcher<Browser = B>,
    {
        let slot = Arc::new(EngineSlot::default());
        slot.transition(EngineState::Launching).await;

        let (browser, disconnected) = match launcher.launch().await {
            Ok(launched) => launched,
            Err(e) => {
                slot.transition(EngineState::Uninitialized).await;
                return Err(e);
            }
        };
        slot.install(browser).await;
        info!("browser launched");

        let task = tokio::spawn(supervise(launcher, Arc::clone(&slot), disconnected, backoff));

        Ok(Self {
            slot,
            supervisor: Mutex::new(Some(task)),
        })
    }

    pub fn slot(&self) -> &EngineSlot<B> {
        &self.slot
    }

    pub async fn current(&self) -> Result<Arc<B>, RenderError> {
        self.slot.current().await
    }

    /// Stop serving and hand back the last browser so the caller can close
    /// it. The supervisor keeps driving the connection until [`Engine::stop`],
    /// so the close handshake can still complete; it no longer relaunches.
    pub async fn shutdown(&self) -> Option<Arc<B>> {
        let browser = self.slot.shut_down().await;
        info!("browser engine shut down");
        browser
    }

    /// Wait up to `grace` for the supervisor to observe the disconnect, then
    /// abort it. Returns whether it exited on its own.
    pub async fn stop(&self, grace: Duration) -> bool {
        let Some(mut task) = self.supervisor.lock().await.take() else {
            return true;
        };
        match tokio::time::timeout(grace, &mut task).await {
            Ok(_) => true,
            Err(_) => {
                task.abort();
                false
            }
        }
    }
}

async fn supervise<L: Launcher>(
    launcher: L,
    slot: Arc<EngineSlot<L::Browser>>,
    mut disconnected: Disconnected,
    backoff: Backoff,
) {
    loop {
        disconnected.await;
        if !slot.transition(EngineState::Disconnected).await {
            return;
        }
        warn!("browser disconnected, relaunching");

        let mut delay = backoff.initial;
        disconnected = loop {
            if !slot.transition(EngineState::Launching).await {
                return;
            }
            match launcher.launch().await {
                Ok((browser, next)) => match slot.install(browser).await {
                    Some(generation) => {
                        info!(generation, "browser relaunched");
                        break next;
                    }
                    None => return,
                },
                Err(e) => {
                    error!(error = %e, retry_in = ?delay, "browser relaunch failed");
                    if !slot.transition(EngineState::Disconnected).await {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(backoff.max);
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::oneshot;

    /// Hands out numbered "browsers"; each can be killed through its sender.
    struct FakeLauncher {
        launches: AtomicU32,
        fail_launches: Vec<u32>,
        kills: std::sync::Mutex<Vec<oneshot::Sender<()>>>,
    }

    impl FakeLauncher {
        fn new(fail_launches: Vec<u32>) -> Arc<Self> {
            Arc::new(Self {
                launches: AtomicU32::new(0),
                fail_launches,
                kills: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn kill_current(&self) {
            if let Some(tx) = self.kills.lock().unwrap().pop() {
                let _ = tx.send(());
            }
        }
    }

    #[async_trait]
    impl Launcher for Arc<FakeLauncher> {
        type Browser = u32;

        async fn launch(&self) -> Result<(u32, Disconnected), RenderError> {
            let n = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_launches.contains(&n) {
                return Err(RenderError::Launch(format!("launch {n} failed")));
            }
            let (tx, rx) = oneshot::channel();
            self.kills.lock().unwrap().push(tx);
            let disconnected: Disconnected = Box::pin(async move {
                let _ = rx.await;
            });
            Ok((n, disconnected))
        }
    }

    fn fast() -> Backoff {
        Backoff {
            initial: Duration::from_millis(5),
            max: Duration::from_millis(20),
        }
    }

    async fn wait_for_generation<B: Send + Sync + 'static>(engine: &Engine<B>, generation: u64) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while engine.slot().generation().await < generation
                || engine.slot().state().await != EngineState::Ready
            {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("engine did not relaunch in time");
    }

    #[tokio::test]
    async fn first_launch_is_ready() {
        let engine = Engine::start(FakeLauncher::new(vec![]), fast()).await.unwrap();
        assert_eq!(engine.slot().state().await, EngineState::Ready);
        assert_eq!(*engine.current().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_first_launch_is_reported() {
        let err = Engine::start(FakeLauncher::new(vec![1]), fast()).await.err();
        assert!(matches!(err, Some(RenderError::Launch(_))));
    }

    #[tokio::test]
    async fn relaunches_after_disconnect() {
        let launcher = FakeLauncher::new(vec![]);
        let engine = Engine::start(Arc::clone(&launcher), fast()).await.unwrap();

        launcher.kill_current();
        wait_for_generation(&engine, 2).await;
        assert_eq!(*engine.current().await.unwrap(), 2);

        launcher.kill_current();
        wait_for_generation(&engine, 3).await;
        assert_eq!(*engine.current().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn keeps_retrying_failed_relaunches() {
        let launcher = FakeLauncher::new(vec![2, 3]);
        let engine = Engine::start(Arc::clone(&launcher), fast()).await.unwrap();

        launcher.kill_current();
        wait_for_generation(&engine, 2).await;
        assert_eq!(*engine.current().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn shutdown_stops_serving() {
        let launcher = FakeLauncher::new(vec![]);
        let engine = Engine::start(Arc::clone(&launcher), fast()).await.unwrap();

        assert_eq!(engine.shutdown().await.as_deref(), Some(&1));
        assert!(matches!(
            engine.current().await,
            Err(RenderError::NotReady("shut down"))
        ));

        // Closing the browser ends its connection; the supervisor exits
        // instead of relaunching.
        launcher.kill_current();
        assert!(engine.stop(Duration::from_secs(1)).await);
        assert_eq!(engine.slot().state().await, EngineState::ShutDown);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_aborts_a_supervisor_that_never_sees_a_disconnect() {
        let launcher = FakeLauncher::new(vec![]);
        let engine = Engine::start(Arc::clone(&launcher), fast()).await.unwrap();

        engine.shutdown().await;
        assert!(!engine.stop(Duration::from_millis(20)).await);
        assert!(engine.stop(Duration::from_millis(20)).await);
    }
}
