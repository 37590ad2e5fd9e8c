//! Refresh engine for components that keep their values live.
//!
//! After a render swaps content in, a polling component arms a recurring
//! loop that re-fetches the same path and patches individual marked nodes
//! in place. The preloader is never shown again and untouched siblings keep
//! their markup.
//!
//! The loop is an owned [`RefreshHandle`]. A component holds at most one:
//! a new render cancels it before the preloader goes up, arming replaces
//! it, and dropping the last clone of the component drops (and cancels)
//! its handle. After [`PollingComponent::shutdown`] nothing arms again.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bus::ViewEvent;
use crate::connector::FetchPath;
use crate::dom::{ContainerId, PatchOutcome};
use crate::error::{DashboardError, DataSourceError, Result};
use crate::lifecycle::{Component, PageContext, Renderable, Screen, ViewCore, ViewState};

/// Default period between refresh ticks.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(3000);

/// Screens whose payload can be split into per-marker text updates.
pub trait PatchSource: Screen {
    /// `(data marker, new text)` pairs for one refresh tick.
    fn patches(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
    ) -> std::result::Result<Vec<(String, String)>, DataSourceError>;

    fn refresh_interval(&self) -> Duration {
        DEFAULT_REFRESH_INTERVAL
    }
}

/// Explicit start/stop control over the refresh loop.
#[async_trait]
pub trait Pollable: Renderable {
    /// Arm the refresh loop, replacing any loop already running. Fails if
    /// the component has never been bound to a container or the interval
    /// is zero; a running loop is kept in both cases.
    async fn start_polling(&self, interval: Duration) -> Result<()>;

    /// Cancel the refresh loop. Safe to call when nothing is armed.
    async fn stop_polling(&self);

    async fn is_polling(&self) -> bool;
}

/// Owned identity of one running refresh loop. Dropping it cancels the loop.
pub struct RefreshHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Default)]
struct RefreshSlot {
    handle: Option<RefreshHandle>,
    halted: bool,
}

enum Tick {
    Continue,
    Detached,
}

async fn refresh_once<S: PatchSource>(core: &ViewCore<S>, container: ContainerId) -> Tick {
    let document = core.mount.document();
    let selector = core.mount.selector();

    if !document.contains(container).await {
        return Tick::Detached;
    }

    let path = core.screen.fetch_path();
    let patches = match core
        .ctx
        .source
        .fetch(&path)
        .await
        .and_then(|payload| core.screen.patches(&path, payload))
    {
        Ok(patches) => patches,
        Err(e) => {
            // A failed tick is reported and the next tick tries again.
            core.report_failure(&e);
            return Tick::Continue;
        }
    };

    for (key, text) in patches {
        match document.patch_text(container, &key, &text).await {
            PatchOutcome::Applied => {
                core.ctx.bus.publish(ViewEvent::Patched {
                    selector: selector.to_string(),
                    key,
                });
            }
            PatchOutcome::NodeMissing => {
                debug!("{}: no node marked {:?}, skipping", selector, key);
                core.ctx.bus.publish(ViewEvent::PatchSkipped {
                    selector: selector.to_string(),
                    key,
                });
            }
            PatchOutcome::ContainerMissing => return Tick::Detached,
        }
    }
    Tick::Continue
}

async fn poll_loop<S: PatchSource>(
    core: Arc<ViewCore<S>>,
    container: ContainerId,
    period: Duration,
    token: CancellationToken,
) {
    let selector = core.mount.selector().to_string();
    let mut ticker = interval_at(Instant::now() + period, period);
    // Ticks never overlap: a slow response pushes the next tick back.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let tick = tokio::select! {
            _ = token.cancelled() => break,
            tick = refresh_once(&core, container) => tick,
        };

        if let Tick::Detached = tick {
            info!("{}: container removed, releasing refresh loop", selector);
            token.cancel();
            core.mount.set_state(ViewState::Detached);
            break;
        }
    }

    debug!("{}: refresh loop stopped", selector);
    core.ctx
        .bus
        .publish(ViewEvent::PollingStopped { selector });
}

/// Component that renders once and then keeps its marked values fresh.
pub struct PollingComponent<S: PatchSource> {
    base: Component<S>,
    refresh: Arc<Mutex<RefreshSlot>>,
}

impl<S: PatchSource> Clone for PollingComponent<S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

impl<S: PatchSource> PollingComponent<S> {
    pub fn new(
        ctx: PageContext,
        selector: impl Into<String>,
        title: impl Into<String>,
        screen: S,
    ) -> Self {
        Self {
            base: Component::new(ctx, selector, title, screen),
            refresh: Arc::new(Mutex::new(RefreshSlot::default())),
        }
    }

    pub fn screen(&self) -> &S {
        self.base.screen()
    }

    pub fn watch_state(&self) -> watch::Receiver<ViewState> {
        self.base.watch_state()
    }

    async fn arm(&self, container: ContainerId, period: Duration) -> Result<()> {
        let core = self.base.core.clone();
        if period.is_zero() {
            return Err(DashboardError::InvalidInterval {
                selector: core.mount.selector().to_string(),
            });
        }

        let mut slot = self.refresh.lock().await;
        if slot.halted {
            debug!("{}: shut down, not arming", core.mount.selector());
            return Ok(());
        }
        if let Some(previous) = slot.handle.take() {
            debug!("{}: replacing refresh loop", core.mount.selector());
            previous.cancel();
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(core.clone(), container, period, token.clone()));
        slot.handle = Some(RefreshHandle { token, task });
        core.mount.set_state(ViewState::Polling);
        info!("{}: polling every {:?}", core.mount.selector(), period);
        Ok(())
    }

    /// Cancel the running loop, if any. Returns whether one was armed.
    async fn disarm(&self) -> bool {
        match self.refresh.lock().await.handle.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop polling for good. Renders still in flight swap their content
    /// in but no longer arm a loop, so no refresh outlives this call.
    pub async fn shutdown(&self) {
        let handle = {
            let mut slot = self.refresh.lock().await;
            slot.halted = true;
            slot.handle.take()
        };
        if let Some(handle) = handle {
            handle.cancel();
            self.settle_after_stop();
        }
    }

    fn settle_after_stop(&self) {
        if self.state() == ViewState::Polling {
            self.base.core.mount.set_state(ViewState::Rendered);
        }
    }
}

#[async_trait]
impl<S: PatchSource> Renderable for PollingComponent<S> {
    fn selector(&self) -> &str {
        self.base.selector()
    }

    fn state(&self) -> ViewState {
        self.base.state()
    }

    /// Any running loop is cancelled first, so a failed re-render leaves
    /// the component `Loading` with nothing polling behind the preloader.
    async fn render(&self) -> Result<Option<String>> {
        self.disarm().await;
        let Some((container, markup)) = self.base.render_cycle().await? else {
            return Ok(None);
        };
        self.arm(container, self.base.screen().refresh_interval()).await?;
        Ok(Some(markup))
    }
}

#[async_trait]
impl<S: PatchSource> Pollable for PollingComponent<S> {
    async fn start_polling(&self, interval: Duration) -> Result<()> {
        let Some(container) = self.base.core.mount.bound() else {
            return Err(DashboardError::NotRendered {
                selector: self.selector().to_string(),
            });
        };
        self.arm(container, interval).await
    }

    async fn stop_polling(&self) {
        if self.disarm().await {
            self.settle_after_stop();
        }
    }

    async fn is_polling(&self) -> bool {
        self.refresh
            .lock()
            .await
            .handle
            .as_ref()
            .is_some_and(RefreshHandle::is_active)
    }
}
