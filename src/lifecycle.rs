//! Render lifecycle shared by every dashboard component.
//!
//! One `render()` call runs: resolve container → preloader → fetch →
//! compose → settle delay → wholesale swap. The preloader always precedes
//! the fetch, and the swap never happens before the settle delay has
//! elapsed from the moment the fetch resolved.
//!
//! Concurrent `render()` calls on one component are allowed and are not
//! de-duplicated. Each runs its own preloader→swap cycle against the same
//! container; the cycle whose swap lands last owns the visible content.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bus::{SharedBus, ViewEvent};
use crate::connector::{DataSource, FetchPath};
use crate::dom::{render_html, ContainerId, Document, Element, Node};
use crate::error::{DataSourceError, Result};
use crate::locale::Translate;

/// Minimum time the preloader stays up after data arrives.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    Idle,
    Loading,
    Rendered,
    Polling,
    /// The container could not be found. Retried on the next `render()`.
    Detached,
}

/// Collaborators shared by every component on a page.
#[derive(Clone)]
pub struct PageContext {
    pub document: Document,
    pub source: Arc<dyn DataSource>,
    pub locale: Arc<dyn Translate>,
    pub bus: SharedBus,
}

/// Screen-specific formatting plugged into the lifecycle.
pub trait Screen: Send + Sync + 'static {
    fn fetch_path(&self) -> FetchPath;

    fn settle_delay(&self) -> Duration {
        DEFAULT_SETTLE_DELAY
    }

    /// Turn a fetched payload into the body shown under the title.
    fn compose(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
        locale: &dyn Translate,
    ) -> std::result::Result<Vec<Node>, DataSourceError>;
}

/// Anything that can be rendered into its container.
#[async_trait]
pub trait Renderable: Send + Sync {
    fn selector(&self) -> &str;

    fn state(&self) -> ViewState;

    /// Render into the container. `Ok(None)` means the container is not in
    /// the document; nothing was fetched or written in that case.
    async fn render(&self) -> Result<Option<String>>;
}

/// A component's binding to its container plus its observable state.
pub struct Mount {
    selector: String,
    document: Document,
    bus: SharedBus,
    bound: OnceLock<ContainerId>,
    state: watch::Sender<ViewState>,
}

impl Mount {
    pub fn new(selector: impl Into<String>, document: Document, bus: SharedBus) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            selector: selector.into(),
            document,
            bus,
            bound: OnceLock::new(),
            state,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn state(&self) -> ViewState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn set_state(&self, state: ViewState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!("{}: {:?} -> {:?}", self.selector, previous, state);
            self.bus.publish(ViewEvent::StateChanged {
                selector: self.selector.clone(),
                state,
            });
        }
    }

    /// Container this component is bound to, if it has been resolved once.
    pub fn bound(&self) -> Option<ContainerId> {
        self.bound.get().copied()
    }

    /// Look the selector up and bind on first success. A component never
    /// moves to another container: once bound, a re-mounted selector counts
    /// as missing.
    pub async fn resolve(&self) -> Option<ContainerId> {
        let found = self.document.resolve(&self.selector).await?;
        let bound = *self.bound.get_or_init(|| found);
        (bound == found).then_some(found)
    }

    /// Mark the component detached and report it.
    pub fn detach(&self) {
        info!("{}: container not found, skipping", self.selector);
        self.set_state(ViewState::Detached);
    }
}

/// Placeholder shown while a component waits for its data.
pub fn preloader(title: &str) -> Vec<Node> {
    vec![
        Element::new("h2").text(title).into(),
        Element::new("div")
            .class("row")
            .child(
                Element::new("div")
                    .class("progress")
                    .child(Element::new("div").class("indeterminate")),
            )
            .into(),
    ]
}

/// Final markup: title heading followed by the screen body.
pub fn with_heading(title: &str, body: Vec<Node>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(body.len() + 1);
    nodes.push(Element::new("h2").text(title).into());
    nodes.extend(body);
    nodes
}

pub(crate) struct ViewCore<S: Screen> {
    pub(crate) ctx: PageContext,
    pub(crate) mount: Mount,
    pub(crate) title: String,
    pub(crate) screen: S,
}

impl<S: Screen> ViewCore<S> {
    pub(crate) fn report_failure(&self, error: &DataSourceError) {
        warn!("{}: {}", self.mount.selector(), error);
        self.ctx.bus.publish(ViewEvent::FetchFailed {
            selector: self.mount.selector().to_string(),
            error: error.to_string(),
        });
    }

    /// One full render cycle. Returns the container and markup on a
    /// completed swap.
    async fn run_cycle(&self) -> Result<Option<(ContainerId, String)>> {
        let Some(container) = self.mount.resolve().await else {
            self.mount.detach();
            return Ok(None);
        };

        self.mount.set_state(ViewState::Loading);
        self.ctx
            .document
            .replace_children(container, preloader(&self.title))
            .await;

        let path = self.screen.fetch_path();
        let body = match self.ctx.source.fetch(&path).await.and_then(|payload| {
            self.screen.compose(&path, payload, self.ctx.locale.as_ref())
        }) {
            Ok(body) => body,
            Err(e) => {
                // The preloader stays up; the host decides what to do.
                self.report_failure(&e);
                return Err(e.into());
            }
        };

        let nodes = with_heading(&self.title, body);
        let markup = render_html(&nodes);

        tokio::time::sleep(self.screen.settle_delay()).await;

        if !self.ctx.document.replace_children(container, nodes).await {
            self.mount.detach();
            return Ok(None);
        }
        self.mount.set_state(ViewState::Rendered);
        info!("{}: rendered {}", self.mount.selector(), path);
        Ok(Some((container, markup)))
    }
}

/// A fetch-and-swap component without a refresh loop.
pub struct Component<S: Screen> {
    pub(crate) core: Arc<ViewCore<S>>,
}

impl<S: Screen> Clone for Component<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<S: Screen> Component<S> {
    pub fn new(
        ctx: PageContext,
        selector: impl Into<String>,
        title: impl Into<String>,
        screen: S,
    ) -> Self {
        let mount = Mount::new(selector, ctx.document.clone(), ctx.bus.clone());
        Self {
            core: Arc::new(ViewCore {
                ctx,
                mount,
                title: title.into(),
                screen,
            }),
        }
    }

    pub fn screen(&self) -> &S {
        &self.core.screen
    }

    pub fn title(&self) -> &str {
        &self.core.title
    }

    pub fn watch_state(&self) -> watch::Receiver<ViewState> {
        self.core.mount.watch_state()
    }

    pub(crate) async fn render_cycle(&self) -> Result<Option<(ContainerId, String)>> {
        self.core.run_cycle().await
    }
}

#[async_trait]
impl<S: Screen> Renderable for Component<S> {
    fn selector(&self) -> &str {
        self.core.mount.selector()
    }

    fn state(&self) -> ViewState {
        self.core.mount.state()
    }

    async fn render(&self) -> Result<Option<String>> {
        Ok(self.render_cycle().await?.map(|(_, markup)| markup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::create_bus;
    use crate::error::DashboardError;
    use crate::locale::Locale;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Source answering every fetch with the same value after a delay.
    struct SlowSource {
        delay: Duration,
        reply: Option<serde_json::Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DataSource for SlowSource {
        async fn fetch(&self, path: &FetchPath) -> std::result::Result<serde_json::Value, DataSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply.clone().ok_or_else(|| DataSourceError::Status {
                path: path.to_string(),
                status: 503,
            })
        }

        async fn submit(
            &self,
            path: &FetchPath,
            _form: &[(&str, &str)],
        ) -> std::result::Result<serde_json::Value, DataSourceError> {
            self.fetch(path).await
        }
    }

    struct Echo;

    impl Screen for Echo {
        fn fetch_path(&self) -> FetchPath {
            FetchPath::new("echo")
        }

        fn compose(
            &self,
            _path: &FetchPath,
            payload: serde_json::Value,
            _locale: &dyn Translate,
        ) -> std::result::Result<Vec<Node>, DataSourceError> {
            Ok(vec![Element::new("p").text(payload.to_string()).into()])
        }
    }

    fn page(reply: Option<serde_json::Value>, delay: Duration) -> (PageContext, Arc<SlowSource>) {
        let source = Arc::new(SlowSource {
            delay,
            reply,
            calls: AtomicUsize::new(0),
        });
        let ctx = PageContext {
            document: Document::new(),
            source: source.clone(),
            locale: Arc::new(Locale::english()),
            bus: create_bus(),
        };
        (ctx, source)
    }

    #[tokio::test(start_paused = true)]
    async fn missing_container_short_circuits() {
        let (ctx, source) = page(Some(json!(1)), Duration::from_millis(10));
        let revision = ctx.document.revision().await;
        let component = Component::new(ctx.clone(), "#nowhere", "Echo", Echo);

        let result = component.render().await.unwrap();

        assert!(result.is_none());
        assert_eq!(component.state(), ViewState::Detached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.document.revision().await, revision);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_delay_counts_from_fetch_resolution() {
        let (ctx, _source) = page(Some(json!("done")), Duration::from_millis(200));
        ctx.document.mount("#echo").await;
        let component = Component::new(ctx.clone(), "#echo", "Echo", Echo);

        let started = Instant::now();
        let markup = component.render().await.unwrap().unwrap();

        assert!(started.elapsed() >= Duration::from_millis(700));
        assert_eq!(markup, r#"<h2>Echo</h2><p>"done"</p>"#);
        assert_eq!(ctx.document.inner_html("#echo").await.unwrap(), markup);
        assert_eq!(component.state(), ViewState::Rendered);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_leaves_preloader_up() {
        let (ctx, _source) = page(None, Duration::from_millis(10));
        ctx.document.mount("#echo").await;
        let component = Component::new(ctx.clone(), "#echo", "Echo", Echo);

        let err = component.render().await.unwrap_err();

        assert!(matches!(
            err,
            DashboardError::DataSource(DataSourceError::Status { status: 503, .. })
        ));
        assert_eq!(component.state(), ViewState::Loading);
        let html = ctx.document.inner_html("#echo").await.unwrap();
        assert!(html.contains("indeterminate"));
    }

    #[tokio::test(start_paused = true)]
    async fn remounted_selector_counts_as_detached() {
        let (ctx, _source) = page(Some(json!(1)), Duration::from_millis(10));
        ctx.document.mount("#echo").await;
        let component = Component::new(ctx.clone(), "#echo", "Echo", Echo);
        component.render().await.unwrap();

        ctx.document.mount("#echo").await;
        let result = component.render().await.unwrap();

        assert!(result.is_none());
        assert_eq!(component.state(), ViewState::Detached);
        assert_eq!(ctx.document.inner_html("#echo").await.as_deref(), Some(""));
    }

    #[tokio::test(start_paused = true)]
    async fn detached_render_is_retried_once_container_appears() {
        let (ctx, _source) = page(Some(json!(1)), Duration::from_millis(10));
        let component = Component::new(ctx.clone(), "#late", "Echo", Echo);
        assert!(component.render().await.unwrap().is_none());

        ctx.document.mount("#late").await;

        assert!(component.render().await.unwrap().is_some());
        assert_eq!(component.state(), ViewState::Rendered);
    }
}
