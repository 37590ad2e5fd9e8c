//! Form for sending commands and queries to one device.
//!
//! Unlike the other screens nothing is fetched up front: the form is
//! swapped in as soon as the container resolves. Each submission shows the
//! spinner, posts the payload and appends the JSON reply to the response log.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::bus::ViewEvent;
use crate::connector::{command_path, decode, CommandKind, DeviceResponse};
use crate::dom::{render_html, ContainerId, Document, Element, Node};
use crate::error::{DashboardError, Result};
use crate::lifecycle::{with_heading, Mount, PageContext, Renderable, ViewState};
use crate::locale::Translate;

pub const PAYLOAD_FIELD: &str = "payload";
pub const SPINNER_ID: &str = "request-spinner";
pub const RESPONSES_ID: &str = "responses";

/// How long the spinner stays up after a reply arrives.
const SPINNER_LINGER: Duration = Duration::from_millis(300);

struct ControlCore {
    ctx: PageContext,
    mount: Mount,
    title: String,
    device_id: String,
}

#[derive(Clone)]
pub struct DeviceControlView {
    core: Arc<ControlCore>,
}

fn spinner_opacity(visible: bool) -> String {
    format!("opacity: {}", if visible { 1 } else { 0 })
}

fn submit_button(kind: CommandKind, label: String, icon: String) -> Node {
    Element::new("button")
        .class("btn waves-effect waves-light")
        .attr("type", "submit")
        .attr("name", "action")
        .attr("value", kind.as_str())
        .text(label)
        .child(Element::new("i").class("material-icons right").text(icon))
        .into()
}

/// Form body: payload input, the two send buttons and the response log.
pub fn control_form(locale: &dyn Translate) -> Vec<Node> {
    let spinner = Element::new("div")
        .id(SPINNER_ID)
        .class("preloader-wrapper small active")
        .attr("style", spinner_opacity(false))
        .child(Element::new("div").class("spinner-layer"));

    let form = Element::new("form")
        .id("payload-form")
        .attr("method", "post")
        .child(
            Element::new("div")
                .class("input-field")
                .child(
                    Element::new("textarea")
                        .id(PAYLOAD_FIELD)
                        .attr("name", PAYLOAD_FIELD)
                        .class("materialize-textarea"),
                )
                .child(
                    Element::new("label")
                        .attr("for", PAYLOAD_FIELD)
                        .text(locale.translate("payload_to_send")),
                ),
        )
        .child(submit_button(
            CommandKind::Command,
            locale.translate("send_as_command"),
            locale.icon_for("send_command"),
        ))
        .child(submit_button(
            CommandKind::Query,
            locale.translate("send_as_query"),
            locale.icon_for("send_query"),
        ))
        .child(spinner);

    let responses = Element::new("div")
        .class("input-field")
        .child(
            Element::new("textarea")
                .id(RESPONSES_ID)
                .class("materialize-textarea")
                .attr("readonly", "readonly"),
        )
        .child(
            Element::new("label")
                .attr("for", RESPONSES_ID)
                .text(locale.translate("responses")),
        );

    vec![Element::new("div")
        .class("row")
        .child(form)
        .child(responses)
        .into()]
}

impl DeviceControlView {
    pub fn new(
        ctx: PageContext,
        selector: impl Into<String>,
        title: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        let mount = Mount::new(selector, ctx.document.clone(), ctx.bus.clone());
        Self {
            core: Arc::new(ControlCore {
                ctx,
                mount,
                title: title.into(),
                device_id: device_id.into(),
            }),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.core.device_id
    }

    async fn container(&self) -> Result<ContainerId> {
        let core = &self.core;
        match core.mount.bound() {
            Some(id) if core.ctx.document.contains(id).await => Ok(id),
            _ => Err(DashboardError::NotRendered {
                selector: core.mount.selector().to_string(),
            }),
        }
    }

    /// Post `payload` as a command or query and log the reply.
    ///
    /// A reply is appended even when it reports device errors. When the
    /// request fails or the reply has an unexpected shape the spinner stays
    /// up and nothing is appended.
    pub async fn submit(&self, kind: CommandKind, payload: &str) -> Result<DeviceResponse> {
        let container = self.container().await?;
        let core = &self.core;
        let document = &core.ctx.document;

        document
            .set_attribute(container, SPINNER_ID, "style", &spinner_opacity(true))
            .await;

        let path = command_path(kind, &core.device_id);
        let (raw, reply) = match core
            .ctx
            .source
            .submit(&path, &[(PAYLOAD_FIELD, payload)])
            .await
            .and_then(|raw| decode::<DeviceResponse>(&path, raw.clone()).map(|reply| (raw, reply)))
        {
            Ok(replied) => replied,
            Err(e) => {
                warn!("{}: {}", core.mount.selector(), e);
                core.ctx.bus.publish(ViewEvent::FetchFailed {
                    selector: core.mount.selector().to_string(),
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let line = format!("{}\n", raw);
        if !document.append_text(container, RESPONSES_ID, &line).await {
            warn!("{}: response log missing", core.mount.selector());
        }
        if reply.is_ok() {
            info!("{}: {} sent to {}", core.mount.selector(), kind.as_str(), core.device_id);
        } else {
            warn!(
                "{}: {} to {} failed: {}",
                core.mount.selector(),
                kind.as_str(),
                core.device_id,
                reply.errors
            );
        }

        tokio::spawn(hide_spinner(document.clone(), container));
        Ok(reply)
    }
}

async fn hide_spinner(document: Document, container: ContainerId) {
    tokio::time::sleep(SPINNER_LINGER).await;
    document
        .set_attribute(container, SPINNER_ID, "style", &spinner_opacity(false))
        .await;
}

#[async_trait]
impl Renderable for DeviceControlView {
    fn selector(&self) -> &str {
        self.core.mount.selector()
    }

    fn state(&self) -> ViewState {
        self.core.mount.state()
    }

    async fn render(&self) -> Result<Option<String>> {
        let core = &self.core;
        let Some(container) = core.mount.resolve().await else {
            core.mount.detach();
            return Ok(None);
        };

        let nodes = with_heading(&core.title, control_form(core.ctx.locale.as_ref()));
        let markup = render_html(&nodes);
        if !core.ctx.document.replace_children(container, nodes).await {
            core.mount.detach();
            return Ok(None);
        }
        core.mount.set_state(ViewState::Rendered);
        Ok(Some(markup))
    }
}
