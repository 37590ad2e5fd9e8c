//! Assembly of the dashboard screens onto one document.

use futures::future::join_all;
use serde::Serialize;

use crate::config::Config;
use crate::lifecycle::{PageContext, Renderable, ViewState};
use crate::screens::{
    ConnectedDevices, ConnectedDevicesView, DeviceControlView, DeviceDetail, DeviceDetailView,
    SystemStatus, SystemStatusView, CONNECTED_DEVICES_SELECTOR, DEVICE_CONTROL_SELECTOR,
    DEVICE_STATUS_SELECTOR, SYSTEM_STATUS_SELECTOR,
};

/// State of one component as reported by `GET /views`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewStatus {
    pub selector: String,
    pub state: ViewState,
}

/// Every screen shown by the host, sharing one page context.
pub struct Dashboard {
    pub ctx: PageContext,
    pub status: SystemStatus,
    pub devices: ConnectedDevices,
    pub detail: Option<DeviceDetail>,
    pub control: Option<DeviceControlView>,
}

impl Dashboard {
    /// Mount the containers and build the components. The device screens
    /// are only mounted when a device is configured.
    pub async fn assemble(ctx: PageContext, config: &Config) -> Self {
        let locale = ctx.locale.clone();
        let interval = config.refresh_interval();

        ctx.document.mount(SYSTEM_STATUS_SELECTOR).await;
        ctx.document.mount(CONNECTED_DEVICES_SELECTOR).await;

        let status = SystemStatus::new(
            ctx.clone(),
            SYSTEM_STATUS_SELECTOR,
            locale.translate("system_status"),
            SystemStatusView::new().with_refresh_interval(interval),
        );
        let devices = ConnectedDevices::new(
            ctx.clone(),
            CONNECTED_DEVICES_SELECTOR,
            locale.translate("connected_devices"),
            ConnectedDevicesView::new(),
        );

        let (detail, control) = match config.device_id.as_deref() {
            Some(device_id) => {
                ctx.document.mount(DEVICE_STATUS_SELECTOR).await;
                ctx.document.mount(DEVICE_CONTROL_SELECTOR).await;
                let detail = DeviceDetail::new(
                    ctx.clone(),
                    DEVICE_STATUS_SELECTOR,
                    locale.translate("device_status"),
                    DeviceDetailView::new(ctx.source.as_ref(), device_id)
                        .with_refresh_interval(interval),
                );
                let control = DeviceControlView::new(
                    ctx.clone(),
                    DEVICE_CONTROL_SELECTOR,
                    locale.translate("device_control"),
                    device_id,
                );
                (Some(detail), Some(control))
            }
            None => (None, None),
        };

        Self {
            ctx,
            status,
            devices,
            detail,
            control,
        }
    }

    fn components(&self) -> Vec<&dyn Renderable> {
        let mut all: Vec<&dyn Renderable> = vec![&self.status, &self.devices];
        if let Some(detail) = &self.detail {
            all.push(detail);
        }
        if let Some(control) = &self.control {
            all.push(control);
        }
        all
    }

    /// Render every component concurrently. Failures are logged per
    /// component and do not affect the others.
    pub async fn render_all(&self) {
        let components = self.components();
        let results = join_all(components.iter().map(|c| c.render())).await;
        for (component, result) in components.iter().zip(results) {
            match result {
                Ok(Some(_)) => {}
                Ok(None) => tracing::debug!("{}: nothing rendered", component.selector()),
                Err(e) => tracing::warn!("{}: render failed: {}", component.selector(), e),
            }
        }
    }

    /// Cancel every refresh loop for good. A `render_all` still waiting on
    /// a fetch finishes its swap but does not start polling afterwards.
    pub async fn stop_polling(&self) {
        self.status.shutdown().await;
        if let Some(detail) = &self.detail {
            detail.shutdown().await;
        }
    }

    pub fn states(&self) -> Vec<ViewStatus> {
        self.components()
            .into_iter()
            .map(|c| ViewStatus {
                selector: c.selector().to_string(),
                state: c.state(),
            })
            .collect()
    }
}
