//! Live message counters for a single device.

use std::time::Duration;

use crate::connector::{decode, DataSource, DeviceStatsPayload, FetchPath, FlatMetrics};
use crate::dom::{Element, Node};
use crate::error::DataSourceError;
use crate::lifecycle::Screen;
use crate::locale::Translate;
use crate::polling::{PatchSource, DEFAULT_REFRESH_INTERVAL};
use crate::views::{MetricRecord, MetricView};

pub struct DeviceDetailView {
    device_id: String,
    path: FetchPath,
    refresh_interval: Duration,
}

impl DeviceDetailView {
    /// The detail path comes from the data source so hosts with another
    /// URL layout only need to override `derived_path`.
    pub fn new(source: &dyn DataSource, device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        Self {
            path: source.derived_path(&device_id),
            device_id,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl Screen for DeviceDetailView {
    fn fetch_path(&self) -> FetchPath {
        self.path.clone()
    }

    fn compose(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
        locale: &dyn Translate,
    ) -> Result<Vec<Node>, DataSourceError> {
        let stats: DeviceStatsPayload = decode(path, payload)?;
        let view = MetricView::line();

        let line = |key: &str, value: &dyn std::fmt::Display, unit: String| {
            let record = MetricRecord::new(key, value, locale.translate(key), locale.icon_for(key))
                .with_unit(unit);
            view.render(&record)
        };

        let mut entries = stats.entries().into_iter();
        let mut status = Element::new("div").class("status");
        if let Some((key, value)) = entries.next() {
            status = status.child(line(key, value, locale.translate("secs")));
        }
        let messages = Element::new("div")
            .class("messages")
            .children(entries.map(|(key, value)| line(key, value, String::new())));

        Ok(vec![status.into(), messages.into()])
    }
}

impl PatchSource for DeviceDetailView {
    fn patches(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
    ) -> Result<Vec<(String, String)>, DataSourceError> {
        let metrics: FlatMetrics = decode(path, payload)?;
        Ok(metrics
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect())
    }

    fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}
