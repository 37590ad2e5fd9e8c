//! Connector status grid with live metric cards.

use std::time::Duration;

use crate::connector::{decode, FetchPath, StatusPayload, STATUS_PATH};
use crate::dom::{Element, Node};
use crate::error::DataSourceError;
use crate::lifecycle::Screen;
use crate::locale::Translate;
use crate::polling::{PatchSource, DEFAULT_REFRESH_INTERVAL};
use crate::views::{MetricRecord, MetricView};

pub struct SystemStatusView {
    path: FetchPath,
    refresh_interval: Duration,
}

impl SystemStatusView {
    pub fn new() -> Self {
        Self {
            path: FetchPath::new(STATUS_PATH),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_path(mut self, path: FetchPath) -> Self {
        self.path = path;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

impl Default for SystemStatusView {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SystemStatusView {
    fn fetch_path(&self) -> FetchPath {
        self.path.clone()
    }

    fn compose(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
        locale: &dyn Translate,
    ) -> Result<Vec<Node>, DataSourceError> {
        let status: StatusPayload = decode(path, payload)?;
        let view = MetricView::card();

        let cards = status.metrics.iter().map(|(key, value)| {
            let unit = status
                .units
                .get(key)
                .map(|u| locale.translate(u))
                .unwrap_or_default();
            let record =
                MetricRecord::new(key, value, locale.translate(key), locale.icon_for(key)).with_unit(unit);
            view.render(&record)
        });

        Ok(vec![Element::new("div").class("row").children(cards).into()])
    }
}

impl PatchSource for SystemStatusView {
    fn patches(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
    ) -> Result<Vec<(String, String)>, DataSourceError> {
        let status: StatusPayload = decode(path, payload)?;
        Ok(status
            .metrics
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect())
    }

    fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}
