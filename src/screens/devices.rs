//! Table of connected devices linking to their detail page.

use std::time::Duration;

use crate::connector::{decode, DevicesPayload, FetchPath, DEVICES_PATH};
use crate::dom::{Element, Node};
use crate::error::DataSourceError;
use crate::lifecycle::Screen;
use crate::locale::Translate;
use crate::views::{TableData, TableView};

/// Placeholder until the API reports last-seen times.
const UNKNOWN_LAST_CONNECTION: &str = "N/A";

pub struct ConnectedDevicesView {
    path: FetchPath,
}

impl ConnectedDevicesView {
    pub fn new() -> Self {
        Self {
            path: FetchPath::new(DEVICES_PATH),
        }
    }

    pub fn with_path(path: FetchPath) -> Self {
        Self { path }
    }
}

impl Default for ConnectedDevicesView {
    fn default() -> Self {
        Self::new()
    }
}

/// Detail page link for a device. The id is URL-encoded into the query.
pub fn device_link(device_id: &str, label: &str) -> Node {
    Element::new("a")
        .attr("href", format!("device.html?id={}", urlencoding::encode(device_id)))
        .class("waves-effect waves-light btn-small")
        .child(Element::new("i").class("material-icons left").text("cloud"))
        .text(label)
        .into()
}

pub fn devices_table(devices: &[String], locale: &dyn Translate) -> TableData {
    let label = locale.translate("view_device");
    TableData {
        columns: vec![
            "ID".to_string(),
            locale.translate("last_connection"),
            locale.translate("actions"),
        ],
        rows: devices
            .iter()
            .map(|id| {
                vec![
                    Node::text(id.as_str()),
                    Node::text(UNKNOWN_LAST_CONNECTION),
                    device_link(id, &label),
                ]
            })
            .collect(),
    }
}

impl Screen for ConnectedDevicesView {
    fn fetch_path(&self) -> FetchPath {
        self.path.clone()
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(700)
    }

    fn compose(
        &self,
        path: &FetchPath,
        payload: serde_json::Value,
        locale: &dyn Translate,
    ) -> Result<Vec<Node>, DataSourceError> {
        let list: DevicesPayload = decode(path, payload)?;
        let table = TableView::render(&devices_table(&list.devices, locale));
        Ok(vec![Element::new("div").class("row").child(table).into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    #[test]
    fn rows_match_devices() {
        let table = devices_table(&["a1".to_string(), "b2".to_string()], &Locale::english());

        assert_eq!(table.columns, vec!["ID", "Last connection", "Actions"]);
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|row| row.len() == table.columns.len()));
        assert!(table.rows[1][2].to_html().contains(r#"href="device.html?id=b2""#));
    }

    #[test]
    fn link_encodes_device_id() {
        let html = device_link("dev 1&x", "View").to_html();
        assert!(html.contains("device.html?id=dev%201%26x"), "{html}");
    }

    #[test]
    fn spanish_headers() {
        let table = devices_table(&[], &Locale::for_language("es"));
        assert_eq!(table.columns, vec!["ID", "Última conexión", "Acciones"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn settles_longer_than_default() {
        assert_eq!(
            ConnectedDevicesView::new().settle_delay(),
            Duration::from_millis(700)
        );
    }
}
