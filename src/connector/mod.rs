//! Data source boundary.
//!
//! The dashboard's only network-facing dependency. Components ask a
//! [`DataSource`] for raw JSON and screens turn it into typed payloads with
//! [`decode`], which is where malformed responses become errors instead of
//! placeholder markup. [`fetch_as`] does both steps for callers that hold a
//! source directly.

mod cloud;
mod payloads;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::DataSourceError;

pub use cloud::CloudConnector;
pub use payloads::{
    DeviceResponse, DeviceStatsPayload, DevicesPayload, FlatMetrics, MetricValue, StatusPayload,
};

/// Path of the connector status endpoint.
pub const STATUS_PATH: &str = "cloud-connector/status";

/// Path of the connected devices list.
pub const DEVICES_PATH: &str = "devices";

/// Relative resource identifier resolved by a data source. Immutable once
/// built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchPath(String);

impl FetchPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FetchPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Kind of payload submission on the device control screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Command,
    Query,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Command => "command",
            CommandKind::Query => "query",
        }
    }
}

/// `devices/{id}/show`. The id is used as given.
pub fn show_device_path(device_id: &str) -> FetchPath {
    FetchPath(format!("devices/{}/show", device_id))
}

/// `devices/command/{id}` or `devices/query/{id}`.
pub fn command_path(kind: CommandKind, device_id: &str) -> FetchPath {
    FetchPath(format!("devices/{}/{}", kind.as_str(), device_id))
}

/// Fetch JSON for a path.
///
/// One round trip per call: no retry, no caching, no sharing of identical
/// in-flight requests.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, path: &FetchPath) -> Result<serde_json::Value, DataSourceError>;

    /// Post form fields and return the JSON reply.
    async fn submit(
        &self,
        path: &FetchPath,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DataSourceError>;

    /// Path of a device's detail resource.
    fn derived_path(&self, device_id: &str) -> FetchPath {
        show_device_path(device_id)
    }
}

/// Decode a raw response into `T`, naming the path on failure.
pub fn decode<T: DeserializeOwned>(
    path: &FetchPath,
    value: serde_json::Value,
) -> Result<T, DataSourceError> {
    serde_json::from_value(value).map_err(|e| DataSourceError::Schema {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Fetch and validate in one step.
pub async fn fetch_as<T: DeserializeOwned>(
    source: &dyn DataSource,
    path: &FetchPath,
) -> Result<T, DataSourceError> {
    let value = source.fetch(path).await?;
    decode(path, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(serde_json::Value);

    #[async_trait]
    impl DataSource for Fixed {
        async fn fetch(&self, _path: &FetchPath) -> Result<serde_json::Value, DataSourceError> {
            Ok(self.0.clone())
        }

        async fn submit(
            &self,
            _path: &FetchPath,
            _form: &[(&str, &str)],
        ) -> Result<serde_json::Value, DataSourceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn device_paths() {
        assert_eq!(show_device_path("a1").as_str(), "devices/a1/show");
        assert_eq!(
            command_path(CommandKind::Command, "a1").as_str(),
            "devices/command/a1"
        );
        assert_eq!(
            command_path(CommandKind::Query, "a1").as_str(),
            "devices/query/a1"
        );
        assert_eq!(Fixed(json!(null)).derived_path("b2").as_str(), "devices/b2/show");
    }

    #[tokio::test]
    async fn fetch_as_decodes_typed_payload() {
        let source = Fixed(json!({"devices": ["a1", "b2"]}));
        let payload: DevicesPayload = fetch_as(&source, &DEVICES_PATH.into()).await.unwrap();
        assert_eq!(payload.devices, vec!["a1", "b2"]);
    }

    #[tokio::test]
    async fn fetch_as_reports_schema_errors_with_path() {
        let source = Fixed(json!({"device": []}));
        let err = fetch_as::<DevicesPayload>(&source, &DEVICES_PATH.into())
            .await
            .unwrap_err();

        assert!(matches!(err, DataSourceError::Schema { .. }));
        assert_eq!(err.path(), "devices");
    }
}
