//! Typed response shapes consumed by the dashboard screens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A displayable scalar coming back from the cloud connector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(serde_json::Number),
    Text(String),
    Flag(bool),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Number(value.into())
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

/// `cloud-connector/status`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub metrics: BTreeMap<String, MetricValue>,
    /// Unit key per metric; metrics without an entry have no unit.
    #[serde(default)]
    pub units: BTreeMap<String, String>,
}

/// `devices`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicesPayload {
    pub devices: Vec<String>,
}

/// `devices/{id}/show`
///
/// Every field corresponds 1:1 to a data marker on the device screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatsPayload {
    pub uptime: MetricValue,
    pub received_messages: MetricValue,
    pub received_messages_per_second: MetricValue,
    pub sent_messages: MetricValue,
    pub sent_messages_per_second: MetricValue,
}

impl DeviceStatsPayload {
    /// Fields in display order.
    pub fn entries(&self) -> [(&'static str, &MetricValue); 5] {
        [
            ("uptime", &self.uptime),
            ("received_messages", &self.received_messages),
            (
                "received_messages_per_second",
                &self.received_messages_per_second,
            ),
            ("sent_messages", &self.sent_messages),
            ("sent_messages_per_second", &self.sent_messages_per_second),
        ]
    }
}

/// Flat `{key: scalar}` object used by polling ticks.
pub type FlatMetrics = BTreeMap<String, MetricValue>;

/// Reply to `devices/command/{id}` and `devices/query/{id}`.
///
/// The hub reports device failures (not connected, timeout) as text in
/// `errors`; an empty string means none.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub errors: String,
}

impl DeviceResponse {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
