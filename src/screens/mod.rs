//! The four dashboard screens and the containers they mount into.

mod control;
mod device_detail;
mod devices;
mod status;

pub use control::{control_form, DeviceControlView, PAYLOAD_FIELD, RESPONSES_ID, SPINNER_ID};
pub use device_detail::DeviceDetailView;
pub use devices::{device_link, devices_table, ConnectedDevicesView};
pub use status::SystemStatusView;

use crate::lifecycle::Component;
use crate::polling::PollingComponent;

pub const SYSTEM_STATUS_SELECTOR: &str = "#system-status";
pub const CONNECTED_DEVICES_SELECTOR: &str = "#connected-devices";
pub const DEVICE_STATUS_SELECTOR: &str = "#device-status";
pub const DEVICE_CONTROL_SELECTOR: &str = "#device-control";

pub type SystemStatus = PollingComponent<SystemStatusView>;
pub type ConnectedDevices = Component<ConnectedDevicesView>;
pub type DeviceDetail = PollingComponent<DeviceDetailView>;
