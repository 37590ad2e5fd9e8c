//! Mock servers for connector integration testing
//!
//! These mock servers simulate the device hub REST API, allowing full
//! integration testing without a running cloud connector.

pub mod cloud;

pub use cloud::{MockCloudServer, RecordedRequest};
