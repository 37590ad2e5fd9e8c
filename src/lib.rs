//! Device Hub Dashboard - Rust Implementation
//!
//! Rendering layer for a device-telemetry dashboard backed by a cloud
//! connector's JSON API.
//!
//! This library provides:
//! - A shared document of mount points with targeted text patching
//! - A render lifecycle (preloader, fetch, settle delay, swap)
//! - A polling refresh engine that patches individual metrics in place
//! - Metric and table formatters plus the four dashboard screens
//! - An HTTP data source and an axum host for the live page

pub mod bus;
pub mod config;
pub mod connector;
pub mod dom;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod locale;
pub mod polling;
pub mod screens;
pub mod views;
