//! Domain models for the sensor management system.
//!
//! These are the core types shared across all crates.

pub mod activity;
pub mod configuration;
pub mod device;
pub mod device_property;
pub mod location_action;
pub mod mount_action;
pub mod platform;
pub mod principal;
pub mod visibility;
