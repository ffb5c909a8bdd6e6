//! SMS Actions: validation and orchestration of mount and location
//! actions plus the inventory they refer to.
//!
//! This crate provides:
//! - Interval overlap and mount coverage checks ([`validation`])
//! - The archival and permission-group gate ([`permission`])
//! - [`ActionService`] for device/platform mounts and locations
//! - [`InventoryService`] for devices, platforms, configurations and
//!   device properties
//! - Activity log aggregation ([`activity::daily_counts`])

pub mod activity;
pub mod error;
pub mod inventory;
pub mod permission;
pub mod service;
pub mod validation;

pub use error::ActionError;
pub use inventory::InventoryService;
pub use service::ActionService;
