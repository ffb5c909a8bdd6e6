//! SMS Core: domain types shared by every crate of the sensor
//! management system.

pub mod authz;
pub mod error;
pub mod interval;
pub mod models;
pub mod repository;
