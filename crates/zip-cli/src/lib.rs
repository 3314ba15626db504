//! Zip CLI - simulation tooling for the Zip dispatch engine.
//!
//! This crate provides the binaries:
//! - zip_sim: replay a day of orders against one Nest and write reports
//! - generate_orders: synthetic order generator for a hospitals file

pub mod config;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod sim;

pub use config::Config;
pub use report::{DeliveryRecord, DeliveryStatus, SimulationReport};
pub use sim::{format_clock, DemandProfile, Simulation};
