//! Zip dispatch engine.
//!
//! Decides, at each scheduling tick, which pending delivery orders to bundle
//! into which flights from a single Nest, under per-flight capacity, round
//! trip range and a reserve of Zips held back for emergencies.

pub mod config;
pub mod error;
pub mod fleet;
pub mod flight;
pub mod geometry;
pub mod models;
pub mod planner;
pub mod queue;

pub use config::FleetConfig;
pub use error::{DispatchError, Result};
pub use fleet::{ActiveFlight, FleetManager};
pub use flight::{Delivery, Flight};
pub use geometry::{distance, Location};
pub use models::{Order, OrderId, Priority, Site, SiteRegistry};
pub use planner::{PlannedRoute, RoutePlanner};
pub use queue::{PendingCounts, RequestQueue};
