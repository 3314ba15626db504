//! Simulation driver, clock helpers and synthetic demand.

pub mod clock;
pub mod demand;
pub mod driver;

pub use clock::{format_clock, SECONDS_PER_DAY};
pub use demand::{generate_orders, write_orders, DemandProfile, GeneratedOrder};
pub use driver::Simulation;
