//! Error types for dispatch operations.

use thiserror::Error;

use crate::models::OrderId;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced by the dispatch engine.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Even a solo round trip to the destination exceeds the vehicle range.
    #[error(
        "order {order_id} is unreachable: round trip of {round_trip_m:.0}m exceeds range of {max_range_m:.0}m"
    )]
    UnreachableOrder {
        order_id: OrderId,
        round_trip_m: f64,
        max_range_m: f64,
    },

    /// An order with this id is already waiting in the queue.
    #[error("order {order_id} is already queued")]
    DuplicateOrder { order_id: OrderId },

    /// A planned stop is missing from the request queue.
    ///
    /// The planner only selects from a queue snapshot, so this means the
    /// planner and the queue have diverged.
    #[error("planned stop {order_id} is not in the request queue")]
    QueueDivergence { order_id: OrderId },

    /// The clock driver asked to dispatch at a time earlier than a previous call.
    #[error("clock moved backwards: launch requested at {current}s after {previous}s")]
    ClockRegression { previous: u32, current: u32 },

    /// Fleet configuration failed validation.
    #[error("invalid fleet configuration: {message}")]
    InvalidConfig { message: String },

    /// An order names a site that is not in the registry.
    #[error("unknown site: {name}")]
    UnknownSite { name: String },
}
