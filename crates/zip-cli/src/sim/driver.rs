//! Clock driver: replays an order stream against one Nest.
//!
//! Time advances one simulated second at a time. Orders are handed to the
//! fleet as soon as their arrival time is reached, and the dispatcher is
//! polled on every multiple of the poll interval.

use anyhow::Result;
use zip_core::{DispatchError, FleetManager, Order};

use super::clock::format_clock;
use crate::config::Config;
use crate::report::{DeliveryRecord, SimulationReport};

pub struct Simulation {
    fleet: FleetManager,
    poll_interval_s: u32,
    horizon_s: u32,
}

impl Simulation {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fleet: FleetManager::new(config.fleet.clone())?,
            poll_interval_s: config.poll_interval_s,
            horizon_s: config.horizon_s,
        })
    }

    pub fn fleet(&self) -> &FleetManager {
        &self.fleet
    }

    /// Run from the first order's arrival until the horizon.
    pub fn run(mut self, mut orders: Vec<Order>) -> Result<SimulationReport> {
        orders.sort_by_key(|order| order.time);
        let groundspeed_mps = self.fleet.config().groundspeed_mps;
        let start = orders.first().map_or(0, |order| order.time);

        let mut arrivals = orders.into_iter().peekable();
        let mut launched: Vec<DeliveryRecord> = Vec::new();
        let mut rejected: Vec<Order> = Vec::new();
        let mut end_time = start.min(self.horizon_s.saturating_sub(1));

        tracing::info!(
            start = %format_clock(start),
            horizon = %format_clock(self.horizon_s),
            fleet_size = self.fleet.config().fleet_size,
            "Starting simulation"
        );

        for now in start..self.horizon_s {
            end_time = now;

            while let Some(order) = arrivals.next_if(|order| order.time <= now) {
                if let Some(order) = self.receive(order, now)? {
                    rejected.push(order);
                }
            }

            if now % self.poll_interval_s != 0 {
                continue;
            }

            for flight in self.fleet.launch_flights(now)? {
                tracing::info!(clock = %format_clock(now), "{flight}");
                launched.extend(DeliveryRecord::from_flight(&flight, groundspeed_mps));
            }
        }

        let late: Vec<Order> = arrivals.collect();
        if !late.is_empty() {
            tracing::warn!(
                orders = late.len(),
                horizon = %format_clock(self.horizon_s),
                "Orders arrive after the horizon and were never queued"
            );
        }

        self.fleet.release_returned(end_time);
        let report = SimulationReport::build(&self.fleet, end_time, launched, &rejected, &late);

        tracing::info!(
            clock = %format_clock(end_time),
            flights = report.flights_launched,
            delivered = report.orders_delivered,
            in_flight = report.orders_in_flight,
            unfulfilled = report.orders_unfulfilled,
            rejected = report.orders_rejected,
            "Simulation finished"
        );
        Ok(report)
    }

    /// Queue an arriving order. Returns the order back if it was rejected.
    fn receive(&mut self, order: Order, now: u32) -> Result<Option<Order>> {
        tracing::info!(
            clock = %format_clock(now),
            order_id = %order.id,
            priority = %order.priority,
            hospital = %order.site,
            "Order received"
        );

        match self.fleet.queue_order(order.clone()) {
            Ok(()) => Ok(None),
            Err(DispatchError::UnreachableOrder { .. }) => Ok(Some(order)),
            Err(err) => Err(err.into()),
        }
    }
}
