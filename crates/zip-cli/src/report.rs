//! End-of-day reporting: per-order records and aggregate counts.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use zip_core::{Flight, FleetManager, Order, OrderId, Priority};

/// What happened to an order by the end of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Package dropped at the hospital
    Delivered,
    /// Launched, but the Zip had not reached the stop yet
    InFlight,
    /// Never launched
    Unfulfilled,
    /// Refused at admission; out of range
    Rejected,
}

/// One row of `deliveries.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
    pub order_id: OrderId,
    pub order_time: u32,
    pub hospital: String,
    pub priority: Priority,
    pub status: DeliveryStatus,
    pub flight: Option<u64>,
    pub launch_time: Option<u32>,
    pub delivered_time: Option<u32>,
}

impl DeliveryRecord {
    /// Records for every stop on a launched flight.
    pub fn from_flight(flight: &Flight, groundspeed_mps: f64) -> Vec<DeliveryRecord> {
        flight
            .stops()
            .iter()
            .zip(flight.delivery_schedule(groundspeed_mps))
            .map(|(order, delivery)| DeliveryRecord {
                order_id: order.id,
                order_time: order.time,
                hospital: order.site.clone(),
                priority: order.priority,
                status: DeliveryStatus::InFlight,
                flight: Some(flight.number()),
                launch_time: Some(flight.launch_time()),
                delivered_time: Some(delivery.arrival_time),
            })
            .collect()
    }

    fn not_launched(order: &Order, status: DeliveryStatus) -> DeliveryRecord {
        DeliveryRecord {
            order_id: order.id,
            order_time: order.time,
            hospital: order.site.clone(),
            priority: order.priority,
            status,
            flight: None,
            launch_time: None,
            delivered_time: None,
        }
    }

    /// Seconds between the order arriving and its flight launching.
    pub fn wait_s(&self) -> Option<u32> {
        self.launch_time
            .map(|launch| launch.saturating_sub(self.order_time))
    }
}

/// One row of `counts.csv`.
#[derive(Debug, Clone, Serialize)]
struct CountRecord {
    fulfilled_orders: usize,
    in_flight_orders: usize,
    unfulfilled_orders: usize,
    rejected_orders: usize,
    flights_launched: u64,
}

/// Outcome of a simulated day.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub end_time: u32,
    pub flights_launched: u64,
    pub orders_received: usize,
    pub orders_delivered: usize,
    pub orders_in_flight: usize,
    pub orders_unfulfilled: usize,
    pub orders_rejected: usize,
    /// Orders whose Zip had landed back at the Nest
    pub orders_completed: usize,
    pub mean_emergency_wait_s: Option<f64>,
    pub mean_resupply_wait_s: Option<f64>,
    #[serde(skip)]
    pub records: Vec<DeliveryRecord>,
}

impl SimulationReport {
    /// Assemble the report from the fleet state at `end_time`.
    ///
    /// `launched` holds records for every launched stop, `rejected` the
    /// orders refused at admission and `late` those arriving after the
    /// horizon.
    pub fn build(
        fleet: &FleetManager,
        end_time: u32,
        launched: Vec<DeliveryRecord>,
        rejected: &[Order],
        late: &[Order],
    ) -> Self {
        let mut records: Vec<DeliveryRecord> = launched
            .into_iter()
            .map(|mut record| {
                let dropped = record
                    .delivered_time
                    .is_some_and(|delivered| delivered <= end_time);
                record.status = if dropped {
                    DeliveryStatus::Delivered
                } else {
                    DeliveryStatus::InFlight
                };
                record
            })
            .collect();

        records.extend(
            fleet
                .unfulfilled_orders()
                .iter()
                .chain(late)
                .map(|order| DeliveryRecord::not_launched(order, DeliveryStatus::Unfulfilled)),
        );
        records.extend(
            rejected
                .iter()
                .map(|order| DeliveryRecord::not_launched(order, DeliveryStatus::Rejected)),
        );
        records.sort_by_key(|record| record.order_id);

        let count = |status| records.iter().filter(|r| r.status == status).count();

        Self {
            end_time,
            flights_launched: fleet.flights_launched(),
            orders_received: records.len(),
            orders_delivered: count(DeliveryStatus::Delivered),
            orders_in_flight: count(DeliveryStatus::InFlight),
            orders_unfulfilled: count(DeliveryStatus::Unfulfilled),
            orders_rejected: count(DeliveryStatus::Rejected),
            orders_completed: fleet.completed_order_count(),
            mean_emergency_wait_s: mean_wait(&records, Priority::Emergency),
            mean_resupply_wait_s: mean_wait(&records, Priority::Resupply),
            records,
        }
    }

    pub fn write_deliveries<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(output);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_counts<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(output);
        writer.serialize(CountRecord {
            fulfilled_orders: self.orders_delivered,
            in_flight_orders: self.orders_in_flight,
            unfulfilled_orders: self.orders_unfulfilled,
            rejected_orders: self.orders_rejected,
            flights_launched: self.flights_launched,
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Write `deliveries.csv` and `counts.csv` into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let deliveries = dir.join("deliveries.csv");
        let file = File::create(&deliveries)
            .with_context(|| format!("creating {}", deliveries.display()))?;
        self.write_deliveries(file)
            .with_context(|| format!("writing {}", deliveries.display()))?;

        let counts = dir.join("counts.csv");
        let file =
            File::create(&counts).with_context(|| format!("creating {}", counts.display()))?;
        self.write_counts(file)
            .with_context(|| format!("writing {}", counts.display()))?;

        tracing::info!(
            records = self.records.len(),
            dir = %dir.display(),
            "Wrote delivery reports"
        );
        Ok(())
    }
}

fn mean_wait(records: &[DeliveryRecord], priority: Priority) -> Option<f64> {
    let waits: Vec<u32> = records
        .iter()
        .filter(|record| record.priority == priority)
        .filter_map(DeliveryRecord::wait_s)
        .collect();
    if waits.is_empty() {
        return None;
    }
    let total: u64 = waits.iter().map(|&w| u64::from(w)).sum();
    Some(total as f64 / waits.len() as f64)
}
