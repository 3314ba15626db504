//! Fleet configuration, fixed for the lifetime of a dispatcher.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Parameters of one Nest's fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Number of Zips based at the Nest
    pub fleet_size: usize,
    /// Most orders a single flight can carry
    pub max_packages_per_flight: usize,
    /// Constant groundspeed in meters per second
    pub groundspeed_mps: f64,
    /// Longest cumulative round trip a Zip can fly, in meters
    pub max_range_m: f64,
    /// Zips held back from resupply-only flights so emergencies can launch at once
    pub reserved_emergency_vehicles: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            fleet_size: 10,
            max_packages_per_flight: 3,
            groundspeed_mps: 30.0,
            max_range_m: 160_000.0,
            reserved_emergency_vehicles: 3,
        }
    }
}

impl FleetConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FleetConfig =
            serde_json::from_str(json).map_err(|e| DispatchError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can describe a working fleet.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(DispatchError::InvalidConfig { message });

        if self.fleet_size == 0 {
            return invalid("fleet_size must be at least 1".to_string());
        }
        if self.max_packages_per_flight == 0 {
            return invalid("max_packages_per_flight must be at least 1".to_string());
        }
        if !(self.groundspeed_mps.is_finite() && self.groundspeed_mps > 0.0) {
            return invalid(format!(
                "groundspeed_mps must be positive, got {}",
                self.groundspeed_mps
            ));
        }
        if !(self.max_range_m.is_finite() && self.max_range_m > 0.0) {
            return invalid(format!(
                "max_range_m must be positive, got {}",
                self.max_range_m
            ));
        }
        if self.reserved_emergency_vehicles > self.fleet_size {
            return invalid(format!(
                "reserved_emergency_vehicles ({}) exceeds fleet_size ({})",
                self.reserved_emergency_vehicles, self.fleet_size
            ));
        }
        Ok(())
    }
}
