//! Simulation configuration from environment.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use zip_core::FleetConfig;

use crate::sim::SECONDS_PER_DAY;

#[derive(Debug, Clone)]
pub struct Config {
    pub fleet: FleetConfig,
    /// Seconds between dispatch polls
    pub poll_interval_s: u32,
    /// Simulation stops before this time (seconds since midnight)
    pub horizon_s: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fleet: FleetConfig::default(),
            poll_interval_s: 60,
            horizon_s: SECONDS_PER_DAY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let fleet = defaults.fleet;
        Self {
            fleet: FleetConfig {
                fleet_size: env_or("ZIP_FLEET_SIZE", fleet.fleet_size),
                max_packages_per_flight: env_or("ZIP_MAX_PACKAGES", fleet.max_packages_per_flight),
                groundspeed_mps: env_or("ZIP_GROUNDSPEED_MPS", fleet.groundspeed_mps),
                max_range_m: env_or("ZIP_MAX_RANGE_M", fleet.max_range_m),
                reserved_emergency_vehicles: env_or(
                    "ZIP_RESERVED_EMERGENCY",
                    fleet.reserved_emergency_vehicles,
                ),
            },
            poll_interval_s: env_or("ZIP_POLL_INTERVAL_S", defaults.poll_interval_s),
            horizon_s: env_or("ZIP_HORIZON_S", defaults.horizon_s),
        }
    }

    /// Replace the fleet section with one read from a JSON file.
    pub fn with_fleet_file(mut self, path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading fleet config {}", path.display()))?;
        self.fleet = FleetConfig::from_json(&json)
            .with_context(|| format!("parsing fleet config {}", path.display()))?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.fleet.validate()?;
        anyhow::ensure!(self.poll_interval_s > 0, "poll interval must be at least 1s");
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
