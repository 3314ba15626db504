//! End-to-end: CSV files in, report files out.

use std::fs;

use zip_cli::{ingest, Config, DeliveryStatus, Simulation};
use zip_core::FleetConfig;

const HOSPITALS: &str = "\
Bigobo, 3000, 4000
Gikonko, -12000, 8000
Far Away, 90000, 0
";

const ORDERS: &str = "\
25200, Bigobo, Emergency
25230, Gikonko, Resupply
25240, Far Away, Resupply
25300, Bigobo, Resupply
";

fn config() -> Config {
    Config {
        fleet: FleetConfig {
            fleet_size: 2,
            max_packages_per_flight: 3,
            groundspeed_mps: 30.0,
            max_range_m: 160_000.0,
            reserved_emergency_vehicles: 1,
        },
        poll_interval_s: 60,
        horizon_s: 40_000,
    }
}

#[test]
fn test_day_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let hospitals = dir.path().join("hospitals.csv");
    let orders = dir.path().join("orders.csv");
    fs::write(&hospitals, HOSPITALS).unwrap();
    fs::write(&orders, ORDERS).unwrap();

    let sites = ingest::load_sites(&hospitals).unwrap();
    let orders = ingest::load_orders(&orders, &sites).unwrap();
    assert_eq!(orders.len(), 4);

    let report = Simulation::new(&config()).unwrap().run(orders).unwrap();
    // 180 km out and back is past the range limit.
    assert_eq!(report.orders_rejected, 1);
    assert_eq!(report.records[2].status, DeliveryStatus::Rejected);
    assert_eq!(
        report.orders_delivered + report.orders_in_flight + report.orders_unfulfilled,
        3
    );
    assert_eq!(report.orders_delivered, 3);

    let out = dir.path().join("out");
    report.save(&out).unwrap();
    let deliveries = fs::read_to_string(out.join("deliveries.csv")).unwrap();
    assert_eq!(deliveries.lines().count(), 5);
    assert!(deliveries.contains("Far Away,Resupply,rejected,,,"));
    assert!(out.join("counts.csv").exists());
}

#[test]
fn test_unknown_hospital_fails_load() {
    let sites = ingest::read_sites(HOSPITALS.as_bytes()).unwrap();
    let result = ingest::read_orders("100, Nowhere, Emergency\n".as_bytes(), &sites);
    assert!(result.is_err());
}
