//! Replay a day of hospital orders against one Nest.
//!
//! Usage:
//!   cargo run -p zip-cli --bin zip_sim -- --hospitals hospitals.csv --orders orders.csv

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use zip_cli::{ingest, logging, Config, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hospitals CSV: name, north_m, east_m
    #[arg(long, default_value = "hospitals.csv")]
    hospitals: PathBuf,

    /// Orders CSV: time, hospital, priority
    #[arg(long, default_value = "orders.csv")]
    orders: PathBuf,

    /// Directory for deliveries.csv and counts.csv
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Fleet config JSON; replaces the fleet settings from the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of Zips at the Nest
    #[arg(long)]
    fleet_size: Option<usize>,

    /// Packages a Zip can carry
    #[arg(long)]
    max_packages: Option<usize>,

    /// Zips held back for emergencies
    #[arg(long)]
    reserved: Option<usize>,

    /// Seconds between dispatch polls
    #[arg(long)]
    poll_interval_s: Option<u32>,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_json)?;

    let mut config = Config::from_env();
    if let Some(path) = &args.config {
        config = config.with_fleet_file(path)?;
    }
    if let Some(fleet_size) = args.fleet_size {
        config.fleet.fleet_size = fleet_size;
    }
    if let Some(max_packages) = args.max_packages {
        config.fleet.max_packages_per_flight = max_packages;
    }
    if let Some(reserved) = args.reserved {
        config.fleet.reserved_emergency_vehicles = reserved;
    }
    if let Some(poll_interval_s) = args.poll_interval_s {
        config.poll_interval_s = poll_interval_s;
    }

    let simulation = Simulation::new(&config)?;
    let sites = ingest::load_sites(&args.hospitals)?;
    let orders = ingest::load_orders(&args.orders, &sites)?;

    let report = simulation.run(orders)?;
    report.save(&args.output_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Flights launched:   {}", report.flights_launched);
        println!("Orders received:    {}", report.orders_received);
        println!("Delivered:          {}", report.orders_delivered);
        println!("In flight:          {}", report.orders_in_flight);
        println!("Unfulfilled:        {}", report.orders_unfulfilled);
        println!("Rejected (range):   {}", report.orders_rejected);
        if let Some(wait) = report.mean_emergency_wait_s {
            println!("Mean emergency wait: {wait:.0}s");
        }
        if let Some(wait) = report.mean_resupply_wait_s {
            println!("Mean resupply wait:  {wait:.0}s");
        }
    }
    Ok(())
}
