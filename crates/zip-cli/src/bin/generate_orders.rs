//! Generate a synthetic orders CSV for a hospitals file.
//!
//! Usage:
//!   cargo run -p zip-cli --bin generate_orders -- --hospitals hospitals.csv --count 200

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use zip_cli::sim::{generate_orders, write_orders};
use zip_cli::{ingest, logging, DemandProfile};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hospitals CSV: name, north_m, east_m
    #[arg(long, default_value = "hospitals.csv")]
    hospitals: PathBuf,

    /// Output file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of orders
    #[arg(long, default_value_t = 100)]
    count: usize,

    /// Window start, seconds since midnight
    #[arg(long, default_value_t = 8 * 3600)]
    start_s: u32,

    /// Window end, seconds since midnight
    #[arg(long, default_value_t = 20 * 3600)]
    end_s: u32,

    /// Share of emergency orders, 0.0 to 1.0
    #[arg(long, default_value_t = 0.25)]
    emergency_share: f64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(false)?;

    let sites = ingest::load_sites(&args.hospitals)?;
    let profile = DemandProfile {
        orders: args.count,
        start_s: args.start_s,
        end_s: args.end_s,
        emergency_share: args.emergency_share,
        seed: args.seed,
    };
    let orders = generate_orders(&profile, &sites)?;

    match &args.out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_orders(&orders, file)?;
            tracing::info!(path = %path.display(), orders = orders.len(), "Wrote orders");
        }
        None => write_orders(&orders, io::stdout().lock())?,
    }
    Ok(())
}
