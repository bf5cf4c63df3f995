use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod gpxxml;
mod photos;
mod summary;

use commands::route::route_command;
use commands::trips::trips_command;

#[derive(Parser)]
#[command(
    name = "tripwrench",
    about = "Reconstruct travel trips from photos and GPX tracks"
)]
struct Cli {
    /// Log every inference and segmentation decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Group photos and track points into trips and write them as GPX")]
    Trips(TripsArgs),
    #[command(about = "Build a GPX route from an ordered list of places")]
    Route(RouteArgs),
}

#[derive(Args)]
pub struct TripsArgs {
    /// GPX files to read track points from (stdin when no input is given)
    #[arg(long = "gpx", value_name = "FILE")]
    pub gpx: Vec<PathBuf>,

    /// JSON photo manifests to read
    #[arg(long = "photos", value_name = "FILE")]
    pub photos: Vec<PathBuf>,

    /// Time gap in hours that starts a new trip
    #[arg(long, default_value_t = 4.0)]
    pub gap: f64,

    /// Distance gap in kilometres that starts a new trip
    #[arg(long, default_value_t = 25.0)]
    pub distance: f64,

    /// Minimum number of points needed to keep a trip
    #[arg(long, default_value_t = 3)]
    pub min_photos: usize,

    /// Infer missing photo locations from neighbours up to this many hours away
    #[arg(long, value_name = "HOURS")]
    pub infer_window: Option<f64>,

    /// Shift photo capture times by this many hours
    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-48..=48)
    )]
    pub tz_shift: i64,

    /// Take the capture time from the file name when a photo has none
    #[arg(long)]
    pub filename_dates: bool,

    /// Keep the GPX points as one trip instead of segmenting them
    #[arg(long, conflicts_with = "photos")]
    pub gpx_as_route: bool,

    /// Only keep points within YYYY-MM-DD:YYYY-MM-DD
    #[arg(long)]
    pub date_range: Option<String>,

    /// JSON file mapping place names to [lat, lon]
    #[arg(long, value_name = "FILE")]
    pub custom_locations: Option<PathBuf>,

    /// Also write a Markdown summary to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Places to visit, in order
    #[arg(long = "city", value_name = "NAME", required = true)]
    pub cities: Vec<String>,

    /// Date of each stop (YYYY-MM-DD), one per city
    #[arg(long = "date", value_name = "DATE", conflicts_with = "start_date")]
    pub dates: Vec<String>,

    /// Date of the first stop; each following stop is one day later
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// JSON file mapping place names to [lat, lon]
    #[arg(long, value_name = "FILE")]
    pub custom_locations: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Trips(args) => trips_command(&args),
        Commands::Route(args) => route_command(&args),
    }
}
