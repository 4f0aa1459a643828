mod commands;

use clap::{Parser, Subcommand};
use placefinder_core::CoordinateFormat;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placefinder-cli")]
#[command(about = "Search for places around a location from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a place search and print the results as JSON
    Query {
        /// Free-text search, e.g. "largest park in mumbai"
        text: String,
        /// Latitude to search around (skips IP geolocation)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude to search around (skips IP geolocation)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Keep records that fall outside the search region
        #[arg(long)]
        no_enforce_bounds: bool,
        /// Coordinate layout to request and parse: space or comma
        #[arg(long)]
        coordinate_format: Option<CoordinateFormat>,
    },
    /// Print the geolocated (or default) location
    Locate {
        /// Address to look up; omit to locate this machine
        #[arg(long)]
        ip: Option<String>,
    },
    /// Show the scope, region and prompt a query would use, without calling out
    Scope {
        text: String,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Include the full prompt text
        #[arg(long)]
        show_prompt: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so stdout stays valid JSON.
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Query {
            text,
            lat,
            lon,
            no_enforce_bounds,
            coordinate_format,
        } => {
            let overrides = commands::QueryOverrides {
                location: commands::location_arg(lat, lon),
                enforce_bounds: no_enforce_bounds.then_some(false),
                coordinate_format,
            };
            commands::run_query(&text, overrides).await
        }
        Commands::Locate { ip } => commands::run_locate(ip.as_deref()).await,
        Commands::Scope {
            text,
            lat,
            lon,
            show_prompt,
        } => commands::run_scope(&text, commands::location_arg(lat, lon), show_prompt),
    }
}
