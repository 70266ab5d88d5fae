use clap::{Parser, Subcommand};
use fullbrand_shows::config::Config;
use fullbrand_shows::distance::{DistanceNormalizer, DistanceRequest};
use fullbrand_shows::{logging, observability, server};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fullbrand_shows")]
#[command(about = "Show bookings, venue distances and dashboard summaries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Compute the driving distance from the home base to one destination
    Distance {
        /// Provider place id of the destination
        #[arg(long, conflicts_with = "address")]
        place_id: Option<String>,
        /// Free-text destination address
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Err(e) = observability::metrics::init() {
                warn!("Metrics disabled: {}", e);
            }
            info!("Starting server on port {}", config.server.port);
            server::start_server(config).await?;
        }
        Commands::Distance { place_id, address } => {
            let request = DistanceRequest { destination_place_id: place_id, destination_address: address };
            let normalizer = DistanceNormalizer::from_config(&config);
            match normalizer.normalize(&request).await {
                Ok(distance) => println!("{}", serde_json::to_string_pretty(&distance)?),
                Err(e) => {
                    eprintln!("{}", serde_json::to_string_pretty(&e.to_body())?);
                    anyhow::bail!("distance lookup failed: {}", e.user_message());
                }
            }
        }
    }

    Ok(())
}
