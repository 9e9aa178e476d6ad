use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use thumbnail_strategist::app::App;
use thumbnail_strategist::models::parse_bind_addr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "thumbnail-strategist")]
#[command(about = "Generate click-worthy YouTube thumbnails from a title and keywords")]
struct CliArgs {
    /// Address to serve the form on, e.g. 127.0.0.1:8080. Overrides BIND_ADDR.
    #[arg(long, value_name = "HOST:PORT", value_parser = parse_bind_addr)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thumbnail_strategist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting thumbnail-strategist");

    let args = CliArgs::parse();

    match App::new(args.bind) {
        Ok(app) => match app.run().await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
