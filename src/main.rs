use std::{process::ExitCode, sync::Arc, time::Instant};

use access_router::{
    Result,
    services::{
        build::build_graph,
        persistence::{load_graph, save_graph},
    },
    structures::Config,
    web,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Barrier-aware pedestrian routing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the cost-annotated network from the configured inputs
    Build {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Serve the GraphQL routing API from a built network
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { config } => build(&config),
        Command::Serve { config } => serve(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn build(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;

    let before = Instant::now();
    let (graph, report) = build_graph(&config.build)?;
    info!(
        "Network built in {}ms: {} nodes, {} edges, {} of {} barriers assigned",
        before.elapsed().as_millis(),
        graph.node_count(),
        graph.edge_count(),
        report.costs.assigned,
        report.barriers
    );

    save_graph(&graph, &config.build.output)
}

async fn serve(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let graph = Arc::new(load_graph(&config.build.output)?);

    web::server(graph, config.routing, &config.server.bind).await?;
    Ok(())
}
