mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod merge;
mod models;
mod normalize;
mod omdb;
mod processor;
mod resolver;
mod routes;
mod scraper;
mod store;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{
    config::{Config, ReaderConfig},
    normalize::NormalizeOptions,
    omdb::OmdbClient,
    processor::PipelineOptions,
    resolver::Resolver,
    routes::ReaderState,
    store::CatalogStore,
};

#[derive(Parser)]
#[command(name = "criterionbox", about = "Criterion listing scraper and catalog add-on")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the listing, resolve films against OMDb and store new ones
    Scrape {
        /// Parse a saved listing page instead of fetching it
        #[arg(long)]
        from_file: Option<PathBuf>,
    },
    /// Serve the stored catalog as a Stremio add-on
    Serve,
    /// Write the stored catalog to the flat JSON document
    Export {
        /// Output path (defaults to CATALOG_EXPORT_PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,criterionbox=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { from_file } => scrape(from_file).await,
        Commands::Serve => serve().await,
        Commands::Export { output } => export(output).await,
    }
}

async fn scrape(from_file: Option<PathBuf>) -> anyhow::Result<()> {
    // Credentials are checked before anything touches the network.
    let config = Config::from_env()?;
    let http = scraper::build_client()?;

    let html = match &from_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => scraper::fetch_listing_html(&http, &config.listing_url).await?,
    };
    let listing = scraper::parse_listing(&html);
    tracing::info!(rows = listing.rows.len(), gaps = listing.gaps, "extracted listing");

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = CatalogStore::new(db);
    let omdb = OmdbClient::new(
        http,
        config.omdb_api_key.clone(),
        config.omdb_base_url.clone(),
        config.omdb_rps,
    );
    let resolver = Resolver::new(omdb);

    let opts = PipelineOptions {
        normalize: NormalizeOptions { strip_title_annotations: config.strip_title_annotations },
        max_concurrent: config.max_concurrent,
    };
    let out = processor::process(listing, &resolver, &store, opts).await?;

    catalog::write_json(&config.unresolved_report_path, &out.unresolved).await?;
    if !out.unresolved.is_empty() {
        tracing::warn!(
            count = out.unresolved.len(),
            path = %config.unresolved_report_path.display(),
            "some films could not be matched"
        );
    }

    let records = store.all().await?;
    catalog::export(&config.catalog_export_path, &records).await?;
    tracing::info!(
        records = records.len(),
        path = %config.catalog_export_path.display(),
        "catalog exported"
    );

    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let config = ReaderConfig::from_env()?;
    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(ReaderState { store: CatalogStore::new(db) });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn export(output: Option<PathBuf>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = config::database_url();
    let path = output.unwrap_or_else(config::catalog_export_path);

    let db = db::connect_and_migrate(&database_url).await?;
    let records = CatalogStore::new(db).all().await?;
    catalog::export(&path, &records).await?;
    tracing::info!(records = records.len(), path = %path.display(), "catalog exported");

    Ok(())
}
