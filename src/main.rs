mod cli;

use portfolio::{
    config,
    gallery::{ingest_batch, ImageStore, UploadLimits, UploadOutcome, UploadedFile},
    server,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use portfolio_common::paths::is_image_file;
use std::path::{Path, PathBuf};

fn open_store(config: &config::Config) -> Result<ImageStore> {
    let path = &config.storage.database;
    ImageStore::open(path, config.storage.jpeg_quality)
        .with_context(|| format!("Failed to open image store at {:?}", path))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting portfolio server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let store = open_store(&config)?;
    tracing::info!("Image store holds {} images", store.count()?);
    if !portfolio_imaging::CODED_HEIF_SUPPORT {
        tracing::warn!(
            "Built without the `libheif` feature: only uncompressed HEIC uploads can be decoded"
        );
    }

    server::start_server(config, store).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "portfolio=trace,portfolio_db=debug,portfolio_imaging=debug,tower_http=debug"
                .to_string()
        } else {
            "portfolio=debug,portfolio_db=info,portfolio_imaging=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Import { files } => import_files(&files, cli.config.as_deref()),
        Commands::List => list_images(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("portfolio {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn import_files(paths: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    let paths = expand_import_paths(paths)?;

    let mut uploads = Vec::with_capacity(paths.len());
    let mut outcomes = Vec::new();
    for path in &paths {
        match UploadedFile::from_path(path) {
            Ok(file) => uploads.push(file),
            Err(e) => outcomes.push(UploadOutcome::Rejected {
                name: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    outcomes.extend(ingest_batch(
        &store,
        uploads,
        UploadLimits::from(&config.upload),
    ));

    for outcome in &outcomes {
        println!("{}", outcome.notification().message);
    }

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    println!("Imported {} of {} files", saved, paths.len());

    Ok(())
}

/// Replace each directory with the image files directly inside it, sorted
/// by name. Other paths are kept so they get their own outcome line.
fn expand_import_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_dir() {
            expanded.push(path.clone());
            continue;
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {:?}", path))?
        {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_image_file(&entry_path) {
                images.push(entry_path);
            }
        }
        images.sort();
        tracing::info!("Found {} images in {:?}", images.len(), path);
        expanded.extend(images);
    }
    Ok(expanded)
}

fn list_images(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    let listing = store.list_all()?;

    if listing.entries.is_empty() && listing.skipped.is_empty() {
        println!("No images stored");
        return Ok(());
    }

    for entry in &listing.entries {
        let (width, height) = entry.image.dimensions();
        println!(
            "{:>6}  {}  {}x{}  {}",
            entry.id,
            entry.name,
            width,
            height,
            entry.image.mode()
        );
    }
    for id in &listing.skipped {
        println!("{:>6}  (unreadable image data, skipped)", id);
    }

    println!(
        "\n{} images, {} skipped",
        listing.entries.len(),
        listing.skipped.len()
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config.storage.database.display());
            println!("  JPEG quality: {}", config.storage.jpeg_quality);
            println!("  Max upload: {} MB", config.upload.max_file_size_mb);
            println!("  Profile: {}", config.profile.name);
            println!("  Filmography entries: {}", config.profile.filmography.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config.storage.database.display());
        }
    }

    Ok(())
}
