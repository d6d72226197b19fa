use clap::Parser;
use motomatch_api::RestApi;
use motomatch_similarity::{FeatureWeights, WeightPreset};
use motomatch_storage::CatalogManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Used-motorcycle recommendation server
#[derive(Parser, Debug)]
#[command(name = "motomatch")]
#[command(about = "Similar-listing recommendations for a motorcycle catalog", long_about = None)]
struct Args {
    /// Path to the catalog JSON file
    #[arg(short, long, default_value = "./data/motorcycles.json")]
    catalog: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Weight preset: equal, price-dominant or brand-emphasized
    #[arg(long, default_value_t = WeightPreset::BrandEmphasized)]
    weights: WeightPreset,

    /// JSON file with price_weight / brand_weight / style_weight; replaces the preset
    #[arg(long)]
    weights_file: Option<PathBuf>,

    #[arg(long)]
    price_weight: Option<f32>,

    #[arg(long)]
    brand_weight: Option<f32>,

    #[arg(long)]
    style_weight: Option<f32>,
}

impl Args {
    fn feature_weights(&self) -> anyhow::Result<FeatureWeights> {
        let base = match &self.weights_file {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => self.weights.weights(),
        };
        let weights = base.with_overrides(self.price_weight, self.brand_weight, self.style_weight);
        weights.validate()?;
        Ok(weights)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting MotoMatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);

    let weights = args.feature_weights()?;
    info!(
        "Weights: price={} brand={} style={}",
        weights.price_weight, weights.brand_weight, weights.style_weight
    );

    let manager = Arc::new(CatalogManager::open(&args.catalog, weights)?);
    let model = manager.model()?;
    info!(
        "Similarity model ready: {} items, {} features",
        model.catalog().len(),
        model.dim()
    );

    let manager_http = manager.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(manager_http, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("MotoMatch started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
