//! Compliance CLI Binary
//!
//! Reads one evaluation request as JSON, evaluates it against the loaded
//! reference data and prints the report on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use compliance_engine::{
    cancellation, AliasMap, BatchOptions, BucketClassifier, ComplianceEngine, EngineConfig,
    InMemoryCatalog, MaterialsTable,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "compliance-cli")]
#[command(
    version,
    about = "Evaluate a project bill of materials for entity-of-concern and domestic-content compliance"
)]
struct Args {
    /// Request file (JSON), or `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Engine configuration (TOML)
    #[arg(short, long, env = "COMPLIANCE_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Parts catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Alias mapping table (JSON)
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Materials reference table (JSON)
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Bucket classification rule table (JSON); built-in rules otherwise
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Resolution deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Include resolved components in the report
    #[arg(long)]
    include_components: bool,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn load_engine(args: &Args) -> Result<ComplianceEngine> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let classifier = match &args.rules {
        Some(path) => BucketClassifier::from_file(path)
            .with_context(|| format!("loading rule table {}", path.display()))?,
        None => BucketClassifier::default(),
    };

    let mut engine = ComplianceEngine::from_config(config, classifier)
        .context("invalid engine configuration")?;
    if let Some(path) = &args.aliases {
        let aliases = AliasMap::from_file(path)
            .with_context(|| format!("loading alias table {}", path.display()))?;
        tracing::info!(entries = aliases.len(), "alias table loaded");
        engine = engine.with_aliases(aliases);
    }
    if let Some(path) = &args.catalog {
        let catalog = InMemoryCatalog::from_file(path)
            .with_context(|| format!("loading parts catalog {}", path.display()))?;
        tracing::info!(parts = catalog.len(), "parts catalog loaded");
        engine = engine.with_catalog(catalog);
    }
    if let Some(path) = &args.materials {
        let materials = MaterialsTable::from_file(path)
            .with_context(|| format!("loading materials reference {}", path.display()))?;
        tracing::info!(entries = materials.len(), "materials reference loaded");
        engine = engine.with_materials(materials);
    }
    Ok(engine)
}

fn read_request(input: &str) -> Result<serde_json::Value> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("reading request {}", input))?
    };
    serde_json::from_str(&text).context("request is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the report; everything else goes to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting compliance CLI v{}", env!("CARGO_PKG_VERSION"));

    let engine = load_engine(&args)?;
    let request = read_request(&args.input)?;

    let (handle, token) = cancellation();
    let mut options = BatchOptions::default().with_cancellation(token);
    if let Some(ms) = args.timeout_ms {
        options = options.with_deadline(Duration::from_millis(ms));
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; cancelling evaluation");
            handle.cancel();
        }
    });

    let mut request = compliance_engine::EvaluationRequest::from_json_value(request)?;
    request.include_components |= args.include_components;

    let report = engine.evaluate(&request, &options).await?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", rendered);

    Ok(())
}
