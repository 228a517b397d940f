mod app;
mod coamp;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coamp::{
    GraphSession, GraphSource, HttpGraphSource, JsonFileSource, QueryContext, QueryControls,
    TestSelector,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base url of the web backend serving the visualizer endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Read graphs from a saved visualizer JSON response instead of the server.
    #[arg(long)]
    graph_file: Option<PathBuf>,

    /// Gene to load on start.
    #[arg(long)]
    gene: Option<String>,

    #[arg(long, default_value_t = 0.0)]
    min_weight: f64,

    #[arg(long, default_value_t = 0.0)]
    min_samples: f64,

    #[arg(long)]
    oncogenes_only: bool,

    /// Number of heaviest edges kept for display and export.
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// any, single_interval, multi_interval or multi_chromosomal.
    #[arg(long, default_value = "any")]
    test: String,

    #[arg(long, default_value_t = 0.05)]
    q_threshold: f64,

    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Fetch, select and export without opening a window.
    #[arg(long)]
    headless: bool,
}

pub struct LaunchOptions {
    pub source: Arc<dyn GraphSource>,
    pub export_dir: PathBuf,
    pub gene: String,
    pub controls: QueryControls,
}

impl LaunchOptions {
    fn from_args(args: Args) -> Result<Self> {
        let source: Arc<dyn GraphSource> = match &args.graph_file {
            Some(path) => Arc::new(JsonFileSource::new(path)),
            None => Arc::new(
                HttpGraphSource::new(&args.server)
                    .with_context(|| format!("failed to configure server {}", args.server))?,
            ),
        };
        let test = args.test.parse::<TestSelector>()?;

        Ok(Self {
            source,
            export_dir: args.export_dir,
            gene: args.gene.unwrap_or_default(),
            controls: QueryControls {
                min_weight: args.min_weight,
                min_samples: args.min_samples,
                oncogenes_only: args.oncogenes_only,
                limit: args.limit,
                test,
                q_threshold: args.q_threshold,
            },
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let headless = args.headless;
    let options = LaunchOptions::from_args(args)?;

    if headless {
        return run_headless(&options);
    }

    info!(source = %options.source.describe(), "starting co-amplification explorer");
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "coamp-graph",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::CoampApp::new(cc, options)))),
    )
    .map_err(|error| anyhow!("failed to run the explorer window: {error}"))
}

fn run_headless(options: &LaunchOptions) -> Result<()> {
    let context = QueryContext::with_controls(&options.gene, options.controls)?;
    info!(gene = %context.gene, source = %options.source.describe(), "fetching graph");

    let graph = options.source.fetch(&context)?;
    let session = GraphSession::new(1, context, graph);
    let path = coamp::write_export(
        &options.export_dir,
        &session.displayed,
        &session.context.gene,
    )
    .with_context(|| format!("failed to export {}", session.context.gene))?;

    println!("{}", path.display());
    Ok(())
}
