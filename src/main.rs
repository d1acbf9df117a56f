mod app;
mod state;
mod ui;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use eframe::egui;

use app::DimensionPlotApp;
use dimension_plot::data::loader::DEFAULT_KEY_COLUMN;
use dimension_plot::DataType;
use state::AppState;

/// Plot one dimension of a point dataset grouped by clusters or metadata.
#[derive(Parser, Debug)]
#[command(name = "dimension-plot", version, about)]
struct Args {
    /// Point dataset (.csv, .json, .parquet)
    #[arg(long)]
    points: Option<PathBuf>,

    /// Cluster partition of the points (.json)
    #[arg(long, conflicts_with = "metadata")]
    clusters: Option<PathBuf>,

    /// Metadata dataset joined on the key column (.csv, .json, .parquet)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Metadata column whose values are the categories
    #[arg(long, requires = "metadata")]
    metadata_column: Option<String>,

    /// Column holding the shared row key
    #[arg(long, default_value = DEFAULT_KEY_COLUMN)]
    key_column: String,

    /// Index of the plotted dimension
    #[arg(long, default_value_t = 0)]
    dimension: usize,

    /// Write the document here instead of opening a window
    #[arg(long)]
    output: Option<PathBuf>,

    /// Build once and print the document to stdout
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut state = AppState::new(&args.key_column);
    bind_from_args(&mut state, &args);

    if args.headless || args.output.is_some() {
        return write_document(&state, args.output.as_ref());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dimension Plot",
        options,
        Box::new(|_cc| Ok(Box::new(DimensionPlotApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}

/// Bind the datasets named on the command line, points first.
fn bind_from_args(state: &mut AppState, args: &Args) {
    if let Some(path) = &args.points {
        state.open_file(path, DataType::Points);
    }
    state.select_dimension(args.dimension);

    if let Some(path) = &args.clusters {
        state.open_file(path, DataType::Clusters);
    }
    if let Some(path) = &args.metadata {
        state.open_file(path, DataType::Metadata);
        if let Some(column) = &args.metadata_column {
            state.select_metadata_column(column);
        }
    }
}

fn write_document(state: &AppState, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(json) = &state.session.sink().json else {
        bail!(
            "{}",
            state
                .status_message
                .as_deref()
                .unwrap_or("No document could be built from the given data")
        );
    };

    match output {
        Some(path) => std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("writing to stdout")?;
        }
    }
    Ok(())
}
