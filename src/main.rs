use abverdict::classify::{Classifier, ClassifyRequest};
use abverdict::cli::{Cli, ClassifyInput, Command, OutputFormat};
use abverdict::config::VerdictConfig;
use abverdict::display::PlainValueFormatter;
use abverdict::report::{build_report, render_text};
use abverdict::snapshot::{DirectorySnapshotSource, Experiment, SnapshotScope};
use abverdict::tooltip::{
    place, LayoutX, Point, PopupSize, TooltipContent, TooltipData, VerticalAlign, Viewport,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<VerdictConfig> {
    let config = match path {
        Some(path) => VerdictConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => VerdictConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn run_classify(input: &Path, config: &VerdictConfig, format: OutputFormat) -> Result<()> {
    let row: ClassifyInput = read_json(input)?;
    let classifier = Classifier::new(config.classifier.clone());

    let request = ClassifyRequest::new(&row.metric, &row.baseline, &row.variation, row.engine)
        .with_correction(row.correction)
        .with_kind(row.kind)
        .with_signals(&row.signals);
    let verdict = classifier.classify(&request);

    let data = TooltipData {
        metric: row.metric.clone(),
        variation_row: 1,
        variation_name: row.variation_name.clone(),
        stats: row.variation.clone(),
        baseline_row: 0,
        baseline_name: row.baseline_name.clone(),
        baseline: row.baseline.clone(),
        verdict,
        correction: row.correction,
        layout_x: LayoutX::default(),
        y_align: VerticalAlign::default(),
    };
    let content = TooltipContent::build(&data, &PlainValueFormatter::default());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "verdict": data.verdict,
                "tooltip": content,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print!("{}", content.to_text()),
    }
    Ok(())
}

fn run_report(
    experiment_path: &Path,
    snapshots: &Path,
    phase: Option<usize>,
    dimension: Option<String>,
    value: Option<&str>,
    config: &VerdictConfig,
    format: OutputFormat,
) -> Result<()> {
    let experiment: Experiment = read_json(experiment_path)?;
    let source = DirectorySnapshotSource::new(snapshots);

    let mut scope = SnapshotScope::new();
    scope.mount(experiment);
    let context = scope.get_mut()?;
    if let Some(phase) = phase {
        context.set_phase(phase);
    }
    if let Some(dimension) = dimension {
        context.set_dimension(dimension);
    }
    context.refresh(&source);

    if let Some(error) = context.error() {
        anyhow::bail!("failed to load snapshot {}: {}", context.key(), error);
    }
    let analysis = context
        .analysis()
        .with_context(|| format!("snapshot {} has no analysis", context.key()))?;

    let classifier = Classifier::new(config.classifier.clone());
    let rows = build_report(context.experiment(), analysis, value, &classifier)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => print!("{}", render_text(&rows)),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Classify { input } => run_classify(&input, &config, args.format),
        Command::Report {
            experiment,
            snapshots,
            phase,
            dimension,
            value,
        } => run_report(
            &experiment,
            &snapshots,
            phase,
            dimension,
            value.as_deref(),
            &config,
            args.format,
        ),
        Command::Place {
            x,
            y,
            layout,
            align,
            viewport_width,
            viewport_height,
        } => {
            let placement = place(
                Point::new(x, y),
                layout.into(),
                align.into(),
                Viewport::new(viewport_width, viewport_height),
                PopupSize::from(config.tooltip),
            );
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&placement)?),
                OutputFormat::Text => {
                    println!("left: {}", placement.left);
                    println!("top: {}", placement.top);
                    println!("width: {}", placement.width);
                    println!("height: {}", placement.height);
                    println!("arrow: {}", placement.arrow_offset_css());
                    println!("transform-origin: {}", placement.transform_origin_css());
                }
            }
            Ok(())
        }
    }
}
