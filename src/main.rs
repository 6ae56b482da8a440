use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Parser, ValueEnum};
use lineseg_eval::{
    page, report, EvaluationOptions, EvaluatorBuilder, Metric, MetricValue, PixelMask, WeightMode,
    DEFAULT_THRESHOLD,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Scores a text line segmentation in PAGE format against its ground truth.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pixel-level ground truth image (boundary and background flags)
    #[clap(long, short = 'i')]
    image_ground_truth: Option<PathBuf>,

    /// Ground truth PAGE XML
    #[clap(long, short = 'g')]
    xml_ground_truth: PathBuf,

    /// Method output PAGE XML
    #[clap(long, short = 'p')]
    xml_prediction: PathBuf,

    /// CSV results file; the visualization is written next to it
    #[clap(long, short = 'o')]
    output_path: Option<PathBuf>,

    /// JSON results file
    #[clap(long, short = 'j')]
    json_path: Option<PathBuf>,

    /// IoU a matched line must exceed to count as correct
    #[clap(long, short = 't', env = "LINESEG_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    matching_threshold: f64,

    /// Take comment regions into account
    #[clap(long, short = 'c')]
    comments: bool,

    /// Only score pixels inside the ground truth's main text area
    #[clap(long)]
    main_text_area: bool,

    /// Overlap measure used to rank candidate matches
    #[clap(long, value_enum, default_value_t = WeightArg::Bbox)]
    weight_mode: WeightArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum WeightArg {
    Bbox,
    Polygon,
}

impl From<WeightArg> for WeightMode {
    fn from(arg: WeightArg) -> Self {
        match arg {
            WeightArg::Bbox => WeightMode::BoundingBox,
            WeightArg::Polygon => WeightMode::PolygonArea,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> lineseg_eval::Result<()> {
    let evaluator = EvaluatorBuilder::new()
        .threshold(args.matching_threshold)
        .weight_mode(args.weight_mode.into())
        .build()?;
    log::info!("Matching threshold is {} %", 100.0 * evaluator.threshold());

    let mask = args
        .image_ground_truth
        .as_ref()
        .map(PixelMask::open)
        .transpose()?;

    log::info!(
        "Loading page ground truth from {}",
        args.xml_ground_truth.display()
    );
    let truth = page::read_page(&args.xml_ground_truth, args.comments)?;
    log::info!(
        "Loading method output from {}",
        args.xml_prediction.display()
    );
    let output = page::read_page(&args.xml_prediction, args.comments)?;

    let main_text_area = if args.main_text_area {
        if truth.main_text_area.is_none() {
            log::warn!("ground truth has no main text area, scoring the whole page");
        }
        truth.main_text_area
    } else {
        None
    };

    log::info!("Evaluating...");
    let start = Instant::now();
    let mut evaluation = evaluator.evaluate(
        &truth.lines,
        &output.lines,
        EvaluationOptions {
            mask: mask.as_ref(),
            main_text_area,
            visualize: args.output_path.is_some(),
        },
    )?;
    log::debug!("{:?}", start.elapsed());

    evaluation.results.insert(
        Metric::Filename,
        MetricValue::Text(file_stem(&args.xml_prediction)),
    );
    for (metric, value) in evaluation.results.iter() {
        println!("{metric}: {value}");
    }

    if let Some(output_path) = &args.output_path {
        log::info!("Writing results in {}", output_path.display());
        report::write_csv(&evaluation.results, output_path)?;

        if let Some(image) = &evaluation.visualization {
            let extension = args
                .image_ground_truth
                .as_deref()
                .and_then(Path::extension)
                .and_then(|it| it.to_str())
                .unwrap_or("png");
            let image_path = output_path.with_extension(format!("visualization.{extension}"));
            log::info!("Writing evaluation image in {}", image_path.display());
            image.save(&image_path)?;
        }
    }

    if let Some(json_path) = &args.json_path {
        log::info!("Writing results in {}", json_path.display());
        let gt_filename = args
            .xml_ground_truth
            .file_name()
            .map(|it| it.to_string_lossy().into_owned())
            .unwrap_or_default();
        report::write_json(&evaluation.results, &gt_filename, json_path)?;
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|it| it.to_string_lossy().into_owned())
        .unwrap_or_default()
}
