//! CLI application for body measurement estimation.
//!
//! Usage:
//!   bodyfit --gender male --height 180 --front front.jpg        # Human-readable output
//!   bodyfit --gender female --height 65 --units imperial \
//!           --front front.jpg --side side.jpg --json              # JSON output
//!   bodyfit --request request.json -o measurements.json           # Save to file
//!   bodyfit --request request.json --compare manual.json          # Accuracy against manual values

use bodyfit::{
    analyze_accuracy, format_height, format_measurement, parse_height, recommend_sizes,
    AccuracyReport, BodyEstimator, ClothingSize, Gender, Measurement, MeasurementRequest,
    MeasurementSet, SizeRecommendation, UnitSystem,
};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bodyfit")]
#[command(author, version, about = "Heuristic body measurement estimation", long_about = None)]
struct Args {
    /// Gender: male, female or other
    #[arg(short, long, required_unless_present = "request")]
    gender: Option<String>,

    /// Height in the selected units (cm, or inches for imperial)
    #[arg(long, required_unless_present = "request")]
    height: Option<String>,

    /// Unit system: metric or imperial
    #[arg(short, long, default_value = "metric")]
    units: String,

    /// Front-facing full-body image
    #[arg(short, long, required_unless_present = "request")]
    front: Option<PathBuf>,

    /// Optional side-view image
    #[arg(short, long)]
    side: Option<PathBuf>,

    /// JSON request file (camelCase wire format) instead of the flags above
    #[arg(long, conflicts_with_all = ["gender", "height", "front", "side"])]
    request: Option<PathBuf>,

    /// Manually taken measurements (JSON, centimeters) to score the estimate against
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed the measurement jitter for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Disable measurement jitter
    #[arg(long)]
    no_jitter: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    gender: Gender,
    measurement_system: UnitSystem,
    height_cm: f64,
    has_side_image: bool,
    confidence: f64,
    /// Values in centimeters (BMI unitless)
    measurements: MeasurementSet,
    /// Values formatted in the requested unit system
    display: Vec<DisplayRow>,
    sizes: SizeRecommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<AccuracyReport>,
}

#[derive(Serialize)]
struct DisplayRow {
    name: &'static str,
    value: String,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bodyfit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(args: &Args) -> Result<MeasurementRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.request {
        debug!(path = %path.display(), "reading request");
        let body = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&body)?);
    }

    let gender: Gender = args.gender.as_deref().ok_or("--gender is required")?.parse()?;
    let height = args.height.as_deref().ok_or("--height is required")?;
    let system: UnitSystem = args.units.parse()?;
    // Fail on a bad height before reading any image
    parse_height(height, system)?;

    let front_path = args.front.as_ref().ok_or("--front is required")?;
    debug!(path = %front_path.display(), "reading front image");
    let front = std::fs::read(front_path)?;
    let mut request = MeasurementRequest::from_bytes(gender, height, system, &front);

    if let Some(ref side_path) = args.side {
        debug!(path = %side_path.display(), "reading side image");
        request = request.with_side_image(&std::fs::read(side_path)?);
    }

    Ok(request)
}

fn load_manual(path: &Path) -> Result<MeasurementSet, Box<dyn std::error::Error>> {
    debug!(path = %path.display(), "reading manual measurements");
    let body = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let request = load_request(args)?;

    let mut estimator = BodyEstimator::new();
    if args.no_jitter {
        estimator = estimator.jitter(0.0);
    }
    if let Some(seed) = args.seed {
        estimator = estimator.seed(seed);
    }

    // Read the manual values first so a bad path fails fast
    let manual = args.compare.as_deref().map(load_manual).transpose()?;

    let result = estimator.estimate(&request)?;
    let system = request.measurement_system;
    let height_cm = result
        .measurements
        .get(Measurement::Height)
        .ok_or("estimate is missing height")?;

    let display = Measurement::ALL
        .iter()
        .filter_map(|&m| {
            let value = result.measurements.get(m)?;
            let text = match m {
                Measurement::EstimatedBmi => format!("{:.1}", value),
                Measurement::Height => format_height(value, system),
                _ => format_measurement(value, system),
            };
            Some(DisplayRow {
                name: m.name(),
                value: text,
            })
        })
        .collect();

    let output = Output {
        gender: request.gender,
        measurement_system: system,
        height_cm,
        has_side_image: request
            .side_image_base64
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty()),
        confidence: result.confidence,
        sizes: recommend_sizes(&result.measurements, request.gender),
        accuracy: manual.map(|manual| analyze_accuracy(&manual, &result.measurements)),
        measurements: result.measurements,
        display,
    };

    // Generate output
    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    // Write output
    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn size_line(label: &str, size: ClothingSize) -> String {
    format!("  {:<8}{:<4} ({})\n", label, size.as_str(), size.fit_description())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Gender: {}  Height: {}\n",
        output.gender,
        format_height(output.height_cm, output.measurement_system)
    ));
    s.push_str(&format!("Side image: {}\n", if output.has_side_image { "yes" } else { "no" }));
    s.push_str(&format!("Confidence: {:.0}%\n", output.confidence * 100.0));

    s.push_str("\nMeasurements:\n");
    for row in &output.display {
        s.push_str(&format!("  {:<14}{}\n", row.name, row.value));
    }

    s.push_str("\nRecommended sizes:\n");
    s.push_str(&size_line("T-shirt", output.sizes.tshirt));
    s.push_str(&size_line("Shirt", output.sizes.shirt));
    s.push_str(&size_line("Pants", output.sizes.pants));
    s.push_str(&size_line("Jacket", output.sizes.jacket));

    if let Some(ref accuracy) = output.accuracy {
        s.push_str("\nAccuracy against manual measurements:\n");
        s.push_str(&format!("  Precision score:   {:.1}\n", accuracy.precision_score));
        s.push_str(&format!("  Mean abs. error:   {:.1} cm\n", accuracy.overall_mae));
        s.push_str(&format!("  Overall deviation: {:.1}%\n", accuracy.overall_deviation));
        for line in &accuracy.recommendations {
            s.push_str(&format!("  - {}\n", line));
        }
    }

    s
}
