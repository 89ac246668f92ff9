use clap::Parser;
use cli_support::{init_logging, validate_backend_choice, DataArgs, PredictOpts};
use inference::predict_from_config;

/// Classify a bread image against the catalog and estimate its weight and count.
#[derive(Parser, Debug)]
#[command(name = "predict", about = "Predict bread type, weight and count for an image")]
struct PredictArgs {
    #[command(flatten)]
    data: DataArgs,
    #[command(flatten)]
    predict: PredictOpts,
    /// Print the prediction as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = PredictArgs::parse();
    validate_backend_choice(args.data.backend, cfg!(feature = "backend-wgpu"))?;

    let mut cfg = args.data.resolve()?;
    args.predict.apply(&mut cfg);
    cfg.warn_if_invalid();

    let prediction = predict_from_config(&cfg)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("=== Prediction for: {}", cfg.query_image.display());
        println!("{prediction}");
    }
    Ok(())
}
