//! Train-then-predict pipeline behind the `bread_scale` binary.

pub mod cli {
    use clap::Parser;
    use cli_support::{DataArgs, PredictOpts, TrainOpts};

    #[derive(Parser, Debug)]
    #[command(
        name = "bread_scale",
        about = "Train the bread regressor, then predict type, weight and count for a query image"
    )]
    pub struct AppArgs {
        #[command(flatten)]
        pub data: DataArgs,
        #[command(flatten)]
        pub train: TrainOpts,
        #[command(flatten)]
        pub predict: PredictOpts,
        /// Reuse the existing checkpoint instead of training first.
        #[arg(long, default_value_t = false)]
        pub skip_train: bool,
    }
}

use cli::AppArgs;
use cli_support::{validate_backend_choice, ScaleConfig};
use inference::Prediction;

pub fn run_app(args: AppArgs) -> anyhow::Result<Prediction> {
    validate_backend_choice(args.data.backend, cfg!(feature = "backend-wgpu"))?;
    let mut cfg = args.data.resolve()?;
    args.train.apply(&mut cfg);
    args.predict.apply(&mut cfg);
    cfg.warn_if_invalid();
    run_pipeline(&cfg, !args.skip_train)
}

/// Optionally train, then report the prediction for `cfg.query_image` on stdout.
pub fn run_pipeline(cfg: &ScaleConfig, train_first: bool) -> anyhow::Result<Prediction> {
    if train_first {
        let report = training::train(cfg)?;
        log::info!("checkpoint saved to {}", report.checkpoint.display());
    } else {
        log::info!("skipping training; using {}", cfg.checkpoint.display());
    }

    let prediction = inference::predict_from_config(cfg)?;
    println!("\n=== Prediction for: {}", cfg.query_image.display());
    println!("{prediction}");
    Ok(prediction)
}
