use anyhow::Context;
use bread_dataset::{BatchIter, BreadDataset, ImageTransform};
use burn::backend::Autodiff;
use burn::module::Module;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::record::{BinFileRecorder, FullPrecisionSettings, RecorderError};
use burn::tensor::{backend::Backend, Tensor};
use cli_support::{validate_backend_choice, DataArgs, ScaleConfig, TrainOpts};
use clap::Parser;
use data_contracts::Catalog;
use models::{maybe_load_backbone_record, BackboneConfig, BreadRegressor, BreadRegressorConfig};
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::TrainBackend;

type ADBackend = Autodiff<TrainBackend>;

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Fine-tune the ResNet backbone + (weight, count) head on the bread catalog"
)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub train: TrainOpts,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Sum of the per-batch mean losses, one entry per pass.
    pub epoch_losses: Vec<f32>,
    /// Where the parameters were written (the recorder forces a `.bin` extension).
    pub checkpoint: PathBuf,
}

pub fn run_train(args: TrainArgs) -> anyhow::Result<TrainReport> {
    validate_backend_choice(args.data.backend, cfg!(feature = "backend-wgpu"))?;
    let mut cfg = args.data.resolve()?;
    args.train.apply(&mut cfg);
    cfg.warn_if_invalid();
    train(&cfg)
}

pub fn regressor_config(cfg: &ScaleConfig) -> BreadRegressorConfig {
    BreadRegressorConfig {
        backbone: BackboneConfig {
            base_channels: cfg.base_channels,
            ..Default::default()
        },
    }
}

/// Train for exactly `cfg.epochs` passes, then write the checkpoint once.
pub fn train(cfg: &ScaleConfig) -> anyhow::Result<TrainReport> {
    let catalog = Catalog::from_path(&cfg.catalog)
        .with_context(|| format!("failed to load catalog {}", cfg.catalog.display()))?;
    if catalog.is_empty() {
        anyhow::bail!("catalog {} contains no rows", cfg.catalog.display());
    }
    let dataset = BreadDataset::new(
        catalog,
        &cfg.image_dir,
        ImageTransform::square(cfg.image_size),
    );

    let device = <ADBackend as Backend>::Device::default();
    log::info!(
        "training on {:?}: {} rows, {} epochs, batch size {}, lr {}",
        device,
        dataset.len(),
        cfg.epochs,
        cfg.batch_size,
        cfg.learning_rate
    );

    let mut model = BreadRegressor::<ADBackend>::new(regressor_config(cfg), &device);
    if let Some(record) =
        maybe_load_backbone_record::<ADBackend>(cfg.backbone_weights.as_deref(), &device)
            .map_err(|e| anyhow::anyhow!("failed to load pretrained backbone weights: {e}"))?
    {
        model = model.with_backbone_record(record);
    }
    let mut optim = AdamConfig::new().init();
    let mut rng = match cfg.seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_rng(&mut rand::rng()),
    };

    let mse = MseLoss::new();
    let batch_size = cfg.batch_size.max(1);
    let mut epoch_losses = Vec::with_capacity(cfg.epochs);
    println!("=== Training ===");
    for epoch in 0..cfg.epochs {
        let mut total_loss = 0.0f32;
        let mut batches = BatchIter::shuffled(&dataset, batch_size, &mut rng);
        while let Some(batch) = batches.next_batch::<ADBackend>(&device)? {
            let preds = model.forward(batch.images);
            let loss = mse.forward(preds, batch.targets, Reduction::Mean);
            let loss_val = scalar(loss.clone().detach());
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.learning_rate, model, grads);
            total_loss += loss_val;
        }
        println!("Epoch {}/{} - Loss: {total_loss:.4}", epoch + 1, cfg.epochs);
        epoch_losses.push(total_loss);
    }

    let checkpoint = save_checkpoint(model, &cfg.checkpoint)?;
    Ok(TrainReport {
        epoch_losses,
        checkpoint,
    })
}

fn save_checkpoint<B: Backend>(model: BreadRegressor<B>, path: &Path) -> anyhow::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    model
        .save_file(path, &recorder)
        .map_err(|e| anyhow::anyhow!("failed to save checkpoint: {e}"))?;
    let written = path.with_extension("bin");
    log::info!("wrote checkpoint {}", written.display());
    Ok(written)
}

pub fn load_regressor_from_checkpoint<P: AsRef<Path>>(
    path: P,
    cfg: BreadRegressorConfig,
    device: &<TrainBackend as Backend>::Device,
) -> Result<BreadRegressor<TrainBackend>, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    BreadRegressor::<TrainBackend>::new(cfg, device).load_file(path.as_ref(), &recorder, device)
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f32 {
    t.into_data()
        .to_vec::<f32>()
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or(0.0)
}
