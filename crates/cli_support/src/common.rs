use crate::config::{ConfigError, ScaleConfig};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    NdArray,
    Wgpu,
}

/// Reject a backend the binary was not built with.
///
/// The backend is a compile-time choice; `wgpu_built` is the caller's
/// `cfg!(feature = "backend-wgpu")`.
pub fn validate_backend_choice(kind: BackendKind, wgpu_built: bool) -> anyhow::Result<()> {
    match (kind, wgpu_built) {
        (BackendKind::Wgpu, false) => {
            anyhow::bail!("backend-wgpu feature not enabled; rebuild with --features backend-wgpu or choose ndarray backend")
        }
        (BackendKind::NdArray, true) => {
            log::warn!("built with backend-wgpu; the WGPU backend is used despite --backend nd-array");
        }
        _ => {}
    }
    Ok(())
}

/// Initialise `env_logger` with an `info` default (`RUST_LOG` overrides).
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Data/model locations shared by every binary. Unset flags fall back to the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Config file (defaults to $BREAD_SCALE_CONFIG, then ./bread-scale.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Catalog CSV with filename,weight,count,type columns.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Directory holding the catalog images.
    #[arg(long)]
    pub image_dir: Option<PathBuf>,
    /// Regressor checkpoint path.
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,
    /// torchvision resnet18 state dict (.pth) for the backbone.
    #[arg(long)]
    pub backbone_weights: Option<PathBuf>,
    /// Skip pretrained backbone weights even if configured.
    #[arg(long, default_value_t = false)]
    pub no_pretrained: bool,
    /// Square input size fed to the backbone.
    #[arg(long)]
    pub image_size: Option<u32>,
    /// Backend to use (nd-array, or wgpu if built with backend-wgpu).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
}

impl DataArgs {
    /// Load the config file and apply the flags on top of it.
    pub fn resolve(&self) -> Result<ScaleConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => ScaleConfig::from_path(path)?,
            None => ScaleConfig::load()?,
        };
        self.apply(&mut cfg);
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut ScaleConfig) {
        if let Some(catalog) = &self.catalog {
            cfg.catalog = catalog.clone();
        }
        if let Some(dir) = &self.image_dir {
            cfg.image_dir = dir.clone();
        }
        if let Some(ckpt) = &self.checkpoint {
            cfg.checkpoint = ckpt.clone();
        }
        if let Some(weights) = &self.backbone_weights {
            cfg.backbone_weights = Some(weights.clone());
        }
        if self.no_pretrained {
            cfg.backbone_weights = None;
        }
        if let Some(size) = self.image_size {
            cfg.image_size = size;
        }
    }
}

/// Training hyperparameter overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct TrainOpts {
    /// Number of passes over the catalog.
    #[arg(long)]
    pub epochs: Option<usize>,
    /// Batch size.
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Adam learning rate.
    #[arg(long)]
    pub lr: Option<f64>,
    /// Seed for the per-pass shuffle.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TrainOpts {
    pub fn apply(&self, cfg: &mut ScaleConfig) {
        if let Some(epochs) = self.epochs {
            cfg.epochs = epochs;
        }
        if let Some(batch) = self.batch_size {
            cfg.batch_size = batch;
        }
        if let Some(lr) = self.lr {
            cfg.learning_rate = lr;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
    }
}

/// Prediction overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct PredictOpts {
    /// Minimum cosine similarity to accept a bread type.
    #[arg(long)]
    pub threshold: Option<f32>,
    /// Image to classify and measure.
    #[arg(long)]
    pub query: Option<PathBuf>,
}

impl PredictOpts {
    pub fn apply(&self, cfg: &mut ScaleConfig) {
        if let Some(threshold) = self.threshold {
            cfg.threshold = threshold;
        }
        if let Some(query) = &self.query {
            cfg.query_image = query.clone();
        }
    }
}
