use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "bread-scale.toml";
pub const CONFIG_ENV: &str = "BREAD_SCALE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Resolved settings shared by training and prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    /// CSV with `filename,weight,count,type` columns.
    pub catalog: PathBuf,
    pub image_dir: PathBuf,
    /// Regressor parameters written by training and read by prediction.
    pub checkpoint: PathBuf,
    /// torchvision `resnet18` state dict used to initialise the backbone.
    pub backbone_weights: Option<PathBuf>,
    pub image_size: u32,
    pub base_channels: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: Option<u64>,
    /// Minimum cosine similarity for a recognised bread type.
    pub threshold: f32,
    pub query_image: PathBuf,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        let image_dir = PathBuf::from("images");
        Self {
            catalog: PathBuf::from("bread_data.csv"),
            query_image: image_dir.join("img2.jpg"),
            image_dir,
            checkpoint: PathBuf::from("checkpoints/bread_regressor.bin"),
            backbone_weights: Some(PathBuf::from("weights/resnet18.pth")),
            image_size: 224,
            base_channels: 64,
            epochs: 10,
            batch_size: 4,
            learning_rate: 1e-3,
            seed: None,
            threshold: 0.6,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ScaleConfigFile {
    data: Option<DataSection>,
    model: Option<ModelSection>,
    train: Option<TrainSection>,
    predict: Option<PredictSection>,
}

#[derive(Debug, Deserialize, Default)]
struct DataSection {
    catalog: Option<String>,
    image_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelSection {
    image_size: Option<u32>,
    base_channels: Option<usize>,
    /// Empty string disables pretrained weights.
    backbone_weights: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TrainSection {
    epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    seed: Option<u64>,
    checkpoint: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PredictSection {
    threshold: Option<f32>,
    query_image: Option<String>,
}

impl ScaleConfig {
    /// Load from `$BREAD_SCALE_CONFIG`, else `./bread-scale.toml`, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_NAME);
        if default_path.exists() {
            return Self::from_path(default_path);
        }
        log::debug!("no {DEFAULT_CONFIG_NAME} found; using built-in defaults");
        let cfg = Self::default();
        cfg.warn_if_invalid();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        cfg.warn_if_invalid();
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let file: ScaleConfigFile = toml::from_str(raw)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ScaleConfigFile) -> Self {
        let defaults = Self::default();
        let data = file.data.unwrap_or_default();
        let model = file.model.unwrap_or_default();
        let train = file.train.unwrap_or_default();
        let predict = file.predict.unwrap_or_default();

        let image_dir = data
            .image_dir
            .map(|v| expand_path(&v))
            .unwrap_or(defaults.image_dir);
        let backbone_weights = match model.backbone_weights {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(expand_path(&v)),
            None => defaults.backbone_weights,
        };

        ScaleConfig {
            catalog: data
                .catalog
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.catalog),
            query_image: predict
                .query_image
                .map(|v| expand_path(&v))
                .unwrap_or_else(|| image_dir.join("img2.jpg")),
            image_dir,
            checkpoint: train
                .checkpoint
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.checkpoint),
            backbone_weights,
            image_size: model.image_size.unwrap_or(defaults.image_size),
            base_channels: model.base_channels.unwrap_or(defaults.base_channels),
            epochs: train.epochs.unwrap_or(defaults.epochs),
            batch_size: train.batch_size.unwrap_or(defaults.batch_size),
            learning_rate: train.learning_rate.unwrap_or(defaults.learning_rate),
            seed: train.seed.or(defaults.seed),
            threshold: predict.threshold.unwrap_or(defaults.threshold),
        }
    }

    pub fn warn_if_invalid(&self) {
        if self.epochs == 0 {
            log::warn!("config: train.epochs is 0; training will only write an untrained checkpoint");
        }
        if self.batch_size == 0 {
            log::warn!("config: train.batch_size is 0; a batch size of 1 will be used");
        }
        if !(self.learning_rate > 0.0) {
            log::warn!(
                "config: train.learning_rate {} is not positive",
                self.learning_rate
            );
        }
        if !(-1.0..=1.0).contains(&self.threshold) {
            log::warn!(
                "config: predict.threshold {} is outside [-1, 1]; every image will be {}",
                self.threshold,
                if self.threshold > 1.0 { "rejected" } else { "accepted" }
            );
        }
        if self.image_size < 32 {
            log::warn!(
                "config: model.image_size {} is too small for the ResNet stem",
                self.image_size
            );
        }
        if self.base_channels != 64 && self.backbone_weights.is_some() {
            log::warn!(
                "config: model.base_channels {} does not match resnet18 weights (64)",
                self.base_channels
            );
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

fn expand_env(input: &str) -> String {
    let mut out = String::new();
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => out.push_str(&format!("${{{key}}}")),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = ScaleConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ScaleConfig::default());
        assert_eq!(cfg.epochs, 10);
        assert_eq!(cfg.batch_size, 4);
        assert_eq!(cfg.threshold, 0.6);
    }

    #[test]
    fn query_image_follows_image_dir() {
        let cfg = ScaleConfig::from_toml_str("[data]\nimage_dir = \"photos\"\n").unwrap();
        assert_eq!(cfg.query_image, PathBuf::from("photos/img2.jpg"));
    }

    #[test]
    fn blank_backbone_weights_disable_pretrained() {
        let cfg = ScaleConfig::from_toml_str("[model]\nbackbone_weights = \"\"\n").unwrap();
        assert!(cfg.backbone_weights.is_none());
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(ScaleConfig::from_toml_str("[serving]\nport = 80\n").is_err());
    }

    #[test]
    fn unset_env_placeholder_is_kept() {
        assert_eq!(
            expand_env("a/${BREAD_SCALE_SURELY_UNSET_VAR}/b"),
            "a/${BREAD_SCALE_SURELY_UNSET_VAR}/b"
        );
        assert_eq!(expand_env("plain/path"), "plain/path");
    }
}
