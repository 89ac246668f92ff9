//! Shared plumbing for the bread_scale binaries: TOML configuration, clap argument
//! groups that override it, backend selection and logger setup.

pub mod common;
pub mod config;

pub use common::{
    init_logging, validate_backend_choice, BackendKind, DataArgs, PredictOpts, TrainOpts,
};
pub use config::{ConfigError, ScaleConfig, CONFIG_ENV, DEFAULT_CONFIG_NAME};
