#![recursion_limit = "256"]

pub mod util;

pub use util::{
    load_regressor_from_checkpoint, regressor_config, run_train, train, TrainArgs, TrainReport,
};

/// Backend alias for training (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn_ndarray::NdArray<f32>;
