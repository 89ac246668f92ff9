#![recursion_limit = "256"]

pub mod factory;
pub mod interfaces;
pub mod predict;
pub mod reference;
pub mod similarity;

#[cfg(feature = "backend-wgpu")]
pub type InferenceBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type InferenceBackend = burn_ndarray::NdArray<f32>;

pub use factory::{BurnEmbedder, BurnRegressor, InferenceFactory};
pub use interfaces::{Embedder, Regressor};
pub use predict::{predict_from_config, Prediction, Predictor};
pub use reference::{Match, ReferenceSet};
pub use similarity::{best_match, cosine_similarity, DEFAULT_THRESHOLD};

pub mod prelude {
    pub use crate::factory::InferenceFactory;
    pub use crate::interfaces::{Embedder, Regressor};
    pub use crate::predict::{Prediction, Predictor};
    pub use crate::reference::ReferenceSet;
    pub use crate::InferenceBackend;
}
