//! Burn modules for bread weight/count regression and bread-type embeddings.
//!
//! - `ResNetBackbone`: ResNet-18 style feature extractor (no classifier).
//! - `BreadRegressor`: backbone + 2-output linear head, trained end-to-end.
//! - `EmbeddingModel`: the same backbone, frozen, used for similarity search.
//!
//! These are pure Burn modules; the `training` and `inference` crates own the
//! loops, checkpoints and device choice.

pub mod backbone;
pub mod embedding;
pub mod pretrained;
pub mod regressor;

pub use backbone::{BackboneConfig, ResNetBackbone, ResNetBackboneRecord};
pub use embedding::EmbeddingModel;
pub use pretrained::{load_backbone_record, maybe_load_backbone_record};
pub use regressor::{BreadRegressor, BreadRegressorConfig, REGRESSION_OUTPUTS};

pub mod prelude {
    pub use super::{
        BackboneConfig, BreadRegressor, BreadRegressorConfig, EmbeddingModel, ResNetBackbone,
    };
}
