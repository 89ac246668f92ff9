//! Backbone + linear head predicting (weight, count).

use crate::backbone::{BackboneConfig, ResNetBackbone, ResNetBackboneRecord};
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{backend::Backend, Tensor};

/// Outputs per image: weight, count.
pub const REGRESSION_OUTPUTS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreadRegressorConfig {
    pub backbone: BackboneConfig,
}

#[derive(Module, Debug)]
pub struct BreadRegressor<B: Backend> {
    backbone: ResNetBackbone<B>,
    regressor: Linear<B>,
}

impl<B: Backend> BreadRegressor<B> {
    pub fn new(cfg: BreadRegressorConfig, device: &B::Device) -> Self {
        let backbone = ResNetBackbone::new(cfg.backbone, device);
        let regressor =
            LinearConfig::new(cfg.backbone.feature_dim(), REGRESSION_OUTPUTS).init(device);
        Self {
            backbone,
            regressor,
        }
    }

    /// Replace the backbone parameters (e.g. with pretrained ImageNet weights),
    /// keeping the head as initialised.
    pub fn with_backbone_record(mut self, record: ResNetBackboneRecord<B>) -> Self {
        self.backbone = self.backbone.load_record(record);
        self
    }

    /// `[B, 3, H, W]` -> `[B, 2]` with columns (weight, count).
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward_flat(images);
        self.regressor.forward(features)
    }
}
