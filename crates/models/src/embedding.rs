//! Frozen backbone used purely as a feature extractor.

use crate::backbone::{BackboneConfig, ResNetBackbone, ResNetBackboneRecord};
use burn::module::Module;
use burn::tensor::{backend::Backend, Tensor};

#[derive(Module, Debug)]
pub struct EmbeddingModel<B: Backend> {
    backbone: ResNetBackbone<B>,
}

impl<B: Backend> EmbeddingModel<B> {
    /// Parameters are marked as not requiring gradients.
    pub fn new(cfg: BackboneConfig, device: &B::Device) -> Self {
        Self {
            backbone: ResNetBackbone::new(cfg, device),
        }
        .no_grad()
    }

    pub fn with_backbone_record(mut self, record: ResNetBackboneRecord<B>) -> Self {
        self.backbone = self.backbone.load_record(record);
        self.no_grad()
    }

    /// `[B, 3, H, W]` -> `[B, feature_dim]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        self.backbone.forward_flat(images).detach()
    }
}
