use crate::interfaces::{Embedder, Regressor};
use crate::InferenceBackend;
use bread_dataset::TransformedImage;
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use models::{
    maybe_load_backbone_record, BackboneConfig, BreadRegressor, BreadRegressorConfig,
    EmbeddingModel,
};
use std::path::Path;

type Device = <InferenceBackend as Backend>::Device;

/// Embedder backed by the frozen ResNet backbone.
pub struct BurnEmbedder {
    model: EmbeddingModel<InferenceBackend>,
    device: Device,
}

impl Embedder for BurnEmbedder {
    fn embed(&self, image: &TransformedImage) -> anyhow::Result<Vec<f32>> {
        let input = image.to_tensor::<InferenceBackend>(&self.device);
        self.model
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("failed to read embedding: {e:?}"))
    }
}

/// Regressor backed by a trained [`BreadRegressor`] checkpoint.
pub struct BurnRegressor {
    model: BreadRegressor<InferenceBackend>,
    device: Device,
}

impl Regressor for BurnRegressor {
    fn regress(&self, image: &TransformedImage) -> anyhow::Result<(f32, f32)> {
        let input = image.to_tensor::<InferenceBackend>(&self.device);
        let out = self
            .model
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("failed to read regression output: {e:?}"))?;
        match out.as_slice() {
            [weight, count, ..] => Ok((*weight, *count)),
            _ => anyhow::bail!("regressor produced {} values, expected 2", out.len()),
        }
    }
}

/// Builds the Burn-backed models on the inference device.
///
/// The inference backend has no autodiff, so batch norm runs on its running
/// statistics and no gradients are tracked.
pub struct InferenceFactory {
    backbone: BackboneConfig,
    device: Device,
}

impl InferenceFactory {
    pub fn new(backbone: BackboneConfig) -> Self {
        let device = Device::default();
        log::info!("inference device: {:?}", device);
        Self { backbone, device }
    }

    /// Load trained regressor parameters. A missing or incompatible checkpoint is an error.
    pub fn load_regressor(&self, checkpoint: &Path) -> anyhow::Result<BurnRegressor> {
        let on_disk = checkpoint.with_extension("bin");
        if !on_disk.exists() {
            anyhow::bail!(
                "regressor checkpoint {} not found; run training first",
                on_disk.display()
            );
        }
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let model = BreadRegressor::<InferenceBackend>::new(
            BreadRegressorConfig {
                backbone: self.backbone,
            },
            &self.device,
        )
        .load_file(checkpoint, &recorder, &self.device)
        .map_err(|e| {
            anyhow::anyhow!("failed to load regressor checkpoint {}: {e}", on_disk.display())
        })?;
        Ok(BurnRegressor {
            model,
            device: self.device.clone(),
        })
    }

    /// Frozen backbone, initialised from pretrained weights when available.
    pub fn build_embedder(&self, backbone_weights: Option<&Path>) -> anyhow::Result<BurnEmbedder> {
        let mut model = EmbeddingModel::<InferenceBackend>::new(self.backbone, &self.device);
        if let Some(record) =
            maybe_load_backbone_record::<InferenceBackend>(backbone_weights, &self.device)
                .map_err(|e| anyhow::anyhow!("failed to load pretrained backbone weights: {e}"))?
        {
            model = model.with_backbone_record(record);
        }
        Ok(BurnEmbedder {
            model,
            device: self.device.clone(),
        })
    }
}
