//! Import torchvision ResNet weights into [`ResNetBackbone`](crate::ResNetBackbone).

use crate::backbone::ResNetBackboneRecord;
use burn::record::{FullPrecisionSettings, Recorder, RecorderError};
use burn::tensor::backend::Backend;
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use std::path::Path;

/// Load a torchvision `resnet18` state dict (`.pth`) as a backbone record.
///
/// The classifier (`fc.*`) entries are ignored.
pub fn load_backbone_record<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<ResNetBackboneRecord<B>, RecorderError> {
    let args = LoadArgs::new(path.to_path_buf())
        .with_key_remap(r"downsample\.0", "downsample.conv")
        .with_key_remap(r"downsample\.1", "downsample.bn")
        .with_key_remap(r"layer([1-4])\.([0-9]+)\.", "layer$1.blocks.$2.");
    PyTorchFileRecorder::<FullPrecisionSettings>::default().load(args, device)
}

/// Load pretrained backbone weights if `path` is set and exists.
///
/// Returns `Ok(None)` (with a warning) when no weights are available, so callers
/// keep the randomly initialised backbone.
pub fn maybe_load_backbone_record<B: Backend>(
    path: Option<&Path>,
    device: &B::Device,
) -> Result<Option<ResNetBackboneRecord<B>>, RecorderError> {
    let Some(path) = path else {
        log::warn!("no pretrained backbone weights configured; using random initialisation");
        return Ok(None);
    };
    if !path.exists() {
        log::warn!(
            "pretrained backbone weights {} not found; using random initialisation",
            path.display()
        );
        return Ok(None);
    }
    log::info!("loading pretrained backbone weights from {}", path.display());
    load_backbone_record(path, device).map(Some)
}
