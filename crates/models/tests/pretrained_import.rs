//! Loads `fixtures/tiny_resnet18.pth`: a torchvision-style state dict for a
//! `base_channels = 4`, one-block-per-stage backbone. Keys use the torchvision
//! names (`layer2.0.downsample.1.running_mean`, `bn1.weight`, ...), includes
//! `num_batches_tracked` and a `fc.*` classifier that the backbone ignores.
//!
//! Values are deterministic: conv weights count up in steps of 0.001 in key
//! order, batch norm `weight`/`running_mean` of a block with offset `s` are
//! `1.0 + 0.1 * i + s` and `0.25 * (i + 1) + s`.

use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use models::{load_backbone_record, maybe_load_backbone_record, BackboneConfig, EmbeddingModel};
use std::path::{Path, PathBuf};

type B = NdArray<f32>;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tiny_resnet18.pth")
}

fn tiny() -> BackboneConfig {
    BackboneConfig {
        base_channels: 4,
        depths: [1, 1, 1, 1],
    }
}

fn values<const D: usize>(t: Tensor<B, D>) -> Vec<f32> {
    t.into_data().to_vec::<f32>().unwrap()
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
    }
}

#[test]
fn stem_conv_and_batch_norm_are_imported() {
    let device = Default::default();
    let record = load_backbone_record::<B>(&fixture(), &device).expect("load fixture");

    let conv = record.conv1.weight.val();
    assert_eq!(conv.dims(), [4, 3, 7, 7]);
    assert_close(&values(conv)[..3], &[0.0, 0.001, 0.002]);

    // torchvision `weight`/`bias` land in gamma/beta.
    assert_close(&values(record.bn1.gamma.val()), &[1.0, 1.1, 1.2, 1.3]);
    assert_close(&values(record.bn1.beta.val()), &[0.0, -0.05, -0.1, -0.15]);
    assert_close(&values(record.bn1.running_mean.val()), &[0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn stage_blocks_are_remapped() {
    let device = Default::default();
    let record = load_backbone_record::<B>(&fixture(), &device).expect("load fixture");

    assert_eq!(record.layer1.blocks.len(), 1);
    let block = &record.layer1.blocks[0];
    assert!(block.downsample.is_none());
    // 4*3*7*7 stem weights precede layer1.0.conv1.
    let conv1 = values(block.conv1.weight.val());
    assert_close(&conv1[..2], &[0.588, 0.589]);
    assert_close(&values(block.bn1.gamma.val()), &[2.0, 2.1, 2.2, 2.3]);
    assert_close(&values(block.bn2.running_var.val()), &[3.0, 3.5, 4.0, 4.5]);
}

#[test]
fn downsample_projection_is_remapped() {
    let device = Default::default();
    let record = load_backbone_record::<B>(&fixture(), &device).expect("load fixture");

    let down = record.layer2.blocks[0]
        .downsample
        .as_ref()
        .expect("layer2 projects the shortcut");
    assert_eq!(down.conv.weight.val().dims(), [8, 4, 1, 1]);
    assert_close(
        &values(down.bn.running_mean.val()),
        &[20.25, 20.5, 20.75, 21.0, 21.25, 21.5, 21.75, 22.0],
    );
    assert!(record.layer4.blocks[0].downsample.is_some());
}

#[test]
fn imported_weights_drive_the_embedding_model() {
    let device = Default::default();
    let record = maybe_load_backbone_record::<B>(Some(&fixture()), &device)
        .expect("load fixture")
        .expect("fixture exists");
    let model = EmbeddingModel::<B>::new(tiny(), &device).with_backbone_record(record);

    let image = Tensor::<B, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let out = model.forward(image);
    assert_eq!(out.dims(), [2, tiny().feature_dim()]);
    assert!(values(out).iter().all(|v| v.is_finite()));
}
