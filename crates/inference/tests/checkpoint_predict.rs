use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn_ndarray::NdArray;
use cli_support::ScaleConfig;
use inference::{predict_from_config, Prediction};
use models::{BackboneConfig, BreadRegressor, BreadRegressorConfig};
use std::fs;

type B = NdArray<f32>;

fn tiny_setup(tmp: &tempfile::TempDir) -> ScaleConfig {
    let images = tmp.path().join("images");
    fs::create_dir_all(&images).unwrap();
    image::RgbImage::from_fn(40, 40, |x, y| image::Rgb([(x * 6) as u8, (y * 6) as u8, 128]))
        .save(images.join("img1.png"))
        .unwrap();
    let catalog = tmp.path().join("bread_data.csv");
    fs::write(&catalog, "filename,weight,count,type\nimg1.png,0.8,2,sourdough\n").unwrap();

    ScaleConfig {
        catalog,
        query_image: images.join("img1.png"),
        image_dir: images,
        checkpoint: tmp.path().join("bread_regressor.bin"),
        backbone_weights: None,
        image_size: 32,
        base_channels: 4,
        ..Default::default()
    }
}

fn save_untrained_regressor(cfg: &ScaleConfig) {
    let device = Default::default();
    let model = BreadRegressor::<B>::new(
        BreadRegressorConfig {
            backbone: BackboneConfig {
                base_channels: cfg.base_channels,
                ..Default::default()
            },
        },
        &device,
    );
    model
        .save_file(&cfg.checkpoint, &BinFileRecorder::<FullPrecisionSettings>::new())
        .unwrap();
}

#[test]
fn catalog_image_is_recognized_with_its_own_type() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tiny_setup(&tmp);
    save_untrained_regressor(&cfg);

    match predict_from_config(&cfg).unwrap() {
        Prediction::Recognized {
            bread_type,
            similarity,
            weight_kg,
            ..
        } => {
            assert_eq!(bread_type, "sourdough");
            assert!((similarity - 1.0).abs() < 1e-4);
            assert!(weight_kg.is_finite());
        }
        other => panic!("expected a recognized bread, got {other:?}"),
    }
}

#[test]
fn missing_checkpoint_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tiny_setup(&tmp);
    let err = predict_from_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
