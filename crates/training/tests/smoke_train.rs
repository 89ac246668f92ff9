use burn::tensor::backend::Backend;
use cli_support::ScaleConfig;
use std::fs;
use std::path::Path;
use training::{load_regressor_from_checkpoint, regressor_config, train, TrainBackend};

fn synthetic_config(tmp: &tempfile::TempDir, rows: &[(&str, f32, f32)]) -> ScaleConfig {
    let images = tmp.path().join("images");
    fs::create_dir_all(&images).unwrap();
    let mut csv = String::from("filename,weight,count,type\n");
    for (i, (name, weight, count)) in rows.iter().enumerate() {
        let shade = (i as u8).wrapping_mul(60);
        image::RgbImage::from_fn(40, 36, |x, _y| image::Rgb([shade, (x * 5) as u8, 90]))
            .save(images.join(name))
            .unwrap();
        csv.push_str(&format!("{name},{weight},{count},baguette\n"));
    }
    let catalog = tmp.path().join("bread_data.csv");
    fs::write(&catalog, csv).unwrap();

    ScaleConfig {
        catalog,
        image_dir: images,
        checkpoint: tmp.path().join("ckpt").join("bread_regressor.bin"),
        backbone_weights: None,
        image_size: 32,
        base_channels: 4,
        seed: Some(3),
        ..Default::default()
    }
}

#[test]
fn trains_exactly_ten_passes_and_writes_loadable_checkpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = synthetic_config(
        &tmp,
        &[("a.png", 0.3, 1.0), ("b.png", 1.2, 4.0), ("c.png", 0.6, 2.0)],
    );
    assert_eq!(cfg.epochs, 10);
    assert!(!cfg.checkpoint.exists());

    let report = train(&cfg).expect("training run");
    assert_eq!(report.epoch_losses.len(), 10);
    assert!(report.epoch_losses.iter().all(|l| l.is_finite() && *l >= 0.0));
    assert_eq!(report.checkpoint, cfg.checkpoint);
    assert!(report.checkpoint.exists());

    let device = <TrainBackend as Backend>::Device::default();
    load_regressor_from_checkpoint(&report.checkpoint, regressor_config(&cfg), &device)
        .expect("load trained checkpoint");
}

#[test]
fn overwrites_existing_checkpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = synthetic_config(&tmp, &[("a.png", 0.5, 2.0)]);
    cfg.epochs = 1;
    fs::create_dir_all(cfg.checkpoint.parent().unwrap()).unwrap();
    fs::write(&cfg.checkpoint, b"stale").unwrap();

    train(&cfg).expect("training run");
    assert_ne!(fs::read(&cfg.checkpoint).unwrap(), b"stale");
}

#[test]
fn missing_image_aborts_training() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = synthetic_config(&tmp, &[("a.png", 0.5, 2.0)]);
    fs::write(
        &cfg.catalog,
        "filename,weight,count,type\na.png,0.5,2,rye\nmissing.png,1.0,3,rye\n",
    )
    .unwrap();
    cfg.epochs = 1;

    assert!(train(&cfg).is_err());
    assert!(!Path::new(&cfg.checkpoint).exists());
}

#[test]
fn empty_catalog_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = synthetic_config(&tmp, &[]);
    assert!(train(&cfg).is_err());
}
