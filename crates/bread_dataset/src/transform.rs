//! Fixed resize + normalize transform.

use crate::types::{DatasetError, DatasetResult, TransformedImage};
use image::imageops::FilterType;
use std::path::Path;

/// Per-channel mean of the ImageNet training set, which the pretrained backbone expects.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub const DEFAULT_IMAGE_SIZE: u32 = 224;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTransform {
    /// Output (width, height).
    pub size: (u32, u32),
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::square(DEFAULT_IMAGE_SIZE)
    }
}

impl ImageTransform {
    /// ImageNet-normalized transform producing `side x side` images.
    pub fn square(side: u32) -> Self {
        Self {
            size: (side, side),
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    /// Open `path`, convert to RGB, and transform it.
    pub fn load(&self, path: &Path) -> DatasetResult<TransformedImage> {
        if !path.exists() {
            return Err(DatasetError::MissingImageFile {
                path: path.to_path_buf(),
            });
        }
        let img = image::open(path)
            .map_err(|source| DatasetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Ok(self.apply(&img))
    }

    /// Stretch to `size` (aspect ratio is not preserved), scale to [0, 1], then
    /// normalize each channel with `mean`/`std`.
    pub fn apply(&self, img: &image::RgbImage) -> TransformedImage {
        let (w, h) = self.size;
        let resized = if img.dimensions() == (w, h) {
            img.clone()
        } else {
            image::imageops::resize(img, w, h, FilterType::Triangle)
        };

        let plane = (w * h) as usize;
        let mut chw = vec![0.0f32; plane * 3];
        for (x, y, px) in resized.enumerate_pixels() {
            let offset = (y * w + x) as usize;
            for c in 0..3 {
                let v = px[c] as f32 / 255.0;
                chw[c * plane + offset] = (v - self.mean[c]) / self.std[c];
            }
        }

        TransformedImage {
            chw,
            width: w,
            height: h,
        }
    }
}
