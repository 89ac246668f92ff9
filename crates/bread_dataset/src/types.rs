//! Core types and error definitions for bread_dataset.

use burn::tensor::{backend::Backend, Tensor};
use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("index {index} out of range for dataset of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("image file missing: {path}")]
    MissingImageFile { path: PathBuf },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{0}")]
    Other(String),
}

/// Image after the fixed transform, in CHW layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedImage {
    pub chw: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl TransformedImage {
    /// `[channels, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [3, self.height as usize, self.width as usize]
    }

    /// Single-image batch `[1, 3, H, W]` on `device`.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 4> {
        Tensor::<B, 1>::from_floats(self.chw.as_slice(), device).reshape([
            1,
            3,
            self.height as usize,
            self.width as usize,
        ])
    }
}

/// One dataset element: transformed image plus its regression targets.
#[derive(Debug, Clone)]
pub struct BreadItem {
    pub image: TransformedImage,
    pub weight: f32,
    pub count: f32,
}
