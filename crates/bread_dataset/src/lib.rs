//! Dataset loading and Burn-compatible batching for the bread catalog.
//!
//! This crate provides:
//! - The fixed resize/normalize image transform shared by training and inference
//! - Index-based access to (image, weight, count) triples
//! - Shuffled batch iteration producing Burn tensors

pub mod batch;
pub mod dataset;
pub mod transform;
pub mod types;

pub use batch::{BatchIter, BreadBatch};
pub use dataset::BreadDataset;
pub use transform::{ImageTransform, IMAGENET_MEAN, IMAGENET_STD};
pub use types::*;
