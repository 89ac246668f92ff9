//! Batch iteration for training.

use crate::dataset::BreadDataset;
use crate::types::{DatasetError, DatasetResult};
use burn::tensor::{backend::Backend, Tensor};
use rand::seq::SliceRandom;
use rand::Rng;

pub struct BreadBatch<B: Backend> {
    /// Shape `[n, 3, H, W]`.
    pub images: Tensor<B, 4>,
    /// Shape `[n, 2]`: (weight, count) per sample.
    pub targets: Tensor<B, 2>,
}

/// One pass over a [`BreadDataset`] in batches of at most `batch_size`.
///
/// The final batch may be smaller. Any unreadable image aborts the pass.
pub struct BatchIter<'a> {
    dataset: &'a BreadDataset,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    processed_samples: usize,
    processed_batches: usize,
    images_buf: Vec<f32>,
    targets_buf: Vec<f32>,
}

impl<'a> BatchIter<'a> {
    /// Visit rows in catalog order.
    pub fn sequential(dataset: &'a BreadDataset, batch_size: usize) -> Self {
        Self::from_order(dataset, (0..dataset.len()).collect(), batch_size)
    }

    /// Visit rows in a fresh random order drawn from `rng`.
    pub fn shuffled<R: Rng + ?Sized>(
        dataset: &'a BreadDataset,
        batch_size: usize,
        rng: &mut R,
    ) -> Self {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(rng);
        Self::from_order(dataset, order, batch_size)
    }

    fn from_order(dataset: &'a BreadDataset, order: Vec<usize>, batch_size: usize) -> Self {
        Self {
            dataset,
            order,
            cursor: 0,
            batch_size: batch_size.max(1),
            processed_samples: 0,
            processed_batches: 0,
            images_buf: Vec::new(),
            targets_buf: Vec::new(),
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn processed_samples(&self) -> usize {
        self.processed_samples
    }

    pub fn processed_batches(&self) -> usize {
        self.processed_batches
    }

    pub fn next_batch<B: Backend>(
        &mut self,
        device: &B::Device,
    ) -> DatasetResult<Option<BreadBatch<B>>> {
        if self.cursor >= self.order.len() {
            return Ok(None);
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let slice = &self.order[self.cursor..end];
        self.cursor = end;

        self.images_buf.clear();
        self.targets_buf.clear();

        let mut expected_size: Option<(u32, u32)> = None;
        for &idx in slice {
            let item = self.dataset.get(idx)?;
            let size = (item.image.width, item.image.height);
            match expected_size {
                None => expected_size = Some(size),
                Some(sz) if sz != size => {
                    return Err(DatasetError::Other(format!(
                        "batch contains varying image sizes: {:?} vs {:?}",
                        sz, size
                    )));
                }
                _ => {}
            }
            self.images_buf.extend_from_slice(&item.image.chw);
            self.targets_buf.push(item.weight);
            self.targets_buf.push(item.count);
        }

        let (width, height) = match expected_size {
            Some(sz) => sz,
            None => return Ok(None),
        };
        let batch_len = slice.len();
        let images = Tensor::<B, 1>::from_floats(self.images_buf.as_slice(), device).reshape([
            batch_len,
            3,
            height as usize,
            width as usize,
        ]);
        let targets = Tensor::<B, 1>::from_floats(self.targets_buf.as_slice(), device)
            .reshape([batch_len, 2]);

        self.processed_samples += batch_len;
        self.processed_batches += 1;
        log::trace!(
            "[dataset] batch={} samples={} size={}x{}",
            self.processed_batches,
            batch_len,
            width,
            height
        );

        Ok(Some(BreadBatch { images, targets }))
    }
}
