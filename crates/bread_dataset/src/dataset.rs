use crate::transform::ImageTransform;
use crate::types::{BreadItem, DatasetError, DatasetResult};
use data_contracts::{Catalog, CatalogRow};
use std::path::{Path, PathBuf};

/// Index-addressable view over a catalog and its image directory.
///
/// Images are decoded and transformed on every `get`; nothing is cached.
#[derive(Debug, Clone)]
pub struct BreadDataset {
    catalog: Catalog,
    image_dir: PathBuf,
    transform: ImageTransform,
}

impl BreadDataset {
    pub fn new(catalog: Catalog, image_dir: impl Into<PathBuf>, transform: ImageTransform) -> Self {
        Self {
            catalog,
            image_dir: image_dir.into(),
            transform,
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }

    pub fn row(&self, index: usize) -> DatasetResult<&CatalogRow> {
        self.catalog
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.catalog.len(),
            })
    }

    /// Load row `index` as (transformed image, weight, count).
    pub fn get(&self, index: usize) -> DatasetResult<BreadItem> {
        let row = self.row(index)?;
        let image = self.transform.load(&row.image_path(&self.image_dir))?;
        Ok(BreadItem {
            image,
            weight: row.weight,
            count: row.count,
        })
    }
}
