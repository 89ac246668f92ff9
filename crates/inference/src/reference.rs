//! Labelled embeddings of the catalog images, rebuilt for every prediction.

use crate::interfaces::Embedder;
use crate::similarity::best_match;
use anyhow::Context;
use bread_dataset::ImageTransform;
use data_contracts::Catalog;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    embeddings: Vec<Vec<f32>>,
    labels: Vec<String>,
    skipped: usize,
}

/// Closest reference to a query embedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub index: usize,
    pub label: &'a str,
    pub similarity: f32,
}

impl ReferenceSet {
    /// Embed every catalog image that exists under `image_dir`.
    ///
    /// Rows whose file is absent are skipped; an image that exists but cannot be
    /// decoded is an error.
    pub fn build(
        catalog: &Catalog,
        image_dir: &Path,
        transform: &ImageTransform,
        embedder: &dyn Embedder,
    ) -> anyhow::Result<Self> {
        let mut set = Self::default();
        let total = catalog.len();
        for (i, row) in catalog.iter().enumerate() {
            let path = row.image_path(image_dir);
            if !path.exists() {
                log::debug!("[{}/{}] skipping {}: file not found", i + 1, total, path.display());
                set.skipped += 1;
                continue;
            }
            let image = transform.load(&path)?;
            let embedding = embedder
                .embed(&image)
                .with_context(|| format!("failed to embed {}", path.display()))?;
            log::debug!("[{}/{}] embedded {} ({})", i + 1, total, path.display(), row.bread_type);
            set.push(embedding, row.bread_type.clone());
        }
        log::info!(
            "reference set: {} embeddings, {} rows skipped (missing image)",
            set.len(),
            set.skipped
        );
        Ok(set)
    }

    pub fn push(&mut self, embedding: Vec<f32>, label: String) {
        self.embeddings.push(embedding);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Catalog rows left out because their image was missing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn best_match(&self, query: &[f32]) -> Option<Match<'_>> {
        best_match(query, self.embeddings.iter().map(Vec::as_slice)).map(|(index, similarity)| {
            Match {
                index,
                label: &self.labels[index],
                similarity,
            }
        })
    }
}
