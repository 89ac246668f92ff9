use bread_dataset::TransformedImage;

/// Maps a transformed image to a fixed-length feature vector.
pub trait Embedder {
    fn embed(&self, image: &TransformedImage) -> anyhow::Result<Vec<f32>>;
}

/// Predicts raw (weight, count) for a transformed image.
pub trait Regressor {
    fn regress(&self, image: &TransformedImage) -> anyhow::Result<(f32, f32)>;
}
