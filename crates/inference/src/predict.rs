//! Type lookup followed by weight/count regression for a single query image.

use crate::factory::InferenceFactory;
use crate::interfaces::{Embedder, Regressor};
use crate::reference::ReferenceSet;
use anyhow::Context;
use bread_dataset::ImageTransform;
use cli_support::ScaleConfig;
use data_contracts::Catalog;
use models::BackboneConfig;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Prediction {
    /// Best similarity was below the threshold; no weight/count was computed.
    Unknown { similarity: f32 },
    Recognized {
        bread_type: String,
        similarity: f32,
        /// Rounded to 2 decimals.
        weight_kg: f64,
        count: i64,
    },
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Unknown { .. } => {
                write!(f, "Not a known bread type (similarity too low)")
            }
            Prediction::Recognized {
                bread_type,
                weight_kg,
                count,
                ..
            } => {
                writeln!(f, "Detected type: {bread_type}")?;
                writeln!(f, "Estimated weight: {weight_kg} kg")?;
                write!(f, "Estimated count: {count}")
            }
        }
    }
}

/// Two decimals, halves to even on the exact binary value.
pub fn round_weight(weight: f32) -> f64 {
    (weight as f64 * 100.0).round_ties_even() / 100.0
}

/// Nearest integer, halves to even.
pub fn round_count(count: f32) -> i64 {
    (count as f64).round_ties_even() as i64
}

pub struct Predictor {
    embedder: Box<dyn Embedder>,
    regressor: Box<dyn Regressor>,
    transform: ImageTransform,
    threshold: f32,
}

impl Predictor {
    pub fn new(
        embedder: Box<dyn Embedder>,
        regressor: Box<dyn Regressor>,
        transform: ImageTransform,
        threshold: f32,
    ) -> Self {
        Self {
            embedder,
            regressor,
            transform,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Rebuild the reference set from `catalog`, then classify and measure `query`.
    pub fn predict(
        &self,
        catalog: &Catalog,
        image_dir: &Path,
        query: &Path,
    ) -> anyhow::Result<Prediction> {
        let references =
            ReferenceSet::build(catalog, image_dir, &self.transform, self.embedder.as_ref())?;
        let image = self
            .transform
            .load(query)
            .with_context(|| format!("failed to load query image {}", query.display()))?;
        let embedding = self.embedder.embed(&image)?;

        let Some(best) = references.best_match(&embedding) else {
            anyhow::bail!(
                "no reference images found: none of the {} catalog rows exist under {}",
                catalog.len(),
                image_dir.display()
            );
        };
        log::info!(
            "closest reference #{} ({}) similarity {:.4}",
            best.index,
            best.label,
            best.similarity
        );

        if best.similarity < self.threshold {
            return Ok(Prediction::Unknown {
                similarity: best.similarity,
            });
        }

        let (weight, count) = self.regressor.regress(&image)?;
        log::debug!("raw regression output: weight={weight} count={count}");
        Ok(Prediction::Recognized {
            bread_type: best.label.to_string(),
            similarity: best.similarity,
            weight_kg: round_weight(weight),
            count: round_count(count),
        })
    }
}

/// Load the trained regressor, build the embedder, and predict `cfg.query_image`.
pub fn predict_from_config(cfg: &ScaleConfig) -> anyhow::Result<Prediction> {
    let factory = InferenceFactory::new(BackboneConfig {
        base_channels: cfg.base_channels,
        ..Default::default()
    });
    let regressor = factory.load_regressor(&cfg.checkpoint)?;
    let embedder = factory.build_embedder(cfg.backbone_weights.as_deref())?;
    let catalog = Catalog::from_path(&cfg.catalog)
        .with_context(|| format!("failed to load catalog {}", cfg.catalog.display()))?;

    let predictor = Predictor::new(
        Box::new(embedder),
        Box::new(regressor),
        ImageTransform::square(cfg.image_size),
        cfg.threshold,
    );
    predictor.predict(&catalog, &cfg.image_dir, &cfg.query_image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_rounds_to_two_decimals() {
        assert_eq!(round_weight(0.4567), 0.46);
        assert_eq!(round_weight(1.0), 1.0);
        assert_eq!(round_weight(-0.004), -0.0);
    }

    #[test]
    fn weight_halves_round_to_even() {
        assert_eq!(round_weight(0.625), 0.62);
        assert_eq!(round_weight(0.125), 0.12);
        assert_eq!(round_weight(0.375), 0.38);
        assert_eq!(round_weight(0.875), 0.88);
    }

    #[test]
    fn count_rounds_half_to_even() {
        assert_eq!(round_count(2.5), 2);
        assert_eq!(round_count(3.5), 4);
        assert_eq!(round_count(2.49), 2);
        assert_eq!(round_count(-0.6), -1);
    }

    #[test]
    fn display_lists_type_weight_and_count() {
        let p = Prediction::Recognized {
            bread_type: "baguette".into(),
            similarity: 0.93,
            weight_kg: 0.25,
            count: 1,
        };
        assert_eq!(
            p.to_string(),
            "Detected type: baguette\nEstimated weight: 0.25 kg\nEstimated count: 1"
        );
        assert_eq!(
            Prediction::Unknown { similarity: 0.2 }.to_string(),
            "Not a known bread type (similarity too low)"
        );
    }
}
