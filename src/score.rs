//! # Candidate Scoring
//!
//! Applies an externally trained classifier to feature vectors. The
//! classifier is modeled as a capability, [`ProbabilityModel`]: given the
//! declared numeric feature slice, return a probability in [0, 1]. Any
//! concrete model can stand behind the trait; the artifact shipped with this
//! crate is a logistic model persisted as TOML, mirroring how training (out
//! of scope here) exports its coefficients.
//!
//! Scoring with no model or no features is a valid terminal state — the
//! cold-start run before a classifier has been trained — and yields an empty
//! ranked list rather than an error.

use crate::types::{NUM_NUMERIC_FEATURES, ScoredTriplet, TripletFeatures};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("no trained classifier artifact at '{path}'")]
    Unavailable { path: String },
    #[error("IO error reading model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed model artifact: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error(
        "model artifact declares {found} feature weights but the numeric \
         feature schema has {expected} fields"
    )]
    SchemaMismatch { expected: usize, found: usize },
}

/// The classifier capability: a probability over the declared numeric
/// feature schema. Implementations must be pure and thread-safe; scoring may
/// fan out across threads.
pub trait ProbabilityModel: Send + Sync {
    fn predict_probability(&self, features: &[f64; NUM_NUMERIC_FEATURES]) -> f64;
}

/// A trained logistic classifier over the declared feature schema,
/// persisted as a TOML artifact with an intercept and one weight per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LogisticModel {
    /// Loads and validates the artifact. A missing file is reported as
    /// [`ModelError::Unavailable`]; the caller decides whether that is the
    /// non-fatal cold-start case.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::Unavailable {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let model: Self = toml::from_str(&raw)?;
        if model.weights.len() != NUM_NUMERIC_FEATURES {
            return Err(ModelError::SchemaMismatch {
                expected: NUM_NUMERIC_FEATURES,
                found: model.weights.len(),
            });
        }
        Ok(model)
    }
}

impl ProbabilityModel for LogisticModel {
    fn predict_probability(&self, features: &[f64; NUM_NUMERIC_FEATURES]) -> f64 {
        let z: f64 = self.intercept
            + self
                .weights
                .iter()
                .zip(features.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

/// Scores a feature batch and returns it ranked.
///
/// An absent model or an empty batch yields an empty result. Output is
/// ordered descending by score with lexicographic (lncRNA, miRNA, mRNA)
/// tie-breaking for determinism.
pub fn score_candidates(
    features: Vec<TripletFeatures>,
    model: Option<&dyn ProbabilityModel>,
) -> Vec<ScoredTriplet> {
    let Some(model) = model else {
        log::warn!("no classifier available; producing an empty scored set");
        return Vec::new();
    };
    if features.is_empty() {
        log::info!("no feature vectors to score");
        return Vec::new();
    }

    let mut scored: Vec<ScoredTriplet> = features
        .into_iter()
        .map(|features| {
            let score = model.predict_probability(&features.numeric_features());
            ScoredTriplet { features, score }
        })
        .collect();
    scored.sort_by(ScoredTriplet::ranking_cmp);
    log::info!("scored {} candidates", scored.len());
    scored
}
