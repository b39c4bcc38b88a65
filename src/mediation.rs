//! # Mediation Validation
//!
//! The significance gate of the pipeline. Each scored candidate is put
//! through a single-mediator Sobel test of whether the miRNA carries a
//! significant share of the lncRNA→mRNA association:
//!
//! - path *a*: lncRNA coefficient from the simple regression miRNA ~ lncRNA,
//! - path *b*: miRNA coefficient from the multiple regression
//!   mRNA ~ {lncRNA, miRNA},
//! - effect a·b, se = √(a²·se_b² + b²·se_a²), z = effect/se, two-tailed p
//!   from the standard normal CDF.
//!
//! Candidates are retained iff p < alpha. The sensitivity carried into the
//! validated record is the feature-stage sponge sensitivity, passed through
//! unchanged; no value is recomputed or sampled at this stage. Degenerate
//! fits fail that candidate only and the batch continues.

use crate::data::ExpressionMatrix;
use crate::stats::{self, InsufficientDataError, SimpleRegression, TwoPredictorFit};
use crate::types::{ScoredTriplet, Triplet, ValidatedTriplet};
use ndarray::ArrayView1;
use rayon::prelude::*;

/// The default significance level of the validation gate.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Sample floor for the two-predictor outcome fit (n − 3 residual df).
const MIN_MEDIATION_SAMPLES: usize = 4;

/// The raw result of one Sobel mediation test.
#[derive(Debug, Clone, Copy)]
pub struct SobelOutcome {
    /// Mediated effect a·b.
    pub effect: f64,
    /// Standard error of the mediated effect.
    pub se: f64,
    /// Two-tailed p-value under the standard normal reference.
    pub p_value: f64,
}

/// Runs the Sobel test on three expression vectors.
///
/// An effect of exactly zero (either path coefficient zero) has, by
/// definition, a p-value of 1.0. A zero-variance predictor or an exactly
/// collinear design fails with [`InsufficientDataError`].
pub fn sobel_test(
    lnc: ArrayView1<f64>,
    mir: ArrayView1<f64>,
    mrna: ArrayView1<f64>,
) -> Result<SobelOutcome, InsufficientDataError> {
    let n = lnc.len();
    if n < MIN_MEDIATION_SAMPLES {
        return Err(InsufficientDataError::TooFewSamples {
            id: "mediation outcome fit".to_string(),
            found: n,
            required: MIN_MEDIATION_SAMPLES,
        });
    }

    let path_a = SimpleRegression::fit(lnc, mir).ok_or_else(|| {
        InsufficientDataError::DegenerateFit("miRNA ~ lncRNA has a constant predictor".to_string())
    })?;
    let outcome = TwoPredictorFit::fit(mrna, lnc, mir).ok_or_else(|| {
        InsufficientDataError::DegenerateFit(
            "mRNA ~ {lncRNA, miRNA} design is singular".to_string(),
        )
    })?;

    let a = path_a.slope;
    let b = outcome.coef_x2;
    let effect = a * b;
    if effect == 0.0 {
        // No mediated effect at all: maximally insignificant.
        return Ok(SobelOutcome {
            effect: 0.0,
            se: 0.0,
            p_value: 1.0,
        });
    }

    let se = (a * a * outcome.se_x2 * outcome.se_x2
        + b * b * path_a.se_slope * path_a.se_slope)
        .sqrt();
    if se == 0.0 || !se.is_finite() {
        return Err(InsufficientDataError::DegenerateFit(
            "Sobel standard error is zero or non-finite".to_string(),
        ));
    }

    let z = effect / se;
    Ok(SobelOutcome {
        effect,
        se,
        p_value: stats::normal_two_tailed_p(z),
    })
}

fn validate_one(
    scored: &ScoredTriplet,
    matrix: &ExpressionMatrix,
) -> Result<SobelOutcome, InsufficientDataError> {
    let fetch = |id: &str| {
        matrix
            .row(id)
            .ok_or_else(|| InsufficientDataError::RowNotFound { id: id.to_string() })
    };
    let triplet: &Triplet = &scored.features.triplet;
    let lnc = fetch(&triplet.lncrna)?;
    let mir = fetch(&triplet.mirna)?;
    let mrna = fetch(&triplet.mrna)?;
    sobel_test(lnc, mir, mrna)
}

/// Applies the mediation gate to a scored batch.
///
/// Per-candidate failures are logged and skipped; retained triplets keep the
/// input (ranked) order because the parallel collection preserves it.
pub fn validate(
    scored: &[ScoredTriplet],
    matrix: &ExpressionMatrix,
    alpha: f64,
) -> Vec<ValidatedTriplet> {
    let validated: Vec<ValidatedTriplet> = scored
        .par_iter()
        .filter_map(|candidate| match validate_one(candidate, matrix) {
            Ok(outcome) if outcome.p_value < alpha => Some(ValidatedTriplet {
                triplet: candidate.features.triplet.clone(),
                score: candidate.score,
                mediation_p_value: outcome.p_value,
                sensitivity: candidate.features.sponge_sensitivity,
            }),
            Ok(_) => None,
            Err(err) => {
                log::warn!(
                    "mediation test failed for {}: {err}",
                    candidate.features.triplet
                );
                None
            }
        })
        .collect();
    log::info!(
        "mediation gate retained {} of {} scored triplets at alpha = {alpha}",
        validated.len(),
        scored.len()
    );
    validated
}
