//! # Feature Extraction
//!
//! Turns each candidate triplet into the fixed-schema numeric record the
//! scorer consumes: three pairwise Pearson correlations with p-values, the
//! partial correlation of lncRNA and mRNA controlling for the miRNA, and the
//! sponge sensitivity score. The sponge sensitivity computed here is the one
//! value that flows unchanged all the way into the validated output table.
//!
//! Per-candidate computations are mutually independent, so the batch runs in
//! parallel over a read-only view of the expression matrix; failed candidates
//! are logged and dropped without disturbing the rest of the batch.

use crate::data::ExpressionMatrix;
use crate::stats::{self, InsufficientDataError};
use crate::types::{CorrelationEstimate, Triplet, TripletFeatures};
use ndarray::ArrayView1;
use rayon::prelude::*;

/// Minimum number of samples for any correlation to be estimable with a
/// t-based p-value (n − 2 degrees of freedom must be positive).
pub const MIN_SAMPLES: usize = 3;

fn fetch_row<'a>(
    matrix: &'a ExpressionMatrix,
    id: &str,
) -> Result<ArrayView1<'a, f64>, InsufficientDataError> {
    let row = matrix.row(id).ok_or_else(|| InsufficientDataError::RowNotFound {
        id: id.to_string(),
    })?;
    if row.len() < MIN_SAMPLES {
        return Err(InsufficientDataError::TooFewSamples {
            id: id.to_string(),
            found: row.len(),
            required: MIN_SAMPLES,
        });
    }
    if stats::centered_sum_of_squares(row) == 0.0 {
        return Err(InsufficientDataError::ZeroVariance { id: id.to_string() });
    }
    Ok(row)
}

fn pairwise(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    label: &str,
) -> Result<CorrelationEstimate, InsufficientDataError> {
    let r = stats::pearson(x, y)
        .ok_or_else(|| InsufficientDataError::DegenerateFit(label.to_string()))?;
    Ok(CorrelationEstimate {
        r,
        p_value: stats::pearson_p_value(r, x.len()),
    })
}

/// Computes the feature vector for one candidate triplet.
///
/// Fails with [`InsufficientDataError`] when any of the three expression
/// vectors has fewer than [`MIN_SAMPLES`] samples or zero variance, or when
/// the partial correlation is left undefined by a degenerate residual fit.
pub fn extract(
    triplet: &Triplet,
    matrix: &ExpressionMatrix,
) -> Result<TripletFeatures, InsufficientDataError> {
    let lnc = fetch_row(matrix, &triplet.lncrna)?;
    let mir = fetch_row(matrix, &triplet.mirna)?;
    let mrna = fetch_row(matrix, &triplet.mrna)?;
    let n = lnc.len();

    let corr_lnc_mrna = pairwise(lnc, mrna, "pearson(lncRNA, mRNA)")?;
    let corr_lnc_mirna = pairwise(lnc, mir, "pearson(lncRNA, miRNA)")?;
    let corr_mrna_mirna = pairwise(mrna, mir, "pearson(mRNA, miRNA)")?;

    // Partial correlation via residuals of each endpoint regressed on the
    // miRNA. The miRNA's variance was validated above, so an undefined result
    // can only mean a constant residual series.
    let partial_r = stats::partial_correlation(lnc, mrna, mir).ok_or_else(|| {
        InsufficientDataError::DegenerateFit(format!("partial correlation for {triplet}"))
    })?;
    let partial_lnc_mrna = CorrelationEstimate {
        r: partial_r,
        p_value: stats::pearson_p_value(partial_r, n),
    };

    Ok(TripletFeatures {
        triplet: triplet.clone(),
        sponge_sensitivity: corr_lnc_mrna.r - partial_r,
        corr_lnc_mrna,
        corr_lnc_mirna,
        corr_mrna_mirna,
        partial_lnc_mrna,
        // Sequence-derived slots are populated by an external annotator only.
        mre_count: None,
        seed_match_energy: None,
        cytoplasmic_localization: None,
    })
}

/// Extracts features for a whole candidate batch in parallel.
///
/// Candidates that fail with [`InsufficientDataError`] are logged and
/// skipped; the relative order of the survivors matches the input order, so
/// the stage stays deterministic.
pub fn extract_all(triplets: &[Triplet], matrix: &ExpressionMatrix) -> Vec<TripletFeatures> {
    let features: Vec<TripletFeatures> = triplets
        .par_iter()
        .filter_map(|triplet| match extract(triplet, matrix) {
            Ok(features) => Some(features),
            Err(err) => {
                log::warn!("skipping candidate {triplet}: {err}");
                None
            }
        })
        .collect();
    log::info!(
        "extracted features for {} of {} candidates",
        features.len(),
        triplets.len()
    );
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn matrix_from(rows: Vec<(&str, Vec<f64>)>) -> ExpressionMatrix {
        let n = rows[0].1.len();
        let samples = (1..=n).map(|i| format!("s{i}")).collect();
        let rows = rows
            .into_iter()
            .map(|(id, values)| (id.to_string(), values))
            .collect();
        ExpressionMatrix::from_rows(samples, rows).unwrap()
    }

    fn demo_rows() -> Vec<(&'static str, Vec<f64>)> {
        vec![
            ("L1", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
            ("M1", vec![8.0, 6.0, 7.0, 5.0, 4.0, 2.0, 3.0, 1.0]),
            ("G1", vec![2.0, 2.5, 3.0, 5.0, 4.5, 6.0, 7.5, 7.0]),
        ]
    }

    #[test]
    fn sponge_sensitivity_is_raw_minus_partial() {
        let matrix = matrix_from(demo_rows());
        let triplet = Triplet::new("L1", "M1", "G1");
        let features = extract(&triplet, &matrix).unwrap();
        assert_abs_diff_eq!(
            features.sponge_sensitivity,
            features.corr_lnc_mrna.r - features.partial_lnc_mrna.r,
            epsilon = 1e-12
        );
    }

    #[test]
    fn extraction_is_row_order_independent() {
        let triplet = Triplet::new("L1", "M1", "G1");
        let forward = matrix_from(demo_rows());
        let mut reversed_rows = demo_rows();
        reversed_rows.reverse();
        let reversed = matrix_from(reversed_rows);

        let a = extract(&triplet, &forward).unwrap();
        let b = extract(&triplet, &reversed).unwrap();
        for (x, y) in a.numeric_features().iter().zip(b.numeric_features().iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_mirna_is_insufficient_data() {
        let matrix = matrix_from(vec![
            ("L1", vec![1.0, 2.0, 3.0, 4.0]),
            ("M1", vec![5.0, 5.0, 5.0, 5.0]),
            ("G1", vec![2.0, 4.0, 1.0, 3.0]),
        ]);
        let err = extract(&Triplet::new("L1", "M1", "G1"), &matrix).unwrap_err();
        assert!(matches!(err, InsufficientDataError::ZeroVariance { id } if id == "M1"));
    }

    #[test]
    fn too_few_samples_is_rejected() {
        let matrix = matrix_from(vec![
            ("L1", vec![1.0, 2.0]),
            ("M1", vec![3.0, 1.0]),
            ("G1", vec![2.0, 4.0]),
        ]);
        let err = extract(&Triplet::new("L1", "M1", "G1"), &matrix).unwrap_err();
        assert!(matches!(err, InsufficientDataError::TooFewSamples { .. }));
    }

    #[test]
    fn batch_extraction_skips_failures_and_keeps_order() {
        let matrix = matrix_from(vec![
            ("L1", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ("L2", vec![4.0, 4.0, 4.0, 4.0, 4.0, 4.0]), // constant: dropped
            ("M1", vec![6.0, 4.0, 5.0, 2.0, 3.0, 1.0]),
            ("G1", vec![2.0, 3.0, 2.5, 5.0, 4.0, 6.0]),
        ]);
        let candidates = vec![
            Triplet::new("L1", "M1", "G1"),
            Triplet::new("L2", "M1", "G1"),
        ];
        let features = extract_all(&candidates, &matrix);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].triplet.lncrna, "L1");
    }
}
