//! # Shared Statistical Estimators
//!
//! The numeric kernel under both feature extraction and mediation testing:
//! Pearson correlation with a Student's t reference p-value, simple ordinary
//! least squares, and two-predictor ordinary least squares solved through
//! centered normal equations. Everything here is deterministic and pure; the
//! callers attach gene identifiers to failures.

use ndarray::{Array1, ArrayView1};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use thiserror::Error;

/// A per-candidate data deficiency. These never abort a batch: the candidate
/// is logged and skipped while the run continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsufficientDataError {
    #[error("'{id}' is not a row of the expression matrix")]
    RowNotFound { id: String },
    #[error("'{id}' has {found} samples but at least {required} are required")]
    TooFewSamples {
        id: String,
        found: usize,
        required: usize,
    },
    #[error("'{id}' has zero variance across samples")]
    ZeroVariance { id: String },
    #[error("degenerate regression fit: {0}")]
    DegenerateFit(String),
}

/// Sum of centered cross-products Σ(x−x̄)(y−ȳ).
fn centered_cross_sum(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.sum() / n;
    let mean_y = y.sum() / n;
    x.iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum()
}

/// Population-agnostic variance proxy: Σ(x−x̄)².
pub fn centered_sum_of_squares(x: ArrayView1<f64>) -> f64 {
    centered_cross_sum(x, x)
}

/// Pearson product-moment correlation of two equal-length series.
///
/// Returns `None` when either series has zero variance, in which case the
/// coefficient is undefined.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    let sxx = centered_sum_of_squares(x);
    let syy = centered_sum_of_squares(y);
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(centered_cross_sum(x, y) / denom)
}

/// Two-tailed p-value for a Pearson coefficient under the Student's t
/// reference distribution with `n − 2` degrees of freedom.
///
/// `|r| == 1` maps to a p-value of exactly 0.
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    debug_assert!(n >= 3, "p-value requires at least 3 samples");
    let df = (n - 2) as f64;
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let t = r.abs() * (df / (1.0 - r2)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t)),
        // df > 0 is guaranteed by the sample-count check above.
        Err(_) => f64::NAN,
    }
}

/// Two-tailed p-value for a z statistic under the standard normal CDF.
pub fn normal_two_tailed_p(z: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(standard) => 2.0 * (1.0 - standard.cdf(z.abs())),
        // The parameters are fixed and valid.
        Err(_) => f64::NAN,
    }
}

/// A fitted simple regression `y ~ intercept + slope·x`.
#[derive(Debug, Clone, Copy)]
pub struct SimpleRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the slope; NaN when residual degrees of freedom are
    /// exhausted (n ≤ 2).
    pub se_slope: f64,
}

impl SimpleRegression {
    /// Fits by least squares. Returns `None` when the predictor has zero
    /// variance, which leaves the slope undefined.
    pub fn fit(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<Self> {
        debug_assert_eq!(x.len(), y.len());
        let n = x.len() as f64;
        let sxx = centered_sum_of_squares(x);
        if sxx == 0.0 {
            return None;
        }
        let sxy = centered_cross_sum(x, y);
        let syy = centered_sum_of_squares(y);
        let slope = sxy / sxx;
        let intercept = y.sum() / n - slope * x.sum() / n;

        let df = x.len() as f64 - 2.0;
        let sse = (syy - slope * sxy).max(0.0);
        let se_slope = if df > 0.0 {
            (sse / df / sxx).sqrt()
        } else {
            f64::NAN
        };
        Some(Self {
            slope,
            intercept,
            se_slope,
        })
    }

    /// The residual series `y − (intercept + slope·x)`.
    pub fn residuals(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(x.len());
        for (i, (xi, yi)) in x.iter().zip(y.iter()).enumerate() {
            out[i] = yi - (self.intercept + self.slope * xi);
        }
        out
    }
}

/// The second-predictor estimate from `y ~ intercept + c1·x1 + c2·x2`,
/// solved through the centered 2×2 normal equations (algebraically identical
/// to the full three-parameter fit with an intercept).
#[derive(Debug, Clone, Copy)]
pub struct TwoPredictorFit {
    pub coef_x1: f64,
    pub coef_x2: f64,
    /// Standard error of `coef_x2`.
    pub se_x2: f64,
}

impl TwoPredictorFit {
    /// Returns `None` when the design is singular (a constant predictor or
    /// exact collinearity between `x1` and `x2`) or when there are no
    /// residual degrees of freedom (n < 4).
    pub fn fit(y: ArrayView1<f64>, x1: ArrayView1<f64>, x2: ArrayView1<f64>) -> Option<Self> {
        debug_assert_eq!(y.len(), x1.len());
        debug_assert_eq!(y.len(), x2.len());
        let n = y.len();
        if n < 4 {
            return None;
        }

        let s11 = centered_sum_of_squares(x1);
        let s22 = centered_sum_of_squares(x2);
        let s12 = centered_cross_sum(x1, x2);
        let s1y = centered_cross_sum(x1, y);
        let s2y = centered_cross_sum(x2, y);
        let syy = centered_sum_of_squares(y);

        let det = s11 * s22 - s12 * s12;
        if det <= 0.0 || !det.is_finite() {
            return None;
        }

        let coef_x1 = (s22 * s1y - s12 * s2y) / det;
        let coef_x2 = (s11 * s2y - s12 * s1y) / det;

        let df = (n - 3) as f64;
        let sse = (syy - coef_x1 * s1y - coef_x2 * s2y).max(0.0);
        let sigma2 = sse / df;
        // Var(coef_x2) = σ² · [ (X'X)⁻¹ ]₂₂ = σ² · S11 / det.
        let se_x2 = (sigma2 * s11 / det).sqrt();

        Some(Self {
            coef_x1,
            coef_x2,
            se_x2,
        })
    }
}

/// Partial correlation of `x` and `y` controlling for `z`: the Pearson
/// correlation of the residuals of `x ~ z` and `y ~ z`.
///
/// Returns `None` when `z` has zero variance or either residual series is
/// constant (perfect collinearity with `z`).
pub fn partial_correlation(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    z: ArrayView1<f64>,
) -> Option<f64> {
    let fit_x = SimpleRegression::fit(z, x)?;
    let fit_y = SimpleRegression::fit(z, y)?;
    let res_x = fit_x.residuals(z, x);
    let res_y = fit_y.residuals(z, y);
    pearson(res_x.view(), res_y.view())
}
