// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is only for types that are shared between stages, not types that are
// private to a single module.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A candidate (lncRNA, miRNA, mRNA) regulatory unit.
///
/// A triplet is only meaningful when both the lncRNA and the mRNA are curated
/// targets of the miRNA and all three identifiers are rows of the expression
/// matrix; the candidate generator enforces this at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triplet {
    pub lncrna: String,
    pub mirna: String,
    pub mrna: String,
}

impl Triplet {
    pub fn new(
        lncrna: impl Into<String>,
        mirna: impl Into<String>,
        mrna: impl Into<String>,
    ) -> Self {
        Self {
            lncrna: lncrna.into(),
            mirna: mirna.into(),
            mrna: mrna.into(),
        }
    }

    /// Lexicographic identity key, used as the deterministic tie-breaker
    /// whenever triplets are ordered by a score.
    #[inline]
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.lncrna, &self.mirna, &self.mrna)
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.lncrna, self.mirna, self.mrna)
    }
}

/// A correlation coefficient paired with its two-tailed p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationEstimate {
    pub r: f64,
    pub p_value: f64,
}

/// The declared, ordered numeric feature schema consumed by the scorer.
///
/// This list is the contract between feature extraction and any classifier:
/// identifiers and the optional sequence-derived slots are excluded, and the
/// order here is the order of the slice passed to
/// [`crate::score::ProbabilityModel::predict_probability`].
pub const NUMERIC_FEATURE_SCHEMA: [&str; 9] = [
    "pearson_lnc_mrna",
    "pval_lnc_mrna",
    "pearson_lnc_mirna",
    "pval_lnc_mirna",
    "pearson_mrna_mirna",
    "pval_mrna_mirna",
    "partial_corr_lnc_mrna",
    "partial_corr_pval",
    "sponge_sensitivity",
];

/// Number of entries in [`NUMERIC_FEATURE_SCHEMA`].
pub const NUM_NUMERIC_FEATURES: usize = NUMERIC_FEATURE_SCHEMA.len();

/// Per-triplet feature record produced by the extraction stage.
#[derive(Debug, Clone)]
pub struct TripletFeatures {
    pub triplet: Triplet,
    /// Pearson correlation of lncRNA and mRNA expression.
    pub corr_lnc_mrna: CorrelationEstimate,
    /// Pearson correlation of lncRNA and miRNA expression.
    pub corr_lnc_mirna: CorrelationEstimate,
    /// Pearson correlation of mRNA and miRNA expression.
    pub corr_mrna_mirna: CorrelationEstimate,
    /// Partial correlation of lncRNA and mRNA controlling for the miRNA.
    pub partial_lnc_mrna: CorrelationEstimate,
    /// Sponge sensitivity: raw r(lnc, mRNA) minus partial r(lnc, mRNA | miRNA).
    pub sponge_sensitivity: f64,
    /// Reserved sequence-derived slots, populated only by an external
    /// annotator. Not part of the numeric scoring schema.
    pub mre_count: Option<f64>,
    pub seed_match_energy: Option<f64>,
    pub cytoplasmic_localization: Option<f64>,
}

impl TripletFeatures {
    /// The numeric feature values in [`NUMERIC_FEATURE_SCHEMA`] order.
    pub fn numeric_features(&self) -> [f64; NUM_NUMERIC_FEATURES] {
        [
            self.corr_lnc_mrna.r,
            self.corr_lnc_mrna.p_value,
            self.corr_lnc_mirna.r,
            self.corr_lnc_mirna.p_value,
            self.corr_mrna_mirna.r,
            self.corr_mrna_mirna.p_value,
            self.partial_lnc_mrna.r,
            self.partial_lnc_mrna.p_value,
            self.sponge_sensitivity,
        ]
    }
}

/// A feature record together with its classifier probability in [0, 1].
#[derive(Debug, Clone)]
pub struct ScoredTriplet {
    pub features: TripletFeatures,
    pub score: f64,
}

impl ScoredTriplet {
    /// Descending by score, ties broken by lexicographic triplet identity so
    /// that ranked output is reproducible.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.features.triplet.key().cmp(&other.features.triplet.key()))
    }
}

/// A scored triplet that passed the mediation significance gate.
///
/// `sensitivity` is the feature-stage sponge sensitivity threaded through
/// unchanged; the validation stage never recomputes or resamples it.
#[derive(Debug, Clone)]
pub struct ValidatedTriplet {
    pub triplet: Triplet,
    pub score: f64,
    pub mediation_p_value: f64,
    pub sensitivity: f64,
}

/// Row shape of the scored-candidate output table.
#[derive(Debug, Serialize)]
pub struct ScoredRecord<'a> {
    #[serde(rename = "lncRNA")]
    pub lncrna: &'a str,
    #[serde(rename = "miRNA")]
    pub mirna: &'a str,
    #[serde(rename = "mRNA")]
    pub mrna: &'a str,
    pub score: f64,
}

/// Row shape of the validated-triplet output table.
#[derive(Debug, Serialize)]
pub struct ValidatedRecord<'a> {
    #[serde(rename = "lncRNA")]
    pub lncrna: &'a str,
    #[serde(rename = "miRNA")]
    pub mirna: &'a str,
    #[serde(rename = "mRNA")]
    pub mrna: &'a str,
    pub score: f64,
    pub mediation_pvalue: f64,
    pub sensitivity: f64,
}
