//! # Triplet Candidate Enumeration
//!
//! Produces the deterministic sequence of (lncRNA, miRNA, mRNA) candidates
//! the rest of the pipeline evaluates. For each miRNA that is a row of the
//! expression matrix and has curated targets of both kinds, the generator
//! intersects each target set with the matrix rows and emits the full
//! lncRNA × mRNA cross product.
//!
//! The enumeration is O(Σ |lncTargets|·|mRNATargets|) over shared regulators.
//! Combinatorial growth is a property of the problem, not a defect: a miRNA
//! with thousands of curated targets of each kind contributes millions of
//! candidates, and no capping or sampling is applied here. Any pruning is a
//! product decision that belongs upstream (curation) or downstream
//! (score thresholds).

use crate::data::ExpressionMatrix;
use crate::interaction::TargetIndex;
use crate::types::Triplet;
use itertools::iproduct;

/// Enumerates candidate triplets in a fixed order: sorted miRNA id, then
/// sorted lncRNA id, then sorted mRNA id. The output is reproducible
/// regardless of the ordering of the curated input tables.
pub fn generate(
    matrix: &ExpressionMatrix,
    mrna_index: &TargetIndex,
    lncrna_index: &TargetIndex,
) -> Vec<Triplet> {
    let mut candidates = Vec::new();

    // TargetIndex iteration is sorted, so the outer order is fixed here.
    for mirna in mrna_index.regulators() {
        if !matrix.contains(mirna) {
            continue;
        }
        let lnc_targets: Vec<&String> = lncrna_index
            .targets(mirna)
            .iter()
            .filter(|id| matrix.contains(id))
            .collect();
        if lnc_targets.is_empty() {
            continue;
        }
        let mrna_targets: Vec<&String> = mrna_index
            .targets(mirna)
            .iter()
            .filter(|id| matrix.contains(id))
            .collect();
        if mrna_targets.is_empty() {
            continue;
        }

        candidates.extend(
            iproduct!(&lnc_targets, &mrna_targets)
                .map(|(lnc, mrna)| Triplet::new(lnc.as_str(), mirna.as_str(), mrna.as_str())),
        );
    }

    log::info!("enumerated {} candidate triplets", candidates.len());
    candidates
}
