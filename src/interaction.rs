//! # Curated Interaction Index
//!
//! Builds immutable regulator→target mappings from curated two-column
//! interaction tables (miRNA→mRNA and miRNA→lncRNA). Tables are tab-separated
//! with a header; a `miRNA` column is required and the first remaining column
//! is taken as the target. Duplicate pairs collapse to one entry.
//!
//! Storage is `BTreeMap`/`BTreeSet` so every iteration over regulators and
//! targets is sorted, which is what makes candidate enumeration reproducible
//! regardless of the ordering of the curated source files.

use crate::data::FormatError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The name the regulator column must carry in every interaction table.
pub const REGULATOR_COLUMN: &str = "miRNA";

static EMPTY_TARGETS: BTreeSet<String> = BTreeSet::new();

/// Which target mapping of the [`InteractionIndex`] a lookup addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    MessengerRna,
    LongNoncodingRna,
}

/// One immutable regulator→targets mapping built from a curated table.
#[derive(Debug, Default)]
pub struct TargetIndex {
    targets: BTreeMap<String, BTreeSet<String>>,
}

impl TargetIndex {
    /// Parses a two-column (regulator, target) table, grouping targets by
    /// regulator and removing duplicate pairs.
    pub fn from_table(path: &Path) -> Result<Self, FormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(FormatError::TooFewColumns {
                path: path.display().to_string(),
            });
        }
        let regulator_col = headers
            .iter()
            .position(|h| h.trim() == REGULATOR_COLUMN)
            .ok_or_else(|| FormatError::MissingColumn {
                path: path.display().to_string(),
                column: REGULATOR_COLUMN.to_string(),
            })?;
        // The target column is the first column that is not the regulator.
        let target_col = (0..headers.len())
            .find(|&i| i != regulator_col)
            .expect("header has at least two columns");

        let mut targets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut pairs = 0usize;
        for record in reader.records() {
            let record = record?;
            let regulator = record.get(regulator_col).unwrap_or("").trim();
            let target = record.get(target_col).unwrap_or("").trim();
            if regulator.is_empty() || target.is_empty() {
                continue;
            }
            targets
                .entry(regulator.to_string())
                .or_default()
                .insert(target.to_string());
            pairs += 1;
        }

        log::info!(
            "indexed {} interaction pairs for {} regulators from {}",
            pairs,
            targets.len(),
            path.display()
        );
        Ok(Self { targets })
    }

    /// Builds an index directly from (regulator, target) pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut targets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (regulator, target) in pairs {
            targets
                .entry(regulator.into())
                .or_default()
                .insert(target.into());
        }
        Self { targets }
    }

    /// The target set for `regulator`, or an empty set when the regulator is
    /// absent. Never an error.
    pub fn targets(&self, regulator: &str) -> &BTreeSet<String> {
        self.targets.get(regulator).unwrap_or(&EMPTY_TARGETS)
    }

    /// Regulators in sorted order.
    pub fn regulators(&self) -> impl Iterator<Item = &String> {
        self.targets.keys()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// The two curated mappings the pipeline runs on, built once per run.
#[derive(Debug)]
pub struct InteractionIndex {
    pub mrna: TargetIndex,
    pub lncrna: TargetIndex,
}

impl InteractionIndex {
    pub fn new(mrna: TargetIndex, lncrna: TargetIndex) -> Self {
        Self { mrna, lncrna }
    }

    pub fn lookup_targets(&self, regulator: &str, kind: TargetKind) -> &BTreeSet<String> {
        match kind {
            TargetKind::MessengerRna => self.mrna.targets(regulator),
            TargetKind::LongNoncodingRna => self.lncrna.targets(regulator),
        }
    }
}
