//! # Batch Orchestration
//!
//! Runs the full discovery pipeline as a single-threaded store-and-forward
//! batch: every stage fully materializes its output before the next stage
//! starts. Only the per-candidate loops inside feature extraction and
//! mediation fan out across threads, and both re-emit order-preserving
//! results, so a run is deterministic for fixed inputs.
//!
//! Expression matrix + interaction tables → interaction index → candidate
//! generation → feature extraction → scoring → mediation validation →
//! network assembly → graph and tabular artifacts.
//!
//! Empty intermediate results are legitimate: every writer emits a
//! header-only artifact and no stage raises an error for them. Missing or
//! malformed required inputs abort the run with a diagnostic; there are no
//! retries because the computation is deterministic given fixed inputs.

use crate::candidates;
use crate::data::{self, FormatError};
use crate::features;
use crate::interaction::{InteractionIndex, TargetIndex};
use crate::mediation;
use crate::network::{self, CernaNetwork};
use crate::score::{self, LogisticModel, ModelError, ProbabilityModel};
use crate::types::{ScoredRecord, ScoredTriplet, ValidatedRecord, ValidatedTriplet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write output table: {0}")]
    Output(#[from] csv::Error),
}

/// File-based inputs and outputs of one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Normalized expression matrix CSV.
    pub expression: PathBuf,
    /// Curated miRNA→mRNA interaction table (TSV).
    pub mirna_mrna: PathBuf,
    /// Curated miRNA→lncRNA interaction table (TSV).
    pub mirna_lncrna: PathBuf,
    /// Trained classifier artifact (TOML). A missing file is the cold-start
    /// case and yields empty scored output rather than an error.
    pub model: PathBuf,
    /// Directory receiving every output artifact.
    pub out_dir: PathBuf,
    /// Significance level of the mediation gate.
    pub alpha: f64,
}

impl PipelineConfig {
    fn out(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }
}

/// Stage counts of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    pub candidates: usize,
    pub features: usize,
    pub scored: usize,
    pub validated: usize,
    pub nodes: usize,
    pub edges: usize,
}

/// Executes the full pipeline and writes all artifacts under
/// `config.out_dir`.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary, PipelineError> {
    std::fs::create_dir_all(&config.out_dir)?;

    let matrix = data::load_expression_matrix(&config.expression)?;
    let mrna_index = TargetIndex::from_table(&config.mirna_mrna)?;
    let lncrna_index = TargetIndex::from_table(&config.mirna_lncrna)?;
    let index = InteractionIndex::new(mrna_index, lncrna_index);

    let triplets = candidates::generate(&matrix, &index.mrna, &index.lncrna);
    if triplets.is_empty() {
        log::info!("no candidate triplets; downstream artifacts will be empty");
    }

    let feature_set = features::extract_all(&triplets, &matrix);

    // A missing artifact is the pre-training cold start; anything else wrong
    // with the model file is a real failure.
    let model = match LogisticModel::load(&config.model) {
        Ok(model) => Some(model),
        Err(ModelError::Unavailable { path }) => {
            log::warn!("classifier artifact '{path}' not found; cold start with empty scores");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let n_features = feature_set.len();
    let scored = score::score_candidates(
        feature_set,
        model.as_ref().map(|m| m as &dyn ProbabilityModel),
    );
    write_scored_table(&config.out("predicted_triplets.csv"), &scored)?;

    let validated = mediation::validate(&scored, &matrix, config.alpha);
    write_validated_table(&config.out("validated_triplets.csv"), &validated)?;

    let network = network::assemble(&validated);
    write_network_artifacts(config, &network)?;

    Ok(PipelineSummary {
        candidates: triplets.len(),
        features: n_features,
        scored: scored.len(),
        validated: validated.len(),
        nodes: network.n_nodes(),
        edges: network.n_edges(),
    })
}

fn write_scored_table(path: &Path, scored: &[ScoredTriplet]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    for candidate in scored {
        let triplet = &candidate.features.triplet;
        writer.serialize(ScoredRecord {
            lncrna: &triplet.lncrna,
            mirna: &triplet.mirna,
            mrna: &triplet.mrna,
            score: candidate.score,
        })?;
    }
    // serde-driven writers only emit headers with at least one row.
    if scored.is_empty() {
        writer.write_record(["lncRNA", "miRNA", "mRNA", "score"])?;
    }
    writer.flush()?;
    log::info!("wrote {} scored triplets to {}", scored.len(), path.display());
    Ok(())
}

fn write_validated_table(
    path: &Path,
    validated: &[ValidatedTriplet],
) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    for triplet in validated {
        writer.serialize(ValidatedRecord {
            lncrna: &triplet.triplet.lncrna,
            mirna: &triplet.triplet.mirna,
            mrna: &triplet.triplet.mrna,
            score: triplet.score,
            mediation_pvalue: triplet.mediation_p_value,
            sensitivity: triplet.sensitivity,
        })?;
    }
    if validated.is_empty() {
        writer.write_record([
            "lncRNA",
            "miRNA",
            "mRNA",
            "score",
            "mediation_pvalue",
            "sensitivity",
        ])?;
    }
    writer.flush()?;
    log::info!(
        "wrote {} validated triplets to {}",
        validated.len(),
        path.display()
    );
    Ok(())
}

fn write_network_artifacts(
    config: &PipelineConfig,
    network: &CernaNetwork,
) -> Result<(), PipelineError> {
    let graphml = config.out("cerna_network.graphml");
    network.write_graphml(BufWriter::new(File::create(&graphml)?))?;
    network.write_sif(BufWriter::new(File::create(
        config.out("cerna_network.sif"),
    )?))?;
    network.write_node_table(BufWriter::new(File::create(
        config.out("cerna_network_nodes.csv"),
    )?))?;
    network.write_edge_table(BufWriter::new(File::create(
        config.out("cerna_network_edges.csv"),
    )?))?;
    network.write_centrality_table(BufWriter::new(File::create(
        config.out("centrality_scores.csv"),
    )?))?;
    log::info!("wrote network artifacts to {}", config.out_dir.display());
    Ok(())
}
