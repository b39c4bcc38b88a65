//! End-to-end pipeline runs against temp-dir fixtures: a minimal one-triplet
//! discovery run, the cold-start run without a classifier, and the empty
//! interaction-table run that must flow through every stage without error.

use cerna::data::ExpressionMatrix;
use cerna::features;
use cerna::pipeline::{self, PipelineConfig};
use cerna::types::Triplet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Expression rows with a strong, hand-checked mediation chain:
/// M1 = L1 + 1.5e (alternating e), G1 = 2·M1 + 0.001f. The Sobel z for
/// (L1, M1, G1) is 5.0, far below alpha = 0.05. All values non-negative.
fn fixture_rows() -> Vec<(String, Vec<f64>)> {
    let l1: Vec<f64> = (1..=10).map(|v| v as f64).collect();
    let e = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
    let f = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
    let m1: Vec<f64> = l1.iter().zip(e).map(|(x, e)| x + 1.5 * e).collect();
    let g1: Vec<f64> = m1.iter().zip(f).map(|(m, f)| 2.0 * m + 0.001 * f).collect();
    vec![
        ("L1".to_string(), l1),
        ("M1".to_string(), m1),
        ("G1".to_string(), g1),
    ]
}

fn write_expression(dir: &Path, rows: &[(String, Vec<f64>)]) -> std::path::PathBuf {
    let n = rows[0].1.len();
    let mut content = String::from("gene");
    for i in 1..=n {
        content.push_str(&format!(",s{i}"));
    }
    content.push('\n');
    for (id, values) in rows {
        content.push_str(id);
        for v in values {
            content.push_str(&format!(",{v}"));
        }
        content.push('\n');
    }
    let path = dir.join("norm_counts.csv");
    fs::write(&path, content).unwrap();
    path
}

fn write_table(dir: &Path, name: &str, pairs: &[(&str, &str)], target_col: &str) -> std::path::PathBuf {
    let mut content = format!("miRNA\t{target_col}\n");
    for (regulator, target) in pairs {
        content.push_str(&format!("{regulator}\t{target}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_model(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("model.toml");
    fs::write(
        &path,
        "intercept = 0.0\nweights = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]\n",
    )
    .unwrap();
    path
}

fn config_for(dir: &TempDir, pairs_mrna: &[(&str, &str)], pairs_lnc: &[(&str, &str)]) -> PipelineConfig {
    let root = dir.path();
    PipelineConfig {
        expression: write_expression(root, &fixture_rows()),
        mirna_mrna: write_table(root, "miRTarBase.txt", pairs_mrna, "mRNA"),
        mirna_lncrna: write_table(root, "LncBase.txt", pairs_lnc, "lncRNA"),
        model: write_model(root),
        out_dir: root.join("results"),
        alpha: 0.05,
    }
}

#[test]
fn single_triplet_run_produces_one_validated_edge() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &[("M1", "G1")], &[("M1", "L1")]);

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.features, 1);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.validated, 1);
    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.edges, 1);

    let scored = fs::read_to_string(config.out_dir.join("predicted_triplets.csv")).unwrap();
    let mut lines = scored.lines();
    assert_eq!(lines.next().unwrap(), "lncRNA,miRNA,mRNA,score");
    let row = lines.next().unwrap();
    assert!(row.starts_with("L1,M1,G1,"));
    let score: f64 = row.rsplit(',').next().unwrap().parse().unwrap();
    assert!((0.0..=1.0).contains(&score));

    let validated = fs::read_to_string(config.out_dir.join("validated_triplets.csv")).unwrap();
    let row = validated.lines().nth(1).unwrap();
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(&fields[..3], &["L1", "M1", "G1"]);
    let p: f64 = fields[4].parse().unwrap();
    assert!(p < 0.05);

    // The sensitivity column is the feature-stage sponge score, unchanged.
    let rows = fixture_rows();
    let samples = (1..=10).map(|i| format!("s{i}")).collect();
    let matrix = ExpressionMatrix::from_rows(samples, rows).unwrap();
    let expected = features::extract(&Triplet::new("L1", "M1", "G1"), &matrix)
        .unwrap()
        .sponge_sensitivity;
    let sensitivity: f64 = fields[5].parse().unwrap();
    assert!((sensitivity - expected).abs() < 1e-9);

    let graphml = fs::read_to_string(config.out_dir.join("cerna_network.graphml")).unwrap();
    assert!(graphml.contains(r#"<node id="L1">"#));
    assert!(graphml.contains(r#"<node id="G1">"#));
    assert!(graphml.contains(r#"<edge source="L1" target="G1">"#));
    assert!(graphml.contains(r#"<data key="d2">M1</data>"#));

    let sif = fs::read_to_string(config.out_dir.join("cerna_network.sif")).unwrap();
    assert_eq!(sif, "L1 interacts G1\n");

    // Two nodes, one edge: both centralities are degree 1 / (2 - 1) = 1.
    let centrality = fs::read_to_string(config.out_dir.join("centrality_scores.csv")).unwrap();
    let mut lines = centrality.lines();
    assert_eq!(lines.next().unwrap(), "gene,degree_centrality");
    for line in lines {
        let value: f64 = line.rsplit(',').next().unwrap().parse().unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }
}

#[test]
fn empty_interaction_tables_flow_through_without_error() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &[], &[]);

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.candidates, 0);
    assert_eq!(summary.scored, 0);
    assert_eq!(summary.validated, 0);
    assert_eq!(summary.nodes, 0);
    assert_eq!(summary.edges, 0);

    // Every artifact exists; the tables are header-only.
    let scored = fs::read_to_string(config.out_dir.join("predicted_triplets.csv")).unwrap();
    assert_eq!(scored.trim(), "lncRNA,miRNA,mRNA,score");
    let validated = fs::read_to_string(config.out_dir.join("validated_triplets.csv")).unwrap();
    assert_eq!(
        validated.trim(),
        "lncRNA,miRNA,mRNA,score,mediation_pvalue,sensitivity"
    );
    assert!(config.out_dir.join("cerna_network.graphml").exists());
    assert!(config.out_dir.join("cerna_network_nodes.csv").exists());
    assert!(config.out_dir.join("cerna_network_edges.csv").exists());
}

#[test]
fn missing_model_is_a_cold_start_not_an_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir, &[("M1", "G1")], &[("M1", "L1")]);
    config.model = dir.path().join("no_such_model.toml");

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.scored, 0);
    assert_eq!(summary.validated, 0);
    assert_eq!(summary.edges, 0);
}

#[test]
fn malformed_model_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir, &[("M1", "G1")], &[("M1", "L1")]);
    config.model = dir.path().join("bad_model.toml");
    fs::write(&config.model, "intercept = 0.0\nweights = [1.0]\n").unwrap();

    assert!(pipeline::run(&config).is_err());
}

#[test]
fn missing_expression_matrix_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir, &[("M1", "G1")], &[("M1", "L1")]);
    config.expression = dir.path().join("no_such_matrix.csv");

    assert!(pipeline::run(&config).is_err());
}
