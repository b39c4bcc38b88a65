// ========================================================================================
//
//                              The pipeline front-end: cerna
//
// ========================================================================================
//
// A thin command-line shell over the library pipeline. Argument parsing,
// logger initialization, and exit codes live here; everything analytic is in
// the library so that it stays testable without a process boundary.

use cerna::mediation::DEFAULT_ALPHA;
use cerna::pipeline::{self, PipelineConfig};
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(
    name = "cerna",
    version,
    about = "Discovery and statistical validation of ceRNA regulatory triplets."
)]
struct Args {
    /// Normalized expression matrix CSV (header: sample ids; rows: gene id, values...)
    #[clap(long, value_name = "FILE")]
    expression: PathBuf,

    /// Curated miRNA-mRNA interaction table (TSV with a miRNA column)
    #[clap(long, value_name = "FILE")]
    mirna_mrna: PathBuf,

    /// Curated miRNA-lncRNA interaction table (TSV with a miRNA column)
    #[clap(long, value_name = "FILE")]
    mirna_lncrna: PathBuf,

    /// Trained classifier artifact (TOML). If absent the run is a cold start
    /// and produces empty scored output.
    #[clap(long, value_name = "FILE", default_value = "results/model.toml")]
    model: PathBuf,

    /// Output directory for all artifacts
    #[clap(long, value_name = "DIR", default_value = "results")]
    out_dir: PathBuf,

    /// Significance level for the mediation gate
    #[clap(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = PipelineConfig {
        expression: args.expression,
        mirna_mrna: args.mirna_mrna,
        mirna_lncrna: args.mirna_lncrna,
        model: args.model,
        out_dir: args.out_dir,
        alpha: args.alpha,
    };

    match pipeline::run(&config) {
        Ok(summary) => {
            log::info!(
                "run complete: {} candidates, {} scored, {} validated, network {} nodes / {} edges",
                summary.candidates,
                summary.scored,
                summary.validated,
                summary.nodes,
                summary.edges
            );
        }
        Err(err) => {
            log::error!("pipeline failed: {err}");
            process::exit(1);
        }
    }
}
