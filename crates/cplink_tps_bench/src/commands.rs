use std::fs;
use std::path::Path;
use std::sync::Arc;

use cplink_artifacts::artifact::ProofArtifact;
use cplink_artifacts::inputs::VerifierInputs;
use tracing::info;

use crate::args::{Cli, Command, FlattenArgs};
use crate::bench::{BenchReport, VerifierBench};
use crate::config::BenchConfig;
use crate::contract::load_bytecode;
use crate::errors::{BenchError, BenchResult};
use crate::rpc::{AlloyVerifierRpc, SharedVerifierRpc};

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

pub async fn run_cli(cli: Cli) -> BenchResult<()> {
    match cli.command {
        Command::Flatten(args) => flatten(&args),
        Command::Run(args) => {
            run_bench(args.into_config()?).await?;
            Ok(())
        }
    }
}

pub fn flatten(args: &FlattenArgs) -> BenchResult<()> {
    let flattened = ProofArtifact::load(&args.artifact)?.flatten();
    let json = serde_json::to_string_pretty(&flattened)?;
    match &args.output {
        Some(path) => write_output(path, &json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Loads the artifact and bytecode named by `config`, then sweeps its batch sizes against the
/// configured node.
pub async fn run_bench(config: BenchConfig) -> BenchResult<Vec<BenchReport>> {
    info!("Starting verifier benchmark with config: {config:?}");
    let artifact = ProofArtifact::load(&config.artifact_path)?;
    let inputs = VerifierInputs::new(&artifact, config.variant);
    let bytecode = load_bytecode(&config.bytecode_path)?;
    let rpc: SharedVerifierRpc = Arc::new(AlloyVerifierRpc::new(
        config.node_url.clone(),
        config.deployer_private_key.signer()?,
    ));

    let output_path = config.output_path.clone();
    let reports = VerifierBench::new(rpc, config, inputs, bytecode).sweep().await?;
    if let Some(path) = output_path {
        write_output(&path, &serde_json::to_string_pretty(&reports)?)?;
        info!("Wrote {} reports to {}.", reports.len(), path.display());
    }
    Ok(reports)
}

fn write_output(path: &Path, content: &str) -> BenchResult<()> {
    fs::write(path, content)
        .map_err(|source| BenchError::Output { path: path.to_path_buf(), source })
}
