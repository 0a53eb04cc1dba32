use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cplink_artifacts::batch::BatchSize;
use cplink_artifacts::inputs::VerifierVariant;
use url::Url;
use validator::Validate;

use crate::config::BenchConfig;
use crate::errors::ConfigError;

#[cfg(test)]
#[path = "args_test.rs"]
mod args_test;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
/// Encodes CP-link proof artifacts and benchmarks their on-chain verifiers.
pub struct Cli {
    /// Tracing filter directives, e.g. `debug` or `cplink_tps_bench=trace`. Overrides RUST_LOG.
    #[arg(long, env = "CPLINK_LOG", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints the flattened verifier arguments of an artifact as JSON decimal strings.
    Flatten(FlattenArgs),
    /// Deploys the verifier and measures TPS and gas for each batch size.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct FlattenArgs {
    /// The proof artifact to flatten.
    #[arg(long, env = "CPLINK_ARTIFACT")]
    pub artifact: PathBuf,

    /// Write the JSON here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Flags override the config file, which overrides the defaults.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// JSON bench config.
    #[arg(long, env = "CPLINK_CONFIG")]
    pub config_file: Option<PathBuf>,

    #[arg(long, env = "CPLINK_NODE_URL")]
    pub node_url: Option<Url>,

    #[arg(long, env = "CPLINK_ARTIFACT")]
    pub artifact: Option<PathBuf>,

    /// Creation bytecode: a hex file or a compiler artifact JSON.
    #[arg(long, env = "CPLINK_BYTECODE")]
    pub bytecode: Option<PathBuf>,

    #[arg(long)]
    pub variant: Option<VerifierVariant>,

    #[arg(long)]
    pub n_clients: Option<usize>,

    /// Batch sizes to benchmark, comma separated. Each must be a power of two.
    #[arg(long = "batch-size", value_delimiter = ',')]
    pub batch_sizes: Vec<BatchSize>,

    #[arg(long)]
    pub identity_seed: Option<u64>,

    #[arg(long)]
    pub call_init: bool,

    #[arg(long)]
    pub audit_receipts: bool,

    #[arg(long)]
    pub fail_fast: bool,

    /// Write the reports here as a JSON array.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    pub fn into_config(self) -> Result<BenchConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };

        if let Some(node_url) = self.node_url {
            config.node_url = node_url;
        }
        if let Some(artifact) = self.artifact {
            config.artifact_path = artifact;
        }
        if let Some(bytecode) = self.bytecode {
            config.bytecode_path = bytecode;
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(n_clients) = self.n_clients {
            config.n_clients = n_clients;
        }
        if !self.batch_sizes.is_empty() {
            config.batch_sizes = self.batch_sizes;
        }
        if self.identity_seed.is_some() {
            config.identity_seed = self.identity_seed;
        }
        config.call_init |= self.call_init;
        config.audit_receipts |= self.audit_receipts;
        config.broadcast.fail_fast |= self.fail_fast;
        if self.output.is_some() {
            config.output_path = self.output;
        }

        config.validate()?;
        Ok(config)
    }
}
