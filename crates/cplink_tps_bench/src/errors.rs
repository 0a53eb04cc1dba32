use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::hex::FromHexError;
use cplink_artifacts::errors::ParseError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::rpc::VerifierRpcError;

pub type BenchResult<T> = Result<T, BenchError>;

pub type SigningResult<T> = Result<T, SigningError>;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Failed to generate ephemeral key {index}: {reason}")]
    KeyGeneration { index: usize, reason: String },
    #[error("Failed to sign transaction {index}: {reason}")]
    Sign { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Submission {index} was rejected: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: VerifierRpcError,
    },
    #[error("Submission {index} was not acknowledged within {timeout:?}.")]
    TimedOut { index: usize, timeout: Duration },
}

impl BroadcastError {
    pub fn index(&self) -> usize {
        match self {
            Self::Rejected { index, .. } | Self::TimedOut { index, .. } => *index,
        }
    }
}

#[derive(Debug, Error)]
#[error("Failed to estimate gas of the verify call: {0}")]
pub struct GasEstimationError(#[from] pub VerifierRpcError);

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Failed to read contract bytecode {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Contract artifact {} has no readable `bytecode` field: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid contract bytecode in {}: {source}", .path.display())]
    Hex {
        path: PathBuf,
        #[source]
        source: FromHexError,
    },
    #[error("Contract bytecode in {} is empty.", .0.display())]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Invalid deployer private key: {0}")]
    InvalidPrivateKey(String),
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Rpc(#[from] VerifierRpcError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
