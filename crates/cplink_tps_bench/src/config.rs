use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use alloy::signers::local::PrivateKeySigner;
use cplink_artifacts::batch::BatchSize;
use cplink_artifacts::inputs::VerifierVariant;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;
use url::Url;
use validator::{Validate, ValidationError};

use crate::errors::ConfigError;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const REDACTED: &str = "<<redacted>>";

/// First account of the Hardhat and Anvil development chains.
pub const DEV_CHAIN_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Gas ceiling of every verify transaction; large enough for any batch size in the sweep.
pub const DEFAULT_GAS_LIMIT: u64 = 100_000_000;

const MIN_GAS_LIMIT: u64 = 21_000;

/// A hex-encoded secp256k1 key. Never printed or serialized in the clear.
#[derive(Clone, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        self.0.parse().map_err(|e| ConfigError::InvalidPrivateKey(format!("{e}")))
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new(DEV_CHAIN_PRIVATE_KEY)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(REDACTED)
    }
}

fn validate_private_key(key: &PrivateKey) -> Result<(), ValidationError> {
    key.signer().map(|_| ()).map_err(|e| {
        ValidationError::new("invalid_private_key").with_message(Cow::Owned(e.to_string()))
    })
}

/// Concurrency limits of a single broadcast.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Maximum number of submissions awaiting acknowledgement at once.
    #[validate(range(min = 1))]
    pub max_in_flight: usize,
    #[validate(range(min = 1))]
    pub submission_timeout_millis: u64,
    /// Abort the whole batch on the first rejected or timed out submission.
    pub fail_fast: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { max_in_flight: 1024, submission_timeout_millis: 60_000, fail_fast: false }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default)]
pub struct BenchConfig {
    pub node_url: Url,
    pub artifact_path: PathBuf,
    pub bytecode_path: PathBuf,
    pub variant: VerifierVariant,
    /// Number of ephemeral clients, one transaction each.
    #[validate(range(min = 1))]
    pub n_clients: usize,
    #[validate(length(min = 1))]
    pub batch_sizes: Vec<BatchSize>,
    /// Queried from the node when unset.
    pub chain_id: Option<u64>,
    #[validate(range(min = MIN_GAS_LIMIT))]
    pub gas_limit: u64,
    pub gas_price: u128,
    /// Call `init()` on every freshly deployed verifier.
    pub call_init: bool,
    /// Derive client keys from this seed instead of the OS entropy source.
    pub identity_seed: Option<u64>,
    /// Count successful receipts after each broadcast.
    pub audit_receipts: bool,
    #[validate(custom(function = "validate_private_key"))]
    pub deployer_private_key: PrivateKey,
    /// Where to write the JSON reports, if anywhere.
    pub output_path: Option<PathBuf>,
    #[validate(nested)]
    pub broadcast: BroadcastConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            node_url: Url::parse("http://localhost:8545").expect("Default node URL is valid."),
            artifact_path: PathBuf::from("resources/proof_artifact.json"),
            bytecode_path: PathBuf::from("resources/verifier.bin"),
            variant: VerifierVariant::default(),
            n_clients: 100,
            batch_sizes: BatchSize::sweep().collect(),
            chain_id: None,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: 0,
            call_init: false,
            identity_seed: None,
            audit_receipts: false,
            deployer_private_key: PrivateKey::default(),
            output_path: None,
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Reads a JSON config file. Missing fields take their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading bench config from {}.", path.display());
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }
}
