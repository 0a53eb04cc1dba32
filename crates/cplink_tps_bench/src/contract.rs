//! ABI of the verifier contracts and loading of their creation bytecode.

use std::fs;
use std::path::Path;

use alloy::primitives::Bytes;
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};
use cplink_artifacts::inputs::{ConstructorArgs, VerifyArgs};
use serde::Deserialize;
use tracing::debug;

use crate::errors::ContractError;

#[cfg(test)]
#[path = "contract_test.rs"]
mod contract_test;

sol! {
    interface IGrothLinkVerifier {
        function verify(
            uint256[] calldata instance,
            uint256[] calldata proof_groth,
            uint256[] calldata proof_link
        ) external returns (bool);
    }

    interface ILinkVerifier {
        function verify(uint256[] calldata instance, uint256[] calldata proof)
            external returns (bool);
    }

    interface IInitializable {
        function init() external;
    }
}

/// Creation bytecode followed by the ABI-encoded constructor arguments.
pub fn deploy_code(bytecode: &Bytes, args: ConstructorArgs) -> Bytes {
    let encoded_args = match args {
        ConstructorArgs::GrothLink { vk_groth, vk_link, batch_size } => {
            (vk_groth, vk_link, batch_size).abi_encode_params()
        }
        ConstructorArgs::Link { vk } => (vk,).abi_encode_params(),
    };
    [bytecode.as_ref(), encoded_args.as_slice()].concat().into()
}

pub fn verify_calldata(args: VerifyArgs) -> Bytes {
    let calldata = match args {
        VerifyArgs::GrothLink { instance, proof_groth, proof_link } => {
            IGrothLinkVerifier::verifyCall { instance, proof_groth, proof_link }.abi_encode()
        }
        VerifyArgs::Link { instance, proof } => {
            ILinkVerifier::verifyCall { instance, proof }.abi_encode()
        }
    };
    calldata.into()
}

pub fn init_calldata() -> Bytes {
    IInitializable::initCall {}.abi_encode().into()
}

// Compiler output: Hardhat stores the bytecode as a string, Foundry under `bytecode.object`.
#[derive(Deserialize)]
struct CompiledContract {
    bytecode: CompiledBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompiledBytecode {
    Hex(String),
    Object { object: String },
}

impl From<CompiledBytecode> for String {
    fn from(bytecode: CompiledBytecode) -> Self {
        match bytecode {
            CompiledBytecode::Hex(hex) | CompiledBytecode::Object { object: hex } => hex,
        }
    }
}

/// Reads creation bytecode given either as a hex file (with or without `0x`) or as a compiler
/// artifact JSON carrying a `bytecode` field.
pub fn load_bytecode(path: &Path) -> Result<Bytes, ContractError> {
    let content = fs::read_to_string(path)
        .map_err(|source| ContractError::Io { path: path.to_path_buf(), source })?;
    let content = content.trim();

    let hex = if content.starts_with('{') {
        serde_json::from_str::<CompiledContract>(content)
            .map_err(|source| ContractError::Artifact { path: path.to_path_buf(), source })?
            .bytecode
            .into()
    } else {
        content.to_string()
    };

    let bytecode: Bytes = hex
        .trim()
        .parse()
        .map_err(|source| ContractError::Hex { path: path.to_path_buf(), source })?;
    if bytecode.is_empty() {
        return Err(ContractError::Empty(path.to_path_buf()));
    }
    debug!("Loaded {} bytes of verifier bytecode from {}.", bytecode.len(), path.display());
    Ok(bytecode)
}
