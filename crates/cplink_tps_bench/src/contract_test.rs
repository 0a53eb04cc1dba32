use std::fs;

use alloy::primitives::{keccak256, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use assert_matches::assert_matches;
use cplink_artifacts::inputs::{ConstructorArgs, VerifyArgs};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use crate::contract::{
    deploy_code,
    init_calldata,
    load_bytecode,
    verify_calldata,
    IGrothLinkVerifier,
    ILinkVerifier,
};
use crate::errors::ContractError;

fn words(values: impl IntoIterator<Item = u64>) -> Vec<U256> {
    values.into_iter().map(U256::from).collect()
}

fn selector(signature: &str) -> [u8; 4] {
    keccak256(signature)[..4].try_into().unwrap()
}

#[test]
fn selectors_match_solidity_signatures() {
    assert_eq!(
        IGrothLinkVerifier::verifyCall::SELECTOR,
        selector("verify(uint256[],uint256[],uint256[])")
    );
    assert_eq!(ILinkVerifier::verifyCall::SELECTOR, selector("verify(uint256[],uint256[])"));
    assert_eq!(init_calldata().as_ref(), selector("init()").as_slice());
}

#[test]
fn groth_link_verify_calldata_decodes_to_its_arguments() {
    let args = VerifyArgs::GrothLink {
        instance: words([1, 2, 3, 4]),
        proof_groth: words(10..20),
        proof_link: words([99, 98]),
    };

    let calldata = verify_calldata(args);

    let decoded = IGrothLinkVerifier::verifyCall::abi_decode(&calldata).unwrap();
    assert_eq!(decoded.instance, words([1, 2, 3, 4]));
    assert_eq!(decoded.proof_groth, words(10..20));
    assert_eq!(decoded.proof_link, words([99, 98]));
}

#[test]
fn link_verify_calldata_decodes_to_its_arguments() {
    let calldata = verify_calldata(VerifyArgs::Link { instance: words([5, 6]), proof: words([7]) });

    let decoded = ILinkVerifier::verifyCall::abi_decode(&calldata).unwrap();
    assert_eq!(decoded.instance, words([5, 6]));
    assert_eq!(decoded.proof, words([7]));
}

#[test]
fn constructor_arguments_follow_the_bytecode() {
    let bytecode = Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]);
    let args = ConstructorArgs::GrothLink {
        vk_groth: words(0..12),
        vk_link: words(100..108),
        batch_size: U256::from(4),
    };

    let code = deploy_code(&bytecode, args);

    let (prefix, encoded_args) = code.split_at(bytecode.len());
    assert_eq!(prefix, bytecode.as_ref());
    let (vk_groth, vk_link, batch_size) =
        <(Vec<U256>, Vec<U256>, U256)>::abi_decode_params(encoded_args).unwrap();
    assert_eq!(vk_groth, words(0..12));
    assert_eq!(vk_link, words(100..108));
    assert_eq!(batch_size, U256::from(4));
}

#[test]
fn link_constructor_takes_a_single_key() {
    let bytecode = Bytes::from_static(&[0x00]);

    let code = deploy_code(&bytecode, ConstructorArgs::Link { vk: words([1, 2, 3]) });

    let (vk,) = <(Vec<U256>,)>::abi_decode_params(&code[1..]).unwrap();
    assert_eq!(vk, words([1, 2, 3]));
}

#[rstest]
#[case::prefixed("0x6080604052\n")]
#[case::bare("6080604052")]
#[case::hardhat_artifact(
    &json!({ "contractName": "Verifier", "abi": [], "bytecode": "0x6080604052" }).to_string()
)]
#[case::foundry_artifact(
    &json!({ "abi": [], "bytecode": { "object": "0x6080604052", "linkReferences": {} } })
        .to_string()
)]
fn bytecode_formats(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("verifier");
    fs::write(&path, content).unwrap();

    assert_eq!(load_bytecode(&path).unwrap(), Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]));
}

#[test]
fn invalid_bytecode_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("verifier");

    assert_matches!(load_bytecode(&path), Err(ContractError::Io { .. }));

    fs::write(&path, "0xzz").unwrap();
    assert_matches!(load_bytecode(&path), Err(ContractError::Hex { .. }));

    fs::write(&path, "0x").unwrap();
    assert_matches!(load_bytecode(&path), Err(ContractError::Empty(_)));

    fs::write(&path, json!({ "abi": [] }).to_string()).unwrap();
    assert_matches!(load_bytecode(&path), Err(ContractError::Artifact { .. }));
}
