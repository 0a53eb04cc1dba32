//! Encoding of Groth16 / CP-link proof artifacts into the argument layout of on-chain verifiers.
//!
//! The pipeline is: [`artifact::RawProofArtifact`] (JSON on disk) →
//! [`artifact::ProofArtifact`] (typed curve points) → [`inputs::VerifierInputs`] (argument
//! templates) → constructor / `verify` arguments for a given [`batch::BatchSize`].

pub mod artifact;
pub mod batch;
pub mod errors;
pub mod inputs;
pub mod point_parser;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;
