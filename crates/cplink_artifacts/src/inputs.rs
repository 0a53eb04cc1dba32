//! Verifier constructor and call arguments derived from a parsed artifact.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::artifact::ProofArtifact;
use crate::batch::{ArgumentTemplate, BatchSize};
use crate::point_parser::CanonicalWords;

#[cfg(test)]
#[path = "inputs_test.rs"]
mod inputs_test;

/// The shape of the deployed verifier contract.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerifierVariant {
    /// `constructor(uint256[] vkGroth, uint256[] vkLink, uint256 batchSize)` and
    /// `verify(uint256[] instance, uint256[] proofGroth, uint256[] proofLink)`.
    #[default]
    GrothLink,
    /// `constructor(uint256[] vk)` and `verify(uint256[] instance, uint256[] proof)`.
    Link,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConstructorArgs {
    GrothLink { vk_groth: Vec<U256>, vk_link: Vec<U256>, batch_size: U256 },
    Link { vk: Vec<U256> },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerifyArgs {
    GrothLink { instance: Vec<U256>, proof_groth: Vec<U256>, proof_link: Vec<U256> },
    Link { instance: Vec<U256>, proof: Vec<U256> },
}

/// Argument templates of every verifier input. Derived once per artifact and expanded for each
/// batch size.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifierInputs {
    variant: VerifierVariant,
    vk_groth: ArgumentTemplate,
    vk_link: ArgumentTemplate,
    instance: ArgumentTemplate,
    proof_groth: ArgumentTemplate,
    proof_link: ArgumentTemplate,
}

impl VerifierInputs {
    pub fn new(artifact: &ProofArtifact, variant: VerifierVariant) -> Self {
        Self {
            variant,
            vk_groth: ArgumentTemplate::fixed(artifact.vk_groth.canonical_words()),
            // The link key is emitted as `a` followed by one copy of `C` per statement.
            vk_link: ArgumentTemplate::new(
                artifact.vk_link.a.canonical_words(),
                artifact.vk_link.c.canonical_words(),
            ),
            instance: ArgumentTemplate::per_statement(artifact.instance.canonical_words()),
            proof_groth: ArgumentTemplate::fixed(artifact.proof_groth.canonical_words()),
            proof_link: ArgumentTemplate::fixed(artifact.proof_link.canonical_words()),
        }
    }

    pub fn variant(&self) -> VerifierVariant {
        self.variant
    }

    pub fn vk_link(&self) -> &ArgumentTemplate {
        &self.vk_link
    }

    pub fn instance(&self) -> &ArgumentTemplate {
        &self.instance
    }

    pub fn constructor_args(&self, batch_size: BatchSize) -> ConstructorArgs {
        match self.variant {
            VerifierVariant::GrothLink => ConstructorArgs::GrothLink {
                vk_groth: self.vk_groth.expand(batch_size),
                vk_link: self.vk_link.expand(batch_size),
                batch_size: batch_size.into(),
            },
            VerifierVariant::Link => ConstructorArgs::Link { vk: self.vk_link.expand(batch_size) },
        }
    }

    pub fn verify_args(&self, batch_size: BatchSize) -> VerifyArgs {
        let instance = self.instance.expand(batch_size);
        match self.variant {
            VerifierVariant::GrothLink => VerifyArgs::GrothLink {
                instance,
                proof_groth: self.proof_groth.expand(batch_size),
                proof_link: self.proof_link.expand(batch_size),
            },
            VerifierVariant::Link => {
                VerifyArgs::Link { instance, proof: self.proof_link.expand(batch_size) }
            }
        }
    }
}
