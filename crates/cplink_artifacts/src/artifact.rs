//! The proof artifact document and its typed, canonical form.
//!
//! The artifact is a JSON object whose five values are themselves JSON documents, serialized to
//! strings. Each inner document maps field names to textual point renderings (see
//! [`crate::point_parser`]).

use std::fs;
use std::path::Path;

use alloy_primitives::U256;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ParseError, ParseResult, PointKind};
use crate::point_parser::{
    parse_fp2_elements,
    parse_g1_points,
    CanonicalWords,
    Fp2Element,
    G1Point,
};

#[cfg(test)]
#[path = "artifact_test.rs"]
mod artifact_test;

/// The artifact as found on disk, before the inner documents are parsed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawProofArtifact {
    pub instance: String,
    pub proof_groth: String,
    pub vk_groth: String,
    pub proof_link: String,
    pub vk_link: String,
}

impl RawProofArtifact {
    pub fn from_file(path: &Path) -> ParseResult<Self> {
        if !path.exists() {
            return Err(ParseError::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
        debug!("Read {} bytes of proof artifact from {}.", content.len(), path.display());
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ParseResult<Self> {
        serde_json::from_str(content)
            .map_err(|source| ParseError::Json { context: "artifact", source })
    }
}

#[derive(Deserialize)]
struct RawInstance {
    link_com: String,
    pd_cm: String,
}

#[derive(Deserialize)]
struct RawGroth16Proof {
    a: String,
    b: String,
    c: String,
    d: String,
}

#[derive(Deserialize)]
struct RawGroth16VerifyingKey {
    alpha: String,
    beta: String,
    delta: String,
    abc: String,
    gamma: String,
}

#[derive(Deserialize)]
struct RawLinkProof {
    pi: String,
}

#[derive(Deserialize)]
struct RawLinkVerifyingKey {
    #[serde(rename = "C")]
    c: String,
    a: String,
}

fn inner_document<T: DeserializeOwned>(structure: &'static str, text: &str) -> ParseResult<T> {
    serde_json::from_str(text).map_err(|source| ParseError::Json { context: structure, source })
}

fn g1_field(
    structure: &'static str,
    field: &'static str,
    text: &str,
) -> ParseResult<Vec<G1Point>> {
    let points =
        parse_g1_points(text).map_err(|error| ParseError::Syntax { structure, field, error })?;
    if points.is_empty() {
        return Err(ParseError::NoMatches { structure, field, kind: PointKind::G1 });
    }
    Ok(points)
}

fn g2_field(
    structure: &'static str,
    field: &'static str,
    text: &str,
) -> ParseResult<Vec<Fp2Element>> {
    let elements =
        parse_fp2_elements(text).map_err(|error| ParseError::Syntax { structure, field, error })?;
    if elements.is_empty() {
        return Err(ParseError::NoMatches { structure, field, kind: PointKind::G2 });
    }
    Ok(elements)
}

/// Public commitments of the statement: `link_com` then `pd_cm`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    pub link_com: Vec<G1Point>,
    pub pd_cm: Vec<G1Point>,
}

impl Instance {
    const NAME: &'static str = "instance";

    pub fn parse(text: &str) -> ParseResult<Self> {
        let raw: RawInstance = inner_document(Self::NAME, text)?;
        Ok(Self {
            link_com: g1_field(Self::NAME, "link_com", &raw.link_com)?,
            pd_cm: g1_field(Self::NAME, "pd_cm", &raw.pd_cm)?,
        })
    }
}

impl CanonicalWords for Instance {
    fn canonical_words(&self) -> Vec<U256> {
        [self.link_com.canonical_words(), self.pd_cm.canonical_words()].concat()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Groth16Proof {
    pub a: Vec<G1Point>,
    pub b: Vec<Fp2Element>,
    pub c: Vec<G1Point>,
    pub d: Vec<G1Point>,
}

impl Groth16Proof {
    const NAME: &'static str = "proof_groth";

    pub fn parse(text: &str) -> ParseResult<Self> {
        let raw: RawGroth16Proof = inner_document(Self::NAME, text)?;
        Ok(Self {
            a: g1_field(Self::NAME, "a", &raw.a)?,
            b: g2_field(Self::NAME, "b", &raw.b)?,
            c: g1_field(Self::NAME, "c", &raw.c)?,
            d: g1_field(Self::NAME, "d", &raw.d)?,
        })
    }
}

impl CanonicalWords for Groth16Proof {
    fn canonical_words(&self) -> Vec<U256> {
        [
            self.a.canonical_words(),
            self.b.canonical_words(),
            self.c.canonical_words(),
            self.d.canonical_words(),
        ]
        .concat()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Groth16VerifyingKey {
    pub alpha: Vec<G1Point>,
    pub beta: Vec<Fp2Element>,
    pub delta: Vec<Fp2Element>,
    /// One point per public input.
    pub abc: Vec<G1Point>,
    pub gamma: Vec<Fp2Element>,
}

impl Groth16VerifyingKey {
    const NAME: &'static str = "vk_groth";

    pub fn parse(text: &str) -> ParseResult<Self> {
        let raw: RawGroth16VerifyingKey = inner_document(Self::NAME, text)?;
        Ok(Self {
            alpha: g1_field(Self::NAME, "alpha", &raw.alpha)?,
            beta: g2_field(Self::NAME, "beta", &raw.beta)?,
            delta: g2_field(Self::NAME, "delta", &raw.delta)?,
            abc: g1_field(Self::NAME, "abc", &raw.abc)?,
            gamma: g2_field(Self::NAME, "gamma", &raw.gamma)?,
        })
    }
}

impl CanonicalWords for Groth16VerifyingKey {
    // Gamma goes last, after the per-input points.
    fn canonical_words(&self) -> Vec<U256> {
        [
            self.alpha.canonical_words(),
            self.beta.canonical_words(),
            self.delta.canonical_words(),
            self.abc.canonical_words(),
            self.gamma.canonical_words(),
        ]
        .concat()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkProof {
    pub pi: Vec<G1Point>,
}

impl LinkProof {
    const NAME: &'static str = "proof_link";

    pub fn parse(text: &str) -> ParseResult<Self> {
        let raw: RawLinkProof = inner_document(Self::NAME, text)?;
        Ok(Self { pi: g1_field(Self::NAME, "pi", &raw.pi)? })
    }
}

impl CanonicalWords for LinkProof {
    fn canonical_words(&self) -> Vec<U256> {
        self.pi.canonical_words()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkVerifyingKey {
    /// Per-instance commitment key, `C` in the artifact.
    pub c: Vec<Fp2Element>,
    pub a: Vec<Fp2Element>,
}

impl LinkVerifyingKey {
    const NAME: &'static str = "vk_link";

    pub fn parse(text: &str) -> ParseResult<Self> {
        let raw: RawLinkVerifyingKey = inner_document(Self::NAME, text)?;
        Ok(Self { c: g2_field(Self::NAME, "C", &raw.c)?, a: g2_field(Self::NAME, "a", &raw.a)? })
    }
}

impl CanonicalWords for LinkVerifyingKey {
    fn canonical_words(&self) -> Vec<U256> {
        [self.c.canonical_words(), self.a.canonical_words()].concat()
    }
}

/// A fully parsed artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofArtifact {
    pub instance: Instance,
    pub proof_groth: Groth16Proof,
    pub vk_groth: Groth16VerifyingKey,
    pub proof_link: LinkProof,
    pub vk_link: LinkVerifyingKey,
}

impl ProofArtifact {
    /// Reads and parses the artifact at `path`. This is the only I/O the pipeline performs.
    pub fn load(path: &Path) -> ParseResult<Self> {
        let artifact = Self::from_raw(&RawProofArtifact::from_file(path)?)?;
        debug!(
            "Parsed proof artifact {} with {} public inputs.",
            path.display(),
            artifact.vk_groth.abc.len()
        );
        Ok(artifact)
    }

    pub fn from_raw(raw: &RawProofArtifact) -> ParseResult<Self> {
        Ok(Self {
            instance: Instance::parse(&raw.instance)?,
            proof_groth: Groth16Proof::parse(&raw.proof_groth)?,
            vk_groth: Groth16VerifyingKey::parse(&raw.vk_groth)?,
            proof_link: LinkProof::parse(&raw.proof_link)?,
            vk_link: LinkVerifyingKey::parse(&raw.vk_link)?,
        })
    }

    pub fn flatten(&self) -> FlattenedArtifact {
        FlattenedArtifact {
            instance: self.instance.canonical_words(),
            proof_groth: self.proof_groth.canonical_words(),
            vk_groth: self.vk_groth.canonical_words(),
            proof_link: self.proof_link.canonical_words(),
            vk_link: self.vk_link.canonical_words(),
        }
    }
}

/// The five flattened arguments of an artifact, serialized as arrays of decimal strings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedArtifact {
    #[serde(with = "decimal_words")]
    pub instance: Vec<U256>,
    #[serde(with = "decimal_words")]
    pub proof_groth: Vec<U256>,
    #[serde(with = "decimal_words")]
    pub vk_groth: Vec<U256>,
    #[serde(with = "decimal_words")]
    pub proof_link: Vec<U256>,
    #[serde(with = "decimal_words")]
    pub vk_link: Vec<U256>,
}

mod decimal_words {
    use alloy_primitives::U256;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(words: &[U256], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(words.iter().map(U256::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<U256>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|word| U256::from_str_radix(word, 10).map_err(D::Error::custom))
            .collect()
    }
}
