//! Synthetic proof artifacts with known coordinates.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::U256;
use serde_json::json;

use crate::artifact::{FlattenedArtifact, RawProofArtifact};
use crate::point_parser::{Fp2Element, G1Point};

pub const ARTIFACT_FILE_NAME: &str = "proof_artifact.json";

pub fn g1_text(points: &[G1Point]) -> String {
    let groups: Vec<String> = points.iter().map(|p| format!("({}, {})", p.x, p.y)).collect();
    format!("[{}]", groups.join(", "))
}

pub fn g2_text(elements: &[Fp2Element]) -> String {
    let coordinates: Vec<String> =
        elements.iter().map(|e| format!("QuadExtField({} + {} * u)", e.re, e.im)).collect();
    format!("({})", coordinates.join(", "))
}

/// A deterministic sequence of distinct coordinates spread over the whole 256-bit range.
#[derive(Default)]
struct CoordinateSequence {
    counter: u64,
}

impl CoordinateSequence {
    fn next_word(&mut self) -> U256 {
        self.counter += 1;
        let shift = usize::try_from(self.counter % 200).expect("Shift fits in usize.");
        (U256::MAX >> shift) - U256::from(self.counter)
    }

    fn g1(&mut self, n_points: usize) -> Vec<G1Point> {
        (0..n_points).map(|_| G1Point { x: self.next_word(), y: self.next_word() }).collect()
    }

    /// A G2 point: its x and y coordinates.
    fn g2(&mut self) -> Vec<Fp2Element> {
        (0..2).map(|_| Fp2Element { re: self.next_word(), im: self.next_word() }).collect()
    }
}

fn g1_words(points: &[G1Point]) -> Vec<U256> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn g2_words(elements: &[Fp2Element]) -> Vec<U256> {
    elements.iter().flat_map(|e| [e.im, e.re]).collect()
}

/// An artifact document together with the flattened words it must produce.
pub struct SyntheticArtifact {
    pub raw: RawProofArtifact,
    pub expected: FlattenedArtifact,
}

impl SyntheticArtifact {
    pub fn new(n_public_inputs: usize) -> Self {
        let mut sequence = CoordinateSequence::default();

        let link_com = sequence.g1(1);
        let pd_cm = sequence.g1(1);
        let (proof_a, proof_b, proof_c, proof_d) =
            (sequence.g1(1), sequence.g2(), sequence.g1(1), sequence.g1(1));
        let (alpha, beta, delta, abc, gamma) = (
            sequence.g1(1),
            sequence.g2(),
            sequence.g2(),
            sequence.g1(n_public_inputs),
            sequence.g2(),
        );
        let pi = sequence.g1(1);
        let (link_c, link_a) = (sequence.g2(), sequence.g2());

        let raw = RawProofArtifact {
            instance: json!({ "link_com": g1_text(&link_com), "pd_cm": g1_text(&pd_cm) })
                .to_string(),
            proof_groth: json!({
                "a": g1_text(&proof_a),
                "b": g2_text(&proof_b),
                "c": g1_text(&proof_c),
                "d": g1_text(&proof_d),
            })
            .to_string(),
            vk_groth: json!({
                "alpha": g1_text(&alpha),
                "beta": g2_text(&beta),
                "delta": g2_text(&delta),
                "abc": g1_text(&abc),
                "gamma": g2_text(&gamma),
            })
            .to_string(),
            proof_link: json!({ "pi": g1_text(&pi) }).to_string(),
            vk_link: json!({ "C": g2_text(&link_c), "a": g2_text(&link_a) }).to_string(),
        };

        let expected = FlattenedArtifact {
            instance: [g1_words(&link_com), g1_words(&pd_cm)].concat(),
            proof_groth: [
                g1_words(&proof_a),
                g2_words(&proof_b),
                g1_words(&proof_c),
                g1_words(&proof_d),
            ]
            .concat(),
            vk_groth: [
                g1_words(&alpha),
                g2_words(&beta),
                g2_words(&delta),
                g1_words(&abc),
                g2_words(&gamma),
            ]
            .concat(),
            proof_link: g1_words(&pi),
            vk_link: [g2_words(&link_c), g2_words(&link_a)].concat(),
        };

        Self { raw, expected }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).expect("Failed to serialize synthetic artifact.")
    }

    /// Writes the artifact document into `dir` and returns its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join(ARTIFACT_FILE_NAME);
        fs::write(&path, self.to_json())
            .unwrap_or_else(|e| panic!("Failed to write {}: {e}", path.display()));
        path
    }
}
