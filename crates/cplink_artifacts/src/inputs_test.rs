use alloy_primitives::U256;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use crate::artifact::ProofArtifact;
use crate::batch::BatchSize;
use crate::inputs::{ConstructorArgs, VerifierInputs, VerifierVariant, VerifyArgs};
use crate::test_utils::SyntheticArtifact;

const G2_POINT_WORDS: usize = 4;

#[fixture]
fn synthetic() -> SyntheticArtifact {
    SyntheticArtifact::new(2)
}

#[rstest]
#[case::groth_link("groth_link", VerifierVariant::GrothLink)]
#[case::link("link", VerifierVariant::Link)]
fn variant_names(#[case] name: &str, #[case] variant: VerifierVariant) {
    assert_eq!(name.parse::<VerifierVariant>().unwrap(), variant);
    assert_eq!(variant.to_string(), name);
    assert_eq!(serde_json::to_string(&variant).unwrap(), format!("\"{name}\""));
}

#[rstest]
fn groth_link_arguments_decode_by_position(synthetic: SyntheticArtifact) {
    let artifact = ProofArtifact::from_raw(&synthetic.raw).unwrap();
    let inputs = VerifierInputs::new(&artifact, VerifierVariant::GrothLink);
    let batch_size = BatchSize::new(4).unwrap();
    let expected = &synthetic.expected;
    // The link key is stored `C` then `a`; the constructor wants `a` then `C` per statement.
    let (link_c, link_a) = expected.vk_link.split_at(G2_POINT_WORDS);

    let ConstructorArgs::GrothLink { vk_groth, vk_link, batch_size: encoded_batch_size } =
        inputs.constructor_args(batch_size)
    else {
        panic!("Expected groth-link constructor arguments.");
    };
    assert_eq!(vk_groth, expected.vk_groth);
    assert_eq!(encoded_batch_size, U256::from(4));
    assert_eq!(&vk_link[..G2_POINT_WORDS], link_a);
    for statement in vk_link[G2_POINT_WORDS..].chunks(G2_POINT_WORDS) {
        assert_eq!(statement, link_c);
    }
    assert_eq!(vk_link.len(), G2_POINT_WORDS + 4 * G2_POINT_WORDS);

    let VerifyArgs::GrothLink { instance, proof_groth, proof_link } =
        inputs.verify_args(batch_size)
    else {
        panic!("Expected groth-link verify arguments.");
    };
    assert_eq!(instance, expected.instance.repeat(4));
    assert_eq!(proof_groth, expected.proof_groth);
    assert_eq!(proof_link, expected.proof_link);
}

#[rstest]
fn link_variant_uses_link_key_and_proof(synthetic: SyntheticArtifact) {
    let artifact = ProofArtifact::from_raw(&synthetic.raw).unwrap();
    let inputs = VerifierInputs::new(&artifact, VerifierVariant::Link);
    let batch_size = BatchSize::new(2).unwrap();

    assert_eq!(
        inputs.constructor_args(batch_size),
        ConstructorArgs::Link { vk: inputs.vk_link().expand(batch_size) }
    );
    assert_eq!(
        inputs.verify_args(batch_size),
        VerifyArgs::Link {
            instance: synthetic.expected.instance.repeat(2),
            proof: synthetic.expected.proof_link.clone(),
        }
    );
}

#[rstest]
fn templates_are_reused_across_a_sweep(synthetic: SyntheticArtifact) {
    let artifact = ProofArtifact::from_raw(&synthetic.raw).unwrap();
    let inputs = VerifierInputs::new(&artifact, VerifierVariant::GrothLink);
    let instance_words = synthetic.expected.instance.len();

    for batch_size in BatchSize::sweep() {
        let VerifyArgs::GrothLink { instance, .. } = inputs.verify_args(batch_size) else {
            panic!("Expected groth-link verify arguments.");
        };
        assert_eq!(instance.len(), batch_size.get() * instance_words);
        assert!(inputs.instance().anchor().is_empty());
    }
}
