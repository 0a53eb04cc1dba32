use alloy_primitives::U256;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::batch::{ArgumentTemplate, BatchSize};
use crate::errors::BatchSizeError;

fn words(values: impl IntoIterator<Item = u64>) -> Vec<U256> {
    values.into_iter().map(U256::from).collect()
}

#[test]
fn sweep_covers_two_through_1024() {
    let sizes: Vec<u32> = BatchSize::sweep().map(u32::from).collect();

    assert_eq!(sizes, vec![2, 4, 8, 16, 32, 64, 128, 256, 512, 1024]);
}

#[rstest]
#[case(1, 0)]
#[case(2, 1)]
#[case(1024, 10)]
#[case(BatchSize::MAX, 16)]
fn valid_batch_sizes(#[case] size: u32, #[case] log2: u32) {
    let batch_size = BatchSize::new(size).unwrap();

    assert_eq!(batch_size.log2(), log2);
    assert_eq!(batch_size, BatchSize::from_log2(log2).unwrap());
    assert_eq!(batch_size.to_string(), size.to_string());
}

#[rstest]
#[case::zero(0, BatchSizeError::NotPowerOfTwo(0))]
#[case::odd(12, BatchSizeError::NotPowerOfTwo(12))]
#[case::too_large(1 << 17, BatchSizeError::TooLarge { size: 1 << 17, max: BatchSize::MAX })]
fn invalid_batch_sizes(#[case] size: u32, #[case] expected: BatchSizeError) {
    assert_eq!(BatchSize::new(size), Err(expected));
}

#[test]
fn batch_size_parses_and_deserializes() {
    assert_eq!("64".parse::<BatchSize>().unwrap().get(), 64);
    assert_matches!("sixty".parse::<BatchSize>(), Err(BatchSizeError::Unparsable(_)));
    assert_eq!(serde_json::from_str::<BatchSize>("32").unwrap().get(), 32);
    assert!(serde_json::from_str::<BatchSize>("33").is_err());
    assert_eq!(serde_json::to_string(&BatchSize::new(8).unwrap()).unwrap(), "8");
}

#[test]
fn replicated_segment_scales_with_batch_size() {
    let single_statement = words([7, 8, 9]);
    let template = ArgumentTemplate::new(words([1, 2]), single_statement.clone());
    let batch_size = BatchSize::new(8).unwrap();

    let expanded = template.expand(batch_size);

    assert_eq!(expanded.len(), 2 + 8 * single_statement.len());
    assert_eq!(&expanded[..2], template.anchor());
    for copy in expanded[2..].chunks(single_statement.len()) {
        assert_eq!(copy, single_statement.as_slice());
    }
}

#[test]
fn anchor_is_constant_across_batch_sizes() {
    let anchor = words(100..108);
    let template = ArgumentTemplate::new(anchor.clone(), words([1, 2, 3, 4]));

    for batch_size in BatchSize::sweep() {
        let expanded = template.expand(batch_size);
        assert_eq!(&expanded[..anchor.len()], anchor.as_slice());
        assert_eq!(expanded.len(), template.expanded_len(batch_size));
    }
}

#[test]
fn batch_of_32_with_anchor_8_and_segment_4() {
    let template = ArgumentTemplate::new(words(0..8), words(8..12));

    let expanded = template.expand(BatchSize::new(32).unwrap());

    assert_eq!(expanded.len(), 136);
}

#[test]
fn fixed_and_per_statement_templates() {
    let batch_size = BatchSize::new(4).unwrap();

    assert_eq!(ArgumentTemplate::fixed(words([1, 2])).expand(batch_size), words([1, 2]));
    assert_eq!(
        ArgumentTemplate::per_statement(words([5, 6])).expand(batch_size),
        words([5, 6, 5, 6, 5, 6, 5, 6])
    );
}
