use baitfinder::alignment::{AlignedBlock, AlignedRow};
use baitfinder::consensus::{build_consensus, classify, ColumnCall, ColumnTally, SiteClass};
use proptest::prelude::*;

fn block(rows: &[String]) -> AlignedBlock {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, seq)| AlignedRow::new(format!("sample{i}"), seq.as_bytes()))
        .collect();
    AlignedBlock::new(rows, 0).expect("rows share a length")
}

/// Ten rows of twenty columns; column 3 carries six `A` and four `G`.
fn six_of_ten_block() -> AlignedBlock {
    let rows: Vec<String> = (0..10)
        .map(|i| {
            let mut seq = b"ACGTACGTACGTACGTACGT".to_vec();
            seq[3] = if i < 6 { b'A' } else { b'G' };
            String::from_utf8(seq).unwrap()
        })
        .collect();
    block(&rows)
}

#[test]
fn sixty_percent_column_is_fixed_at_half() {
    let locus = build_consensus(&six_of_ten_block(), 0.5).expect("consensus builds");
    assert_eq!(locus.depth, 10);
    assert_eq!(locus.len(), 20);
    assert_eq!(locus.sequence[3], b'A');
    assert!(locus.variants.is_empty());
}

#[test]
fn sixty_percent_column_is_variable_at_seventy() {
    let locus = build_consensus(&six_of_ten_block(), 0.7).expect("consensus builds");
    assert_eq!(locus.variants.len(), 1);
    assert_eq!(locus.variants[0].position, 3);
    assert_eq!(locus.variants[0].value, b'R');
    assert_eq!(locus.sequence[3], b'R');
}

#[test]
fn exact_threshold_counts_as_fixed() {
    let rows: Vec<String> = ["A", "A", "C", "C"].iter().map(|s| s.to_string()).collect();
    let locus = build_consensus(&block(&rows), 0.5).unwrap();
    // tie resolved towards the earlier base
    assert_eq!(locus.sequence, b"A");
}

#[test]
fn gap_and_missing_rows_do_not_dilute_majority() {
    let rows: Vec<String> = ["A", "A", "-", "N", "N", "C"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let locus = build_consensus(&block(&rows), 0.6).unwrap();
    assert_eq!(locus.sequence, b"A");
}

#[test]
fn four_base_column_is_a_variant_not_missing_data() {
    let rows: Vec<String> = ["A", "C", "G", "T"].iter().map(|s| s.to_string()).collect();
    let locus = build_consensus(&block(&rows), 0.5).unwrap();
    assert_eq!(locus.sequence, b"*");
    assert_eq!(classify(locus.sequence[0]), SiteClass::Variable);
    assert_eq!(locus.variants.len(), 1);
}

#[test]
fn invalid_threshold_is_rejected() {
    let rows = vec!["ACGT".to_string()];
    assert!(build_consensus(&block(&rows), 0.0).is_err());
    assert!(build_consensus(&block(&rows), 1.5).is_err());
}

fn column_symbol() -> impl Strategy<Value = u8> {
    prop_oneof![
        4 => Just(b'A'),
        4 => Just(b'C'),
        3 => Just(b'G'),
        3 => Just(b'T'),
        1 => Just(b'R'),
        1 => Just(b'Y'),
        2 => Just(b'-'),
        2 => Just(b'N'),
    ]
}

proptest! {
    #[test]
    fn majority_law_holds_for_every_column(
        column in proptest::collection::vec(column_symbol(), 1..40),
        threshold in 0.05f64..=1.0,
    ) {
        let tally = ColumnTally::from_symbols(column.iter().copied());
        let informative = tally.informative();
        match tally.call(threshold) {
            ColumnCall::Fixed(base) => {
                let (_, count) = tally.majority().expect("fixed column has a base");
                prop_assert!(count as f64 / informative as f64 + 1e-9 >= threshold);
                prop_assert_eq!(classify(base), SiteClass::Base(tally.majority().unwrap().0));
            }
            ColumnCall::Variable(code) => {
                if let Some((_, count)) = tally.majority() {
                    prop_assert!((count as f64 / informative as f64) + 1e-9 < threshold);
                }
                prop_assert_eq!(classify(code), SiteClass::Variable);
            }
            ColumnCall::Gap | ColumnCall::Missing => prop_assert_eq!(informative, 0),
        }
    }

    #[test]
    fn variants_are_exactly_the_variable_columns(
        rows in proptest::collection::vec(
            proptest::collection::vec(column_symbol(), 12),
            1..8,
        ),
        threshold in 0.3f64..=1.0,
    ) {
        let rows: Vec<String> = rows
            .into_iter()
            .map(|r| String::from_utf8(r).unwrap())
            .collect();
        let locus = build_consensus(&block(&rows), threshold).unwrap();
        prop_assert_eq!(locus.len(), 12);

        let variable: Vec<usize> = locus
            .sequence
            .iter()
            .enumerate()
            .filter(|(_, s)| classify(**s) == SiteClass::Variable)
            .map(|(i, _)| i)
            .collect();
        let positions: Vec<usize> = locus.variants.iter().map(|v| v.position).collect();
        prop_assert_eq!(variable, positions);
        for site in &locus.variants {
            prop_assert_eq!(locus.sequence[site.position], site.value);
        }
    }
}
