use baitfinder::consensus::{SiteCounts, VariantSite};
use baitfinder::filter::{
    select_single_region_per_locus, FilterOption, RegionFilterPipeline, SelectRule,
};
use baitfinder::store::{LocusStore, RegionDraft};
use baitfinder::ConsensusLocus;
use proptest::prelude::*;

/// One locus of length 200 with variants at the given positions and one
/// region per `(start, stop, gaps, bad)` entry.
fn seeded_store(variants: &[usize], regions: &[(usize, usize, u32, u32)]) -> LocusStore {
    let mut store = LocusStore::in_memory().expect("in-memory store");
    let mut sequence = vec![b'A'; 200];
    for &pos in variants {
        sequence[pos] = b'R';
    }
    let locus = ConsensusLocus {
        depth: 5,
        sequence: sequence.clone(),
        variants: variants
            .iter()
            .map(|&position| VariantSite {
                position,
                value: b'R',
            })
            .collect(),
    };
    let id = store.insert_locus(&locus).expect("locus stored");
    let text = String::from_utf8(sequence).unwrap();

    let drafts: Vec<RegionDraft<'_>> = regions
        .iter()
        .map(|&(start, stop, gaps, missing)| RegionDraft {
            start,
            stop,
            sequence: &text[start..stop],
            counts: SiteCounts {
                variants: variants.iter().filter(|&&p| p >= start && p < stop).count() as u32,
                missing,
                gaps,
            },
        })
        .collect();
    store.insert_regions(id, &drafts).expect("regions stored");
    store
}

fn surviving_starts(store: &LocusStore) -> Vec<usize> {
    store
        .surviving_regions()
        .unwrap()
        .into_iter()
        .map(|r| r.start)
        .collect()
}

fn codes(codes: &[&str]) -> Vec<FilterOption> {
    codes.iter().map(|c| c.parse().expect("valid code")).collect()
}

#[test]
fn gap_filter_excludes_only_regions_over_the_limit() {
    let mut store = seeded_store(&[], &[(0, 40, 1, 0), (50, 90, 5, 0)]);
    let outcomes = RegionFilterPipeline::new(codes(&["g=3"]), None)
        .apply(&mut store)
        .unwrap();
    assert_eq!(outcomes[0].excluded, 1);
    assert_eq!(surviving_starts(&store), vec![0]);
}

#[test]
fn threshold_filters_are_order_independent() {
    let regions = [
        (0, 40, 0, 0),
        (40, 80, 2, 0),
        (80, 120, 0, 3),
        (120, 160, 0, 0),
        (160, 200, 1, 1),
    ];
    let variants = [5, 10, 45, 130, 131, 132, 170];
    let orders = [
        ["g=1", "n=1", "m=1", "M=2"],
        ["M=2", "m=1", "n=1", "g=1"],
        ["n=1", "M=2", "g=1", "m=1"],
    ];

    let results: Vec<Vec<usize>> = orders
        .iter()
        .map(|order| {
            let mut store = seeded_store(&variants, &regions);
            RegionFilterPipeline::new(codes(order), None)
                .apply(&mut store)
                .unwrap();
            surviving_starts(&store)
        })
        .collect();

    assert_eq!(results[0], vec![0, 160]);
    assert!(results.iter().all(|r| r == &results[0]));
}

#[test]
fn flanked_variant_filter_counts_neighbouring_sites() {
    // variants just outside [50, 90)
    let mut store = seeded_store(&[45, 95], &[(50, 90, 0, 0), (120, 160, 0, 0)]);
    RegionFilterPipeline::new(codes(&["m=2,10"]), None)
        .apply(&mut store)
        .unwrap();
    assert_eq!(surviving_starts(&store), vec![50]);
}

#[test]
fn per_base_variant_limit_scales_with_length() {
    let mut store = seeded_store(&[1, 2, 3, 101], &[(0, 40, 0, 0), (100, 180, 0, 0)]);
    // 0.05 * 40 = 2 allowed in the short region, 0.05 * 80 = 4 in the long one
    RegionFilterPipeline::new(codes(&["M=0.05"]), None)
        .apply(&mut store)
        .unwrap();
    assert_eq!(surviving_starts(&store), vec![100]);
}

#[test]
fn seeded_downsampling_is_reproducible() {
    let regions: Vec<_> = (0..10).map(|i| (i * 20, i * 20 + 20, 0, 0)).collect();
    let run = || {
        let mut store = seeded_store(&[], &regions);
        RegionFilterPipeline::new(codes(&["r=4"]), Some(2024))
            .apply(&mut store)
            .unwrap();
        surviving_starts(&store)
    };
    let first = run();
    assert_eq!(first.len(), 4);
    assert_eq!(first, run());
}

#[test]
fn downsampling_runs_after_threshold_filters() {
    let regions: Vec<_> = (0..10)
        .map(|i| (i * 20, i * 20 + 20, if i < 7 { 4 } else { 0 }, 0))
        .collect();
    let mut store = seeded_store(&[], &regions);
    // supplied first, applied last: only the three gap-free regions remain to sample from
    let outcomes = RegionFilterPipeline::new(codes(&["r=5", "g=0"]), Some(1))
        .apply(&mut store)
        .unwrap();
    assert_eq!(outcomes[0].excluded, 7);
    assert_eq!(outcomes[1].excluded, 0);
    assert_eq!(surviving_starts(&store), vec![140, 160, 180]);
}

#[test]
fn selection_then_filters_leave_one_region() {
    let mut store = seeded_store(&[15, 60, 61], &[(0, 40, 0, 0), (50, 90, 0, 0), (100, 140, 0, 0)]);
    select_single_region_per_locus(&mut store, SelectRule::MostVariants, None).unwrap();
    assert_eq!(surviving_starts(&store), vec![50]);
}

fn filter_code() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..4).prop_map(|n| format!("g={n}")),
        (0u32..4).prop_map(|n| format!("n={n}")),
        (0u32..3, 0u32..30).prop_map(|(n, f)| format!("m={n},{f}")),
        (0u32..3).prop_map(|n| format!("M={n}")),
        (1usize..6).prop_map(|k| format!("r={k}")),
    ]
}

proptest! {
    #[test]
    fn excluded_regions_never_return(
        steps in proptest::collection::vec(filter_code(), 1..6),
        gaps in proptest::collection::vec(0u32..5, 8),
    ) {
        let regions: Vec<_> = gaps
            .iter()
            .enumerate()
            .map(|(i, &g)| (i * 25, i * 25 + 20, g, g / 2))
            .collect();
        let mut store = seeded_store(&[3, 30, 31, 77, 140], &regions);

        let mut excluded = std::collections::HashSet::new();
        for step in &steps {
            let option: FilterOption = step.parse().unwrap();
            RegionFilterPipeline::new(vec![option], Some(5)).apply(&mut store).unwrap();
            let now: std::collections::HashSet<i64> = store
                .regions()
                .unwrap()
                .into_iter()
                .filter(|r| r.pass)
                .map(|r| r.id)
                .collect();
            prop_assert!(excluded.is_subset(&now));
            excluded = now;
        }
    }
}
