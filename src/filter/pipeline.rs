use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::{FilterAction, FilterError, FilterOption};
use crate::store::{LocusStore, RegionId};

/// Regions excluded by one applied filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutcome {
    /// Filter that ran.
    pub option: FilterOption,
    /// Candidate regions it excluded.
    pub excluded: usize,
}

/// Ordered region filters over a locus store.
///
/// Threshold filters run first in the fixed order gaps, missing bases,
/// minimum variants, maximum variants; random downsampling always runs last.
/// The order in which options were supplied does not matter.
#[derive(Debug, Clone, Default)]
pub struct RegionFilterPipeline {
    filters: Vec<FilterOption>,
    seed: Option<u64>,
}

impl RegionFilterPipeline {
    /// Build a pipeline from options in any order.
    pub fn new(mut filters: Vec<FilterOption>, seed: Option<u64>) -> Self {
        // stable: options of the same kind keep their relative order
        filters.sort_by_key(FilterOption::stage);
        Self { filters, seed }
    }

    /// Filters in execution order.
    pub fn filters(&self) -> &[FilterOption] {
        &self.filters
    }

    /// Whether the pipeline has nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter against the store's candidate regions.
    pub fn apply(&self, store: &mut LocusStore) -> Result<Vec<FilterOutcome>, FilterError> {
        let mut outcomes = Vec::with_capacity(self.filters.len());
        for option in &self.filters {
            let excluded = match option.action() {
                FilterAction::Exclude(predicate) => store.mark_regions_where(&predicate)?,
                FilterAction::Downsample(keep) => downsample(store, keep, self.seed)?,
            };
            info!(filter = %option, excluded, "applied region filter");
            outcomes.push(FilterOutcome {
                option: *option,
                excluded,
            });
        }
        Ok(outcomes)
    }
}

/// Keep `keep` candidate regions chosen uniformly at random, excluding the rest.
///
/// Does nothing when `keep` already covers every candidate. With a seed the
/// selection is reproducible for identical store contents.
pub fn downsample(
    store: &mut LocusStore,
    keep: usize,
    seed: Option<u64>,
) -> Result<usize, FilterError> {
    let candidates = store.unpassed_region_ids()?;
    if keep >= candidates.len() {
        return Ok(0);
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let kept: HashSet<usize> = rand::seq::index::sample(&mut rng, candidates.len(), keep)
        .into_iter()
        .collect();
    let excluded: Vec<RegionId> = candidates
        .iter()
        .enumerate()
        .filter(|(idx, _)| !kept.contains(idx))
        .map(|(_, id)| *id)
        .collect();
    Ok(store.mark_regions_by_id(&excluded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::SiteCounts;
    use crate::store::RegionDraft;

    fn store_with_regions(counts: &[SiteCounts]) -> LocusStore {
        let mut store = LocusStore::in_memory().unwrap();
        let seq = "A".repeat(100);
        let locus = store.add_locus(4, seq.len(), &seq).unwrap();
        for (i, c) in counts.iter().enumerate() {
            let start = i * 10;
            store
                .add_region(
                    locus,
                    &RegionDraft {
                        start,
                        stop: start + 10,
                        sequence: &seq[start..start + 10],
                        counts: *c,
                    },
                )
                .unwrap();
        }
        store
    }

    fn counts(gaps: u32, missing: u32, variants: u32) -> SiteCounts {
        SiteCounts {
            variants,
            missing,
            gaps,
        }
    }

    #[test]
    fn options_are_reordered_into_stage_order() {
        let pipeline = RegionFilterPipeline::new(
            vec![
                FilterOption::Downsample(3),
                FilterOption::MaxBad(1),
                FilterOption::MaxGaps(2),
            ],
            Some(1),
        );
        let codes: Vec<char> = pipeline.filters().iter().map(FilterOption::code).collect();
        assert_eq!(codes, vec!['g', 'n', 'r']);
    }

    #[test]
    fn threshold_filters_exclude_matching_regions() {
        let mut store = store_with_regions(&[
            counts(0, 0, 1),
            counts(3, 0, 1),
            counts(0, 2, 1),
            counts(0, 0, 0),
            counts(0, 0, 5),
        ]);
        let pipeline = RegionFilterPipeline::new(
            vec![
                "M=3".parse().unwrap(),
                "m=1".parse().unwrap(),
                "n=1".parse().unwrap(),
                "g=2".parse().unwrap(),
            ],
            None,
        );
        let outcomes = pipeline.apply(&mut store).unwrap();
        let excluded: Vec<usize> = outcomes.iter().map(|o| o.excluded).collect();
        assert_eq!(excluded, vec![1, 1, 1, 1]);
        assert_eq!(store.unpassed_region_ids().unwrap().len(), 1);
    }

    #[test]
    fn downsample_keeps_exactly_k() {
        let mut store = store_with_regions(&[SiteCounts::default(); 8]);
        let excluded = downsample(&mut store, 3, Some(11)).unwrap();
        assert_eq!(excluded, 5);
        assert_eq!(store.unpassed_region_ids().unwrap().len(), 3);
    }

    #[test]
    fn downsample_with_enough_room_is_a_no_op() {
        let mut store = store_with_regions(&[SiteCounts::default(); 4]);
        assert_eq!(downsample(&mut store, 4, None).unwrap(), 0);
        assert_eq!(store.unpassed_region_ids().unwrap().len(), 4);
    }

    #[test]
    fn seeded_downsample_is_reproducible() {
        let survivors = |seed| {
            let mut store = store_with_regions(&[SiteCounts::default(); 10]);
            downsample(&mut store, 4, Some(seed)).unwrap();
            store.unpassed_region_ids().unwrap()
        };
        assert_eq!(survivors(7), survivors(7));
    }
}
