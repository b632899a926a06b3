use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{FilterError, SelectRule};
use crate::store::{LocusStore, RegionId, RegionRecord};

/// Index of the region `rule` keeps among `candidates` (ordered by start),
/// or `None` when there are no candidates. Ties resolve to the lowest start.
pub fn choose_region<R: Rng>(
    rule: SelectRule,
    candidates: &[RegionRecord],
    rng: &mut R,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let best_by = |key: &dyn Fn(&RegionRecord) -> i64| {
        // `min_by_key` returns the first minimum, i.e. the lowest start
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, region)| key(region))
            .map(|(idx, _)| idx)
    };
    match rule {
        SelectRule::First => Some(0),
        SelectRule::MostVariants => best_by(&|r| -i64::from(r.variant_count)),
        SelectRule::FewestVariants => best_by(&|r| i64::from(r.variant_count)),
        SelectRule::FewestBad => best_by(&|r| i64::from(r.bad_count)),
        SelectRule::Random => Some(rng.random_range(0..candidates.len())),
    }
}

/// Reduce every locus to at most one candidate region.
///
/// Returns the number of regions excluded.
pub fn select_single_region_per_locus(
    store: &mut LocusStore,
    rule: SelectRule,
    seed: Option<u64>,
) -> Result<usize, FilterError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut excluded: Vec<RegionId> = Vec::new();
    for locus_id in store.loci_with_multiple_regions()? {
        let candidates: Vec<RegionRecord> = store
            .regions_for_locus(locus_id)?
            .into_iter()
            .filter(|region| !region.pass)
            .collect();
        if candidates.len() < 2 {
            continue;
        }
        let Some(keep) = choose_region(rule, &candidates, &mut rng) else {
            continue;
        };
        excluded.extend(
            candidates
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != keep)
                .map(|(_, region)| region.id),
        );
    }

    let changed = store.mark_regions_by_id(&excluded)?;
    info!(rule = ?rule, excluded = changed, "selected one region per locus");
    Ok(changed)
}
