use std::collections::BTreeSet;
use std::io::BufRead;

use tracing::info;

use super::FilterError;
use crate::store::{LocusStore, RegionId};

/// Parse tab-separated pairs of region identifiers (`id_<n>\tid_<m>`).
///
/// Blank lines and lines starting with `#` are skipped; the `id_` prefix is
/// optional. Columns beyond the second are ignored.
pub fn parse_pairwise_hits<R: BufRead>(reader: R) -> Result<Vec<(RegionId, RegionId)>, FilterError> {
    let mut pairs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut columns = trimmed.split('\t');
        let parsed = (
            columns.next().and_then(parse_region_id),
            columns.next().and_then(parse_region_id),
        );
        match parsed {
            (Some(a), Some(b)) => pairs.push((a, b)),
            _ => {
                return Err(FilterError::MalformedHit {
                    line: idx + 1,
                    text: line.clone(),
                })
            }
        }
    }
    Ok(pairs)
}

fn parse_region_id(text: &str) -> Option<RegionId> {
    let text = text.trim();
    text.strip_prefix("id_").unwrap_or(text).parse().ok()
}

/// Exclude both members of every redundant pair; returns regions changed.
pub fn exclude_redundant(
    store: &mut LocusStore,
    pairs: &[(RegionId, RegionId)],
) -> Result<usize, FilterError> {
    let ids: BTreeSet<RegionId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
    let ids: Vec<RegionId> = ids.into_iter().collect();
    let changed = store.mark_regions_by_id(&ids)?;
    info!(pairs = pairs.len(), excluded = changed, "excluded redundant regions");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_prefixed_and_bare_ids() {
        let input = "id_3\tid_7\t98.5\n\n# comment\n4\t9\n";
        let pairs = parse_pairwise_hits(Cursor::new(input)).unwrap();
        assert_eq!(pairs, vec![(3, 7), (4, 9)]);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let input = "id_1\tid_2\nid_x\tid_2\n";
        let err = parse_pairwise_hits(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, FilterError::MalformedHit { line: 2, .. }));
    }

    #[test]
    fn both_members_are_excluded() {
        let mut store = LocusStore::in_memory().unwrap();
        let seq = "G".repeat(40);
        let locus = store.add_locus(2, 40, &seq).unwrap();
        let drafts: Vec<_> = (0..4)
            .map(|i| crate::store::RegionDraft {
                start: i * 10,
                stop: i * 10 + 10,
                sequence: &seq[i * 10..i * 10 + 10],
                counts: Default::default(),
            })
            .collect();
        let ids = store.insert_regions(locus, &drafts).unwrap();

        let changed = exclude_redundant(&mut store, &[(ids[0], ids[2]), (ids[2], ids[0])]).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(store.unpassed_region_ids().unwrap(), vec![ids[1], ids[3]]);
    }
}
