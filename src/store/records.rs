use rusqlite::Row;

use crate::consensus::SiteCounts;

/// Identifier assigned to a locus on insert.
pub type LocusId = i64;
/// Identifier assigned to a region on insert.
pub type RegionId = i64;

/// Stored locus row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusRecord {
    /// Locus identifier.
    pub id: LocusId,
    /// Rows in the source alignment block.
    pub depth: usize,
    /// Consensus length.
    pub length: usize,
    /// Consensus sequence.
    pub consensus: String,
    /// `true` once the locus is excluded.
    pub pass: bool,
}

impl LocusRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            depth: row.get::<_, i64>(1)? as usize,
            length: row.get::<_, i64>(2)? as usize,
            consensus: row.get(3)?,
            pass: row.get(4)?,
        })
    }
}

/// Stored variant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    /// Owning locus.
    pub locus_id: LocusId,
    /// 0-based column within the consensus.
    pub position: usize,
    /// Observed ambiguity code.
    pub value: char,
}

impl VariantRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let value: String = row.get(2)?;
        Ok(Self {
            locus_id: row.get(0)?,
            position: row.get::<_, i64>(1)? as usize,
            value: value.chars().next().unwrap_or('N'),
        })
    }
}

/// A region about to be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDraft<'a> {
    /// Start offset within the consensus (inclusive).
    pub start: usize,
    /// Stop offset within the consensus (exclusive).
    pub stop: usize,
    /// Consensus substring `[start, stop)`.
    pub sequence: &'a str,
    /// Symbol counts over the substring.
    pub counts: SiteCounts,
}

/// Stored region row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    /// Region identifier.
    pub id: RegionId,
    /// Source locus.
    pub locus_id: LocusId,
    /// Start offset (inclusive).
    pub start: usize,
    /// Stop offset (exclusive).
    pub stop: usize,
    /// Consensus substring.
    pub sequence: String,
    /// Gap symbols in the region.
    pub gap_count: u32,
    /// Missing-data symbols in the region.
    pub bad_count: u32,
    /// Variable sites in the region.
    pub variant_count: u32,
    /// `true` once the region is excluded.
    pub pass: bool,
}

impl RegionRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            locus_id: row.get(1)?,
            start: row.get::<_, i64>(2)? as usize,
            stop: row.get::<_, i64>(3)? as usize,
            sequence: row.get(4)?,
            gap_count: row.get(5)?,
            bad_count: row.get(6)?,
            variant_count: row.get(7)?,
            pass: row.get(8)?,
        })
    }

    /// Region length in bases.
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Returns `true` for a zero-length region (never stored).
    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }
}

/// Row totals across the three tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    /// All loci.
    pub loci: usize,
    /// Loci still candidates.
    pub loci_unpassed: usize,
    /// All variants.
    pub variants: usize,
    /// All regions.
    pub regions: usize,
    /// Regions still candidates.
    pub regions_unpassed: usize,
}
