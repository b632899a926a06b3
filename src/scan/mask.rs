use std::ops::Range;

use bitvec::prelude::*;

use crate::consensus::{classify, SiteClass, SiteCounts};

/// Per-position class bits for one consensus sequence.
///
/// Window classification becomes three `count_ones` calls over bit slices.
#[derive(Debug, Clone)]
pub struct SiteMasks {
    variants: BitVec,
    missing: BitVec,
    gaps: BitVec,
}

impl SiteMasks {
    /// Build masks for `consensus`.
    pub fn new(consensus: &[u8]) -> Self {
        let len = consensus.len();
        let mut masks = Self {
            variants: bitvec![0; len],
            missing: bitvec![0; len],
            gaps: bitvec![0; len],
        };
        for (idx, &symbol) in consensus.iter().enumerate() {
            match classify(symbol) {
                SiteClass::Variable => masks.variants.set(idx, true),
                SiteClass::Missing => masks.missing.set(idx, true),
                SiteClass::Gap => masks.gaps.set(idx, true),
                SiteClass::Base(_) | SiteClass::Other => {}
            }
        }
        masks
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` when built from an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Class counts over `range`, clamped to the sequence end.
    pub fn counts(&self, range: Range<usize>) -> SiteCounts {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        SiteCounts {
            variants: self.variants[start..end].count_ones() as u32,
            missing: self.missing[start..end].count_ones() as u32,
            gaps: self.gaps[start..end].count_ones() as u32,
        }
    }
}
