use thiserror::Error;

use super::iupac::{self, SiteClass, BASES, GAP, MISSING};
use crate::alignment::AlignedBlock;

/// Slack applied when comparing an agreement fraction against the threshold.
const FRACTION_EPSILON: f64 = 1e-9;

/// Errors raised while building a consensus.
#[derive(Debug, Error, PartialEq)]
pub enum ConsensusError {
    /// Majority threshold outside `(0, 1]`.
    #[error("consensus threshold {0} must be in (0, 1]")]
    InvalidThreshold(f64),

    /// Block has no rows or no columns.
    #[error("cannot build a consensus from an empty alignment")]
    EmptyAlignment,
}

/// A variable alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSite {
    /// 0-based column index within the consensus.
    pub position: usize,
    /// IUPAC code (or `*`) for the set of bases observed in the column.
    pub value: u8,
}

/// Consensus sequence and variable sites derived from one aligned block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusLocus {
    /// Number of rows in the source block.
    pub depth: usize,
    /// One symbol per alignment column.
    pub sequence: Vec<u8>,
    /// Variable columns in ascending position order.
    pub variants: Vec<VariantSite>,
}

impl ConsensusLocus {
    /// Consensus length (equals the number of alignment columns).
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` for an empty consensus.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Consensus as text.
    pub fn sequence_str(&self) -> String {
        String::from_utf8_lossy(&self.sequence).into_owned()
    }
}

/// Outcome of calling a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCall {
    /// Majority base reached the threshold.
    Fixed(u8),
    /// No base reached the threshold; carries the ambiguity code.
    Variable(u8),
    /// No informative rows; gap column.
    Gap,
    /// No informative rows and every excluded row was missing data.
    Missing,
}

/// Per-column symbol tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTally {
    /// Rows carrying each unambiguous base, in A, C, G, T order.
    pub base_counts: [u32; 4],
    /// Rows carrying an ambiguity code.
    pub ambiguous: u32,
    /// Union of all bases seen in the column.
    pub observed: u8,
    /// Rows with a gap.
    pub gaps: u32,
    /// Rows with missing data.
    pub missing: u32,
}

impl ColumnTally {
    /// Tally all symbols of an iterator.
    pub fn from_symbols(symbols: impl IntoIterator<Item = u8>) -> Self {
        let mut tally = Self::default();
        for symbol in symbols {
            tally.observe(symbol);
        }
        tally
    }

    /// Record one row's symbol.
    pub fn observe(&mut self, symbol: u8) {
        match iupac::classify(symbol) {
            SiteClass::Base(idx) => {
                self.base_counts[idx] += 1;
                self.observed |= 1 << idx;
            }
            SiteClass::Variable => {
                self.ambiguous += 1;
                self.observed |= iupac::base_mask(symbol);
            }
            SiteClass::Gap => self.gaps += 1,
            SiteClass::Missing | SiteClass::Other => self.missing += 1,
        }
    }

    /// Rows that count towards the agreement fraction.
    pub fn informative(&self) -> u32 {
        self.base_counts.iter().sum::<u32>() + self.ambiguous
    }

    /// Most frequent base index and its count; ties go to the earlier base.
    pub fn majority(&self) -> Option<(usize, u32)> {
        self.base_counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .fold(None, |best, (idx, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((idx, count)),
            })
    }

    /// Call the column against a majority threshold.
    pub fn call(&self, threshold: f64) -> ColumnCall {
        let informative = self.informative();
        if informative == 0 {
            if self.gaps == 0 && self.missing > 0 {
                return ColumnCall::Missing;
            }
            return ColumnCall::Gap;
        }

        if let Some((idx, count)) = self.majority() {
            let fraction = count as f64 / informative as f64;
            if fraction + FRACTION_EPSILON >= threshold {
                return ColumnCall::Fixed(BASES[idx]);
            }
        }
        ColumnCall::Variable(iupac::code_for_mask(self.observed))
    }
}

/// Builds majority-rule consensus sequences from aligned blocks.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusBuilder {
    threshold: f64,
}

impl ConsensusBuilder {
    /// Create a builder; `threshold` must lie in `(0, 1]`.
    pub fn new(threshold: f64) -> Result<Self, ConsensusError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConsensusError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// Majority fraction in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Call every column of `block`.
    pub fn build(&self, block: &AlignedBlock) -> Result<ConsensusLocus, ConsensusError> {
        if block.depth() == 0 || block.columns() == 0 {
            return Err(ConsensusError::EmptyAlignment);
        }

        let mut sequence = Vec::with_capacity(block.columns());
        let mut variants = Vec::new();

        for col in 0..block.columns() {
            let tally = ColumnTally::from_symbols(block.column(col));
            let symbol = match tally.call(self.threshold) {
                ColumnCall::Fixed(base) => base,
                ColumnCall::Variable(code) => {
                    variants.push(VariantSite {
                        position: col,
                        value: code,
                    });
                    code
                }
                ColumnCall::Gap => GAP,
                ColumnCall::Missing => MISSING,
            };
            sequence.push(symbol);
        }

        Ok(ConsensusLocus {
            depth: block.depth(),
            sequence,
            variants,
        })
    }
}

/// Convenience wrapper around [`ConsensusBuilder`].
pub fn build_consensus(
    block: &AlignedBlock,
    threshold: f64,
) -> Result<ConsensusLocus, ConsensusError> {
    ConsensusBuilder::new(threshold)?.build(block)
}
