//! Region filtering, single-region selection and redundancy exclusion.
//!
//! Every operation here only ever moves regions from candidate to excluded
//! through the store's marking calls.

mod option;
mod pipeline;
mod redundancy;
mod select;

use thiserror::Error;

use crate::store::StoreError;

pub use option::{FilterAction, FilterOption, FilterParseError, SelectRule, VariantLimit};
pub use pipeline::{downsample, FilterOutcome, RegionFilterPipeline};
pub use redundancy::{exclude_redundant, parse_pairwise_hits};
pub use select::{choose_region, select_single_region_per_locus};

/// Errors raised while filtering regions.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Marking rows failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading a pairwise-hit file failed.
    #[error("failed to read pairwise hits: {0}")]
    Io(#[from] std::io::Error),

    /// A pairwise-hit line could not be parsed.
    #[error("malformed pairwise hit on line {line}: '{text}'")]
    MalformedHit {
        /// 1-based line number.
        line: usize,
        /// Offending line.
        text: String,
    },
}
