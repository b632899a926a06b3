//! Majority-rule consensus calling over aligned blocks.
//!
//! Each alignment column is tallied independently. Gap and missing rows are
//! left out of the agreement fraction; a column whose best base does not reach
//! the threshold is reported as a [`VariantSite`] and written into the
//! consensus as its IUPAC ambiguity code.

mod builder;
mod counts;
pub mod iupac;

pub use builder::{
    build_consensus, ColumnCall, ColumnTally, ConsensusBuilder, ConsensusError, ConsensusLocus,
    VariantSite,
};
pub use counts::SiteCounts;
pub use iupac::{classify, SiteClass};
