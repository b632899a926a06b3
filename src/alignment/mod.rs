//! Aligned sequence blocks and the readers that produce them.
//!
//! Two textual formats are understood: the block-delimited `.loci` format and
//! MAF. Both readers are lazy; [`AlignmentSource`] re-opens its file on each
//! call to [`AlignmentSource::blocks`] so a run can be restarted from the top.

mod block;
mod loci;
mod maf;
mod source;

pub use block::{AlignedBlock, AlignedRow, AlignmentError};
pub use loci::LociReader;
pub use maf::MafReader;
pub use source::{AlignmentFormat, AlignmentSource, BlockIter};
