//! # baitfinder
//!
//! Design hybridisation-capture bait regions from multi-sample alignments.
//!
//! Each aligned block (one locus) is reduced to a majority-rule consensus in
//! which uncertain columns carry IUPAC ambiguity codes. Consensus sequences
//! and their variable sites are stored in SQLite, a sliding window marks
//! stretches with few variants, gaps and missing bases as candidate regions,
//! and an ordered set of filters narrows the candidates down to the final
//! bait targets.
//!
//! ## Usage Example
//!
//! ```no_run
//! use baitfinder::{AlignmentSource, BaitDesigner, DesignConfig, LocusStore};
//!
//! # fn main() -> Result<(), baitfinder::DesignError> {
//! let config = DesignConfig {
//!     win_width: 60,
//!     min_region_len: 120,
//!     ..DesignConfig::default()
//! };
//! let designer = BaitDesigner::new(config)?;
//! let mut store = LocusStore::create("baits.sqlite")?;
//! let source = AlignmentSource::detect("run.loci").expect("known extension");
//! let summary = designer.run(&source, &mut store)?;
//! println!("{} regions survive", summary.regions_surviving);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod alignment; // Aligned blocks and readers
pub mod config; // Run configuration
pub mod consensus; // Majority-rule consensus calling
pub mod filter; // Region filters and selection
pub mod pipeline; // Phase driver
pub mod report; // TSV / FASTA output
pub mod scan; // Sliding-window region discovery
pub mod store; // SQLite locus store

pub use alignment::{AlignedBlock, AlignmentError, AlignmentFormat, AlignmentSource};
pub use config::{ConfigError, DesignConfig};
pub use consensus::{build_consensus, ConsensusError, ConsensusLocus, VariantSite};
pub use filter::{FilterError, FilterOption, RegionFilterPipeline, SelectRule, VariantLimit};
pub use pipeline::{BaitDesigner, RunSummary};
pub use scan::{scan_consensus, ScanParams, TargetRegion, WindowLimits, WindowScanner};
pub use store::{LocusStore, RegionRecord, StoreError};

use thiserror::Error;

/// Any error a design run can end with.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Unrecoverable alignment input failure.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Consensus builder misconfigured.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Store failure outside a per-locus transaction.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filtering failed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
