//! End-to-end driver: alignment blocks in, filtered candidate regions out.
//!
//! A run has four phases separated by barriers:
//!
//! 1. blocks are read in batches, consensus is built for each batch on the
//!    worker pool and the loci are stored one at a time;
//! 2. short or shallow loci are excluded;
//! 3. every remaining locus is scanned on the worker pool and its regions are
//!    stored one locus at a time;
//! 4. one region per locus is selected (unless several are allowed) and the
//!    region filters run.
//!
//! Only this module writes to the store during a run, so identifiers follow
//! input order regardless of the number of threads.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::alignment::{AlignedBlock, AlignmentError, AlignmentSource};
use crate::config::DesignConfig;
use crate::consensus::{ConsensusBuilder, ConsensusLocus};
use crate::filter::{select_single_region_per_locus, FilterOutcome, RegionFilterPipeline};
use crate::scan::{scan_consensus, ScanParams, TargetRegion};
use crate::store::{Field, LocusField, LocusId, LocusStore, StoreError};
use crate::DesignError;

/// Blocks handed to the worker pool per batch, per thread.
const BLOCKS_PER_THREAD: usize = 64;

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Blocks yielded by the source, including skipped ones.
    pub blocks_read: usize,
    /// Blocks skipped for recoverable errors or rejected inserts.
    pub blocks_skipped: usize,
    /// Loci written to the store.
    pub loci_stored: usize,
    /// Loci excluded by the length / coverage pre-filter.
    pub loci_prefiltered: usize,
    /// Regions written to the store.
    pub regions_found: usize,
    /// Regions excluded by single-region selection.
    pub regions_deselected: usize,
    /// Per-filter exclusions, in execution order.
    pub filter_outcomes: Vec<FilterOutcome>,
    /// Regions still candidates at the end of the run.
    pub regions_surviving: usize,
}

/// Runs the design pipeline with one configuration.
#[derive(Debug)]
pub struct BaitDesigner {
    config: DesignConfig,
    consensus: ConsensusBuilder,
    scan: ScanParams,
    filters: RegionFilterPipeline,
    pool: rayon::ThreadPool,
}

impl BaitDesigner {
    /// Validate `config` and build the worker pool.
    pub fn new(config: DesignConfig) -> Result<Self, DesignError> {
        config.validate()?;
        let consensus = ConsensusBuilder::new(config.threshold)?;
        let scan = config.scan_params()?;
        let filters = RegionFilterPipeline::new(config.filters.clone(), config.seed);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        Ok(Self {
            config,
            consensus,
            scan,
            filters,
            pool,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// Run every phase over the blocks of `source`.
    pub fn run(
        &self,
        source: &AlignmentSource,
        store: &mut LocusStore,
    ) -> Result<RunSummary, DesignError> {
        info!(path = %source.path().display(), format = ?source.format(), "reading alignments");
        self.run_blocks(source.blocks()?, store)
    }

    /// Run every phase over an arbitrary block sequence.
    pub fn run_blocks<I>(&self, blocks: I, store: &mut LocusStore) -> Result<RunSummary, DesignError>
    where
        I: IntoIterator<Item = Result<AlignedBlock, AlignmentError>>,
    {
        let mut summary = RunSummary::default();
        self.load_loci(blocks, store, &mut summary)?;
        self.prefilter_loci(store, &mut summary)?;
        self.find_regions(store, &mut summary)?;
        self.filter_regions(store, &mut summary)?;

        info!(
            blocks = summary.blocks_read,
            skipped = summary.blocks_skipped,
            loci = summary.loci_stored,
            regions = summary.regions_found,
            surviving = summary.regions_surviving,
            "design run complete"
        );
        Ok(summary)
    }

    fn load_loci<I>(
        &self,
        blocks: I,
        store: &mut LocusStore,
        summary: &mut RunSummary,
    ) -> Result<(), DesignError>
    where
        I: IntoIterator<Item = Result<AlignedBlock, AlignmentError>>,
    {
        let batch_size = BLOCKS_PER_THREAD * self.config.threads;
        let mut blocks = blocks.into_iter();
        loop {
            let mut batch = Vec::with_capacity(batch_size);
            for item in blocks.by_ref() {
                summary.blocks_read += 1;
                match item {
                    Ok(block) => batch.push(block),
                    Err(err) if err.is_recoverable() => {
                        warn!(error = %err, "skipping alignment block");
                        summary.blocks_skipped += 1;
                    }
                    Err(err) => return Err(err.into()),
                }
                if batch.len() == batch_size {
                    break;
                }
            }
            if batch.is_empty() {
                break;
            }

            let builder = self.consensus;
            let built: Vec<_> = self.pool.install(|| {
                batch
                    .par_iter()
                    .map(|block| (block.ordinal(), builder.build(block)))
                    .collect()
            });

            for (ordinal, result) in built {
                match result {
                    Ok(locus) => self.store_locus(store, ordinal, &locus, summary)?,
                    Err(err) => {
                        warn!(block = ordinal, error = %err, "skipping block without consensus");
                        summary.blocks_skipped += 1;
                    }
                }
            }
        }
        info!(
            loci = summary.loci_stored,
            skipped = summary.blocks_skipped,
            "stored consensus loci"
        );
        Ok(())
    }

    fn store_locus(
        &self,
        store: &mut LocusStore,
        ordinal: usize,
        locus: &ConsensusLocus,
        summary: &mut RunSummary,
    ) -> Result<(), DesignError> {
        match store.insert_locus(locus) {
            Ok(id) => {
                debug!(block = ordinal, locus = id, length = locus.len(), "locus stored");
                summary.loci_stored += 1;
            }
            Err(err @ (StoreError::Write(_) | StoreError::UnknownLocus(_))) => {
                warn!(block = ordinal, error = %err, "locus insert rolled back");
                summary.blocks_skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn prefilter_loci(
        &self,
        store: &mut LocusStore,
        summary: &mut RunSummary,
    ) -> Result<(), DesignError> {
        let predicate = LocusField::Length
            .lt(self.config.min_locus_len as i64)
            .or(LocusField::Depth.lt(self.config.min_coverage as i64));
        summary.loci_prefiltered = store.mark_loci_where(&predicate)?;
        info!(
            excluded = summary.loci_prefiltered,
            min_length = self.config.min_locus_len,
            min_coverage = self.config.min_coverage,
            "pre-filtered loci"
        );
        Ok(())
    }

    fn find_regions(
        &self,
        store: &mut LocusStore,
        summary: &mut RunSummary,
    ) -> Result<(), DesignError> {
        let loci = store.unpassed_loci()?;
        let params = self.scan;
        let scanned: Vec<(LocusId, Vec<TargetRegion>)> = self.pool.install(|| {
            loci.par_iter()
                .map(|(id, consensus)| (*id, scan_consensus(consensus.as_bytes(), params)))
                .collect()
        });

        for ((id, regions), (_, consensus)) in scanned.iter().zip(&loci) {
            if regions.is_empty() {
                continue;
            }
            let drafts: Vec<_> = regions.iter().map(|r| r.draft(consensus)).collect();
            match store.insert_regions(*id, &drafts) {
                Ok(ids) => {
                    debug!(locus = id, regions = ids.len(), "regions stored");
                    summary.regions_found += ids.len();
                }
                Err(err @ (StoreError::Write(_) | StoreError::UnknownLocus(_))) => {
                    warn!(locus = id, error = %err, "region insert rolled back");
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(
            loci = loci.len(),
            regions = summary.regions_found,
            "scanned loci for target regions"
        );
        Ok(())
    }

    fn filter_regions(
        &self,
        store: &mut LocusStore,
        summary: &mut RunSummary,
    ) -> Result<(), DesignError> {
        if !self.config.multi_region {
            summary.regions_deselected =
                select_single_region_per_locus(store, self.config.select_rule, self.config.seed)?;
        }
        summary.filter_outcomes = self.filters.apply(store)?;
        summary.regions_surviving = store.counts()?.regions_unpassed;
        Ok(())
    }
}
