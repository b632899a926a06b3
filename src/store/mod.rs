//! Persisted relational store for loci, variants and candidate regions.
//!
//! Backed by SQLite. All writes go through `&mut self`, so a store has a
//! single writer and identifiers are assigned in a total order. The `pass`
//! column only ever moves from `0` (candidate) to `1` (excluded).

mod predicate;
mod records;
mod schema;

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, ErrorCode, OpenFlags};
use thiserror::Error;
use tracing::debug;

use crate::consensus::ConsensusLocus;

pub use predicate::{Comparator, Field, LocusField, Operand, Predicate, RegionField};
pub use records::{
    LocusId, LocusRecord, RegionDraft, RegionId, RegionRecord, StoreCounts, VariantRecord,
};

/// Errors surfaced by the locus store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert violated a table constraint.
    #[error("store write rejected: {0}")]
    Write(#[source] rusqlite::Error),

    /// A variant or region referenced a locus that does not exist.
    #[error("locus {0} does not exist")]
    UnknownLocus(LocusId),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    fn from_write(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Write(err),
            _ => StoreError::Database(err),
        }
    }
}

/// SQLite-backed store of loci, variants and regions.
#[derive(Debug)]
pub struct LocusStore {
    connection: Connection,
}

impl LocusStore {
    /// Create (or overwrite) a store in the given file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::initialise(Connection::open(path)?)
    }

    /// Create a transient store in memory.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::initialise(Connection::open_in_memory()?)
    }

    /// Open a store written by an earlier run without resetting it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        connection.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { connection })
    }

    fn initialise(connection: Connection) -> Result<Self, StoreError> {
        connection.pragma_update(None, "foreign_keys", true)?;
        for statement in schema::CREATE_TABLES {
            connection.execute(statement, [])?;
        }
        Ok(Self { connection })
    }

    /// Flush and close the underlying connection.
    pub fn close(self) -> Result<(), StoreError> {
        self.connection
            .close()
            .map_err(|(_, err)| StoreError::Database(err))
    }

    /// Append a locus with `pass = false` and return its identifier.
    pub fn add_locus(
        &mut self,
        depth: usize,
        length: usize,
        consensus: &str,
    ) -> Result<LocusId, StoreError> {
        insert_locus_row(&self.connection, depth, length, consensus)
    }

    /// Append a variant of an existing locus.
    pub fn add_variant(
        &mut self,
        locus_id: LocusId,
        position: usize,
        value: char,
    ) -> Result<(), StoreError> {
        ensure_locus(&self.connection, locus_id)?;
        insert_variant_row(&self.connection, locus_id, position, value)
    }

    /// Insert a locus and all of its variants in a single transaction.
    ///
    /// On failure nothing is committed.
    pub fn insert_locus(&mut self, locus: &ConsensusLocus) -> Result<LocusId, StoreError> {
        let tx = self.connection.transaction()?;
        let id = insert_locus_row(&tx, locus.depth, locus.len(), &locus.sequence_str())?;
        for site in &locus.variants {
            insert_variant_row(&tx, id, site.position, site.value as char)?;
        }
        tx.commit()?;
        debug!(locus = id, variants = locus.variants.len(), "stored locus");
        Ok(id)
    }

    /// Append a region with `pass = false` and return its identifier.
    pub fn add_region(
        &mut self,
        locus_id: LocusId,
        region: &RegionDraft<'_>,
    ) -> Result<RegionId, StoreError> {
        ensure_locus(&self.connection, locus_id)?;
        insert_region_row(&self.connection, locus_id, region)
    }

    /// Insert all regions found on one locus in a single transaction.
    pub fn insert_regions(
        &mut self,
        locus_id: LocusId,
        regions: &[RegionDraft<'_>],
    ) -> Result<Vec<RegionId>, StoreError> {
        let tx = self.connection.transaction()?;
        ensure_locus(&tx, locus_id)?;
        let ids = regions
            .iter()
            .map(|region| insert_region_row(&tx, locus_id, region))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;
        Ok(ids)
    }

    /// Exclude every candidate locus matching `predicate`; returns rows changed.
    pub fn mark_loci_where(&mut self, predicate: &Predicate<LocusField>) -> Result<usize, StoreError> {
        let mut values = Vec::new();
        let condition = predicate.compile(&mut values);
        let sql = format!("UPDATE loci SET pass = 1 WHERE pass = 0 AND {condition}");
        let changed = self.connection.execute(&sql, params_from_iter(values))?;
        debug!(changed, condition = %condition, "marked loci");
        Ok(changed)
    }

    /// Exclude every candidate region matching `predicate`; returns rows changed.
    pub fn mark_regions_where(
        &mut self,
        predicate: &Predicate<RegionField>,
    ) -> Result<usize, StoreError> {
        let mut values = Vec::new();
        let condition = predicate.compile(&mut values);
        let sql = format!("UPDATE regions SET pass = 1 WHERE pass = 0 AND {condition}");
        let changed = self.connection.execute(&sql, params_from_iter(values))?;
        debug!(changed, condition = %condition, "marked regions");
        Ok(changed)
    }

    /// Exclude the listed regions; unknown or already excluded ids are ignored.
    pub fn mark_regions_by_id(&mut self, ids: &[RegionId]) -> Result<usize, StoreError> {
        let tx = self.connection.transaction()?;
        let mut changed = 0;
        {
            let mut update =
                tx.prepare("UPDATE regions SET pass = 1 WHERE id = ?1 AND pass = 0")?;
            for id in ids {
                changed += update.execute([id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Candidate loci as `(id, consensus)`, ordered by id.
    pub fn unpassed_loci(&self) -> Result<Vec<(LocusId, String)>, StoreError> {
        let mut stmt = self
            .connection
            .prepare("SELECT id, consensus FROM loci WHERE pass = 0 ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Look up one locus.
    pub fn locus(&self, id: LocusId) -> Result<Option<LocusRecord>, StoreError> {
        let sql = format!("SELECT {} FROM loci WHERE id = ?1", schema::LOCUS_COLUMNS);
        let mut stmt = self.connection.prepare(&sql)?;
        let mut rows = stmt.query_map([id], LocusRecord::from_row)?;
        Ok(rows.next().transpose()?)
    }

    /// All loci ordered by id.
    pub fn loci(&self) -> Result<Vec<LocusRecord>, StoreError> {
        let sql = format!("SELECT {} FROM loci ORDER BY id", schema::LOCUS_COLUMNS);
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([], LocusRecord::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Variants of a locus ordered by position.
    pub fn variants_for_locus(&self, locus_id: LocusId) -> Result<Vec<VariantRecord>, StoreError> {
        let mut stmt = self.connection.prepare(
            "SELECT locus_id, position, value FROM variants WHERE locus_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map([locus_id], VariantRecord::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// All regions of a locus (candidate or not), ordered by start then id.
    pub fn regions_for_locus(&self, locus_id: LocusId) -> Result<Vec<RegionRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM regions WHERE locus_id = ?1 ORDER BY start, id",
            schema::REGION_COLUMNS
        );
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([locus_id], RegionRecord::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// All regions ordered by id.
    pub fn regions(&self) -> Result<Vec<RegionRecord>, StoreError> {
        let sql = format!("SELECT {} FROM regions ORDER BY id", schema::REGION_COLUMNS);
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([], RegionRecord::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Candidate regions ordered by locus then start.
    pub fn surviving_regions(&self) -> Result<Vec<RegionRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM regions WHERE pass = 0 ORDER BY locus_id, start, id",
            schema::REGION_COLUMNS
        );
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map([], RegionRecord::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Identifiers of candidate regions, ordered by id.
    pub fn unpassed_region_ids(&self) -> Result<Vec<RegionId>, StoreError> {
        let mut stmt = self
            .connection
            .prepare("SELECT id FROM regions WHERE pass = 0 ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Loci that still hold more than one candidate region.
    pub fn loci_with_multiple_regions(&self) -> Result<Vec<LocusId>, StoreError> {
        let mut stmt = self.connection.prepare(
            "SELECT locus_id FROM regions WHERE pass = 0
             GROUP BY locus_id HAVING COUNT(*) > 1 ORDER BY locus_id",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Row totals across all tables.
    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let count = |sql: &str| -> Result<usize, StoreError> {
            let n: i64 = self.connection.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreCounts {
            loci: count("SELECT COUNT(*) FROM loci")?,
            loci_unpassed: count("SELECT COUNT(*) FROM loci WHERE pass = 0")?,
            variants: count("SELECT COUNT(*) FROM variants")?,
            regions: count("SELECT COUNT(*) FROM regions")?,
            regions_unpassed: count("SELECT COUNT(*) FROM regions WHERE pass = 0")?,
        })
    }
}

fn ensure_locus(conn: &Connection, locus_id: LocusId) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(schema::LOCUS_EXISTS, [locus_id], |row| row.get(0))?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::UnknownLocus(locus_id))
    }
}

fn insert_locus_row(
    conn: &Connection,
    depth: usize,
    length: usize,
    consensus: &str,
) -> Result<LocusId, StoreError> {
    conn.execute(
        schema::INSERT_LOCUS,
        params![depth as i64, length as i64, consensus],
    )
    .map_err(StoreError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn insert_variant_row(
    conn: &Connection,
    locus_id: LocusId,
    position: usize,
    value: char,
) -> Result<(), StoreError> {
    conn.execute(
        schema::INSERT_VARIANT,
        params![locus_id, position as i64, value.to_string()],
    )
    .map_err(StoreError::from_write)?;
    Ok(())
}

fn insert_region_row(
    conn: &Connection,
    locus_id: LocusId,
    region: &RegionDraft<'_>,
) -> Result<RegionId, StoreError> {
    conn.execute(
        schema::INSERT_REGION,
        params![
            locus_id,
            region.start as i64,
            region.stop as i64,
            region.sequence,
            region.counts.gaps,
            region.counts.missing,
            region.counts.variants,
        ],
    )
    .map_err(StoreError::from_write)?;
    Ok(conn.last_insert_rowid())
}
