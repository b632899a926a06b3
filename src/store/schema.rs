//! Table definitions for the locus store.

/// Statements executed, in order, when a fresh store is initialised.
pub(crate) const CREATE_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS regions",
    "DROP TABLE IF EXISTS variants",
    "DROP TABLE IF EXISTS loci",
    "CREATE TABLE loci (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        depth INTEGER NOT NULL CHECK (depth > 0),
        length INTEGER NOT NULL CHECK (length >= 0),
        consensus TEXT NOT NULL,
        pass INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE variants (
        locus_id INTEGER NOT NULL REFERENCES loci(id),
        position INTEGER NOT NULL CHECK (position >= 0),
        value TEXT NOT NULL,
        UNIQUE (locus_id, position)
    )",
    "CREATE TABLE regions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        locus_id INTEGER NOT NULL REFERENCES loci(id),
        start INTEGER NOT NULL CHECK (start >= 0),
        stop INTEGER NOT NULL,
        sequence TEXT NOT NULL,
        gap_count INTEGER NOT NULL,
        bad_count INTEGER NOT NULL,
        variant_count INTEGER NOT NULL,
        pass INTEGER NOT NULL DEFAULT 0,
        CHECK (start < stop)
    )",
    "CREATE INDEX variants_by_locus ON variants (locus_id, position)",
    "CREATE INDEX regions_by_locus ON regions (locus_id, start)",
];

pub(crate) const INSERT_LOCUS: &str =
    "INSERT INTO loci (depth, length, consensus, pass) VALUES (?1, ?2, ?3, 0)";

pub(crate) const INSERT_VARIANT: &str =
    "INSERT INTO variants (locus_id, position, value) VALUES (?1, ?2, ?3)";

pub(crate) const INSERT_REGION: &str = "INSERT INTO regions
    (locus_id, start, stop, sequence, gap_count, bad_count, variant_count, pass)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)";

pub(crate) const LOCUS_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM loci WHERE id = ?1)";

pub(crate) const REGION_COLUMNS: &str =
    "id, locus_id, start, stop, sequence, gap_count, bad_count, variant_count, pass";

pub(crate) const LOCUS_COLUMNS: &str = "id, depth, length, consensus, pass";
