use std::sync::Arc;

use thiserror::Error;

/// Errors raised while reading or validating aligned blocks.
#[derive(Debug, Error)]
pub enum AlignmentError {
    /// Underlying reader failed.
    #[error("i/o error while reading alignment: {0}")]
    Io(#[from] std::io::Error),

    /// A block contained no rows.
    #[error("empty alignment block (block {block})")]
    EmptyAlignment {
        /// 0-based ordinal of the block within its source.
        block: usize,
    },

    /// A block was structurally invalid (ragged rows, unparsable record).
    #[error("malformed alignment block {block}: {reason}")]
    MalformedBlock {
        /// 0-based ordinal of the block within its source.
        block: usize,
        /// Human readable description of the defect.
        reason: String,
    },
}

impl AlignmentError {
    /// Whether the run may continue past this error by skipping the block.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AlignmentError::EmptyAlignment { .. } | AlignmentError::MalformedBlock { .. }
        )
    }
}

/// One sequence of an aligned block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    /// Identifier of the source sequence.
    pub name: Arc<str>,
    /// Aligned sequence stored as uppercase ASCII (gaps as `-`).
    pub sequence: Arc<[u8]>,
}

impl AlignedRow {
    /// Construct a row, upper-casing the sequence.
    pub fn new(name: impl Into<Arc<str>>, sequence: &[u8]) -> Self {
        let upper: Vec<u8> = sequence.iter().map(u8::to_ascii_uppercase).collect();
        Self {
            name: name.into(),
            sequence: Arc::from(upper.into_boxed_slice()),
        }
    }

    /// Number of alignment columns in this row.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` for a zero-length row.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A set of equal-length aligned sequences describing one locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedBlock {
    rows: Vec<AlignedRow>,
    columns: usize,
    ordinal: usize,
}

impl AlignedBlock {
    /// Validate rows and build a block.
    ///
    /// `ordinal` is the block's 0-based position in its source and labels
    /// errors and log lines.
    pub fn new(rows: Vec<AlignedRow>, ordinal: usize) -> Result<Self, AlignmentError> {
        let first = rows
            .first()
            .ok_or(AlignmentError::EmptyAlignment { block: ordinal })?;
        let columns = first.len();

        if let Some(row) = rows.iter().find(|row| row.len() != columns) {
            return Err(AlignmentError::MalformedBlock {
                block: ordinal,
                reason: format!(
                    "row '{}' has {} columns, expected {}",
                    row.name,
                    row.len(),
                    columns
                ),
            });
        }

        Ok(Self {
            rows,
            columns,
            ordinal,
        })
    }

    /// Build a block from `(name, sequence)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rows = pairs
            .into_iter()
            .map(|(name, seq)| AlignedRow::new(name, seq.as_bytes()))
            .collect();
        Self::new(rows, 0)
    }

    /// Position of the block within its source.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Number of rows (the locus depth).
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    /// Total number of alignment columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Access the rows.
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Iterate the symbols of column `col`, one per row.
    pub fn column(&self, col: usize) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().map(move |row| row.sequence[col])
    }
}
