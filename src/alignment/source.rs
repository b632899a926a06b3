use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{AlignedBlock, AlignmentError, LociReader, MafReader};

/// Supported textual alignment formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    /// Block-delimited `.loci` format.
    Loci,
    /// Multiple Alignment Format.
    Maf,
}

impl AlignmentFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "loci" => Some(Self::Loci),
            "maf" => Some(Self::Maf),
            _ => None,
        }
    }
}

impl FromStr for AlignmentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loci" => Ok(Self::Loci),
            "maf" => Ok(Self::Maf),
            other => Err(format!("unknown alignment format '{other}'")),
        }
    }
}

/// Boxed lazy sequence of aligned blocks.
pub type BlockIter = Box<dyn Iterator<Item = Result<AlignedBlock, AlignmentError>> + Send>;

/// An alignment file that can be iterated from the start any number of times.
#[derive(Debug, Clone)]
pub struct AlignmentSource {
    path: PathBuf,
    format: AlignmentFormat,
}

impl AlignmentSource {
    /// Create a source with an explicit format.
    pub fn new(path: impl Into<PathBuf>, format: AlignmentFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Create a source, inferring the format from the file extension.
    pub fn detect(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = AlignmentFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format used to parse the file.
    pub fn format(&self) -> AlignmentFormat {
        self.format
    }

    /// Open the file and return a fresh lazy block iterator.
    pub fn blocks(&self) -> Result<BlockIter, AlignmentError> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(match self.format {
            AlignmentFormat::Loci => Box::new(LociReader::new(reader)),
            AlignmentFormat::Maf => Box::new(MafReader::new(reader)),
        })
    }
}
