//! Nucleotide symbol classes and IUPAC ambiguity codes.

/// Gap symbol used in alignments and consensus sequences.
pub const GAP: u8 = b'-';
/// Missing-data symbol.
pub const MISSING: u8 = b'N';
/// Marker for a variable column in which all four bases were observed.
pub const ANY_VARIANT: u8 = b'*';

/// Canonical base order used for tie-breaking (A < C < G < T).
pub const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Coarse class of a consensus or alignment symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteClass {
    /// One of A, C, G, T (U is folded into T).
    Base(usize),
    /// An ambiguity code or the generic variant marker.
    Variable,
    /// Missing data (`N`, `?`).
    Missing,
    /// Alignment gap (`-`, `.`).
    Gap,
    /// Anything else; ignored by counting code.
    Other,
}

/// Classify a single (case-insensitive) symbol.
pub fn classify(symbol: u8) -> SiteClass {
    match symbol.to_ascii_uppercase() {
        b'A' => SiteClass::Base(0),
        b'C' => SiteClass::Base(1),
        b'G' => SiteClass::Base(2),
        b'T' | b'U' => SiteClass::Base(3),
        b'N' | b'?' => SiteClass::Missing,
        b'-' | b'.' => SiteClass::Gap,
        b'*' => SiteClass::Variable,
        other if base_mask(other) != 0 => SiteClass::Variable,
        _ => SiteClass::Other,
    }
}

/// Bit mask (A=1, C=2, G=4, T=8) of the bases a symbol stands for.
///
/// Missing data, gaps and unknown symbols map to `0`.
pub fn base_mask(symbol: u8) -> u8 {
    match symbol.to_ascii_uppercase() {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' | b'U' => 0b1000,
        b'M' => 0b0011,
        b'R' => 0b0101,
        b'W' => 0b1001,
        b'S' => 0b0110,
        b'Y' => 0b1010,
        b'K' => 0b1100,
        b'V' => 0b0111,
        b'H' => 0b1011,
        b'D' => 0b1101,
        b'B' => 0b1110,
        b'*' => 0b1111,
        _ => 0,
    }
}

/// Symbol encoding a set of bases given as a mask.
///
/// Single bases map to themselves, pairs and triples to their IUPAC code and
/// the full set to [`ANY_VARIANT`]. An empty mask maps to [`MISSING`].
pub fn code_for_mask(mask: u8) -> u8 {
    match mask & 0b1111 {
        0b0000 => MISSING,
        0b0001 => b'A',
        0b0010 => b'C',
        0b0100 => b'G',
        0b1000 => b'T',
        0b0011 => b'M',
        0b0101 => b'R',
        0b1001 => b'W',
        0b0110 => b'S',
        0b1010 => b'Y',
        0b1100 => b'K',
        0b0111 => b'V',
        0b1011 => b'H',
        0b1101 => b'D',
        0b1110 => b'B',
        _ => ANY_VARIANT,
    }
}
