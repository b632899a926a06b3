use super::iupac::{classify, SiteClass};

/// Counts of the non-base symbol classes in a stretch of consensus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteCounts {
    /// Ambiguity codes / variant markers.
    pub variants: u32,
    /// Missing-data symbols (`N`).
    pub missing: u32,
    /// Gap symbols.
    pub gaps: u32,
}

impl SiteCounts {
    /// Count the symbol classes of `sequence`; fixed bases are ignored.
    pub fn of(sequence: &[u8]) -> Self {
        sequence
            .iter()
            .fold(Self::default(), |mut counts, &symbol| {
                match classify(symbol) {
                    SiteClass::Variable => counts.variants += 1,
                    SiteClass::Missing => counts.missing += 1,
                    SiteClass::Gap => counts.gaps += 1,
                    SiteClass::Base(_) | SiteClass::Other => {}
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_class() {
        let counts = SiteCounts::of(b"ACRN--*TY");
        assert_eq!(
            counts,
            SiteCounts {
                variants: 3,
                missing: 1,
                gaps: 2
            }
        );
    }
}
