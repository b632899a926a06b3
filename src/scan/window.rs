use thiserror::Error;

use crate::consensus::SiteCounts;

/// Errors raised for unusable scan parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Window width or shift is zero, or the shift exceeds the width.
    #[error("invalid window geometry: width {width}, shift {shift}")]
    InvalidGeometry {
        /// Window width.
        width: usize,
        /// Window shift.
        shift: usize,
    },

    /// Minimum region length of zero.
    #[error("minimum region length must be > 0")]
    ZeroMinLength,
}

/// Inclusive per-window maxima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowLimits {
    /// Maximum variable sites per window (`Vmax`).
    pub max_variants: u32,
    /// Maximum missing bases per window (`Nmax`).
    pub max_missing: u32,
    /// Maximum gaps per window (`Gmax`).
    pub max_gaps: u32,
}

impl WindowLimits {
    /// Whether a window with `counts` passes; every bound is inclusive.
    pub fn admits(&self, counts: &SiteCounts) -> bool {
        counts.variants <= self.max_variants
            && counts.missing <= self.max_missing
            && counts.gaps <= self.max_gaps
    }
}

/// Full scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Window width `W`.
    pub width: usize,
    /// Window shift `S` (`S <= W`).
    pub shift: usize,
    /// Window thresholds.
    pub limits: WindowLimits,
    /// Minimum emitted region length `Lmin`.
    pub min_len: usize,
}

impl ScanParams {
    /// Validate and build scan parameters.
    pub fn new(
        width: usize,
        shift: usize,
        limits: WindowLimits,
        min_len: usize,
    ) -> Result<Self, ScanError> {
        if width == 0 || shift == 0 || shift > width {
            return Err(ScanError::InvalidGeometry { width, shift });
        }
        if min_len == 0 {
            return Err(ScanError::ZeroMinLength);
        }
        Ok(Self {
            width,
            shift,
            limits,
            min_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_inclusive() {
        let limits = WindowLimits {
            max_variants: 2,
            max_missing: 1,
            max_gaps: 0,
        };
        let at = SiteCounts {
            variants: 2,
            missing: 1,
            gaps: 0,
        };
        assert!(limits.admits(&at));
        assert!(!limits.admits(&SiteCounts { variants: 3, ..at }));
        assert!(!limits.admits(&SiteCounts { missing: 2, ..at }));
        assert!(!limits.admits(&SiteCounts { gaps: 1, ..at }));
    }

    #[test]
    fn geometry_is_validated() {
        let limits = WindowLimits::default();
        assert!(ScanParams::new(20, 10, limits, 15).is_ok());
        assert!(ScanParams::new(20, 20, limits, 15).is_ok());
        assert_eq!(
            ScanParams::new(10, 20, limits, 15),
            Err(ScanError::InvalidGeometry { width: 10, shift: 20 })
        );
        assert!(ScanParams::new(0, 0, limits, 15).is_err());
        assert_eq!(ScanParams::new(20, 10, limits, 0), Err(ScanError::ZeroMinLength));
    }
}
