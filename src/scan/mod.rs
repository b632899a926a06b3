//! Sliding-window discovery of target regions on a consensus sequence.
//!
//! A fixed-width window moves along the consensus by a fixed shift. Windows
//! whose variant, missing and gap counts stay within the configured maxima
//! extend the open candidate; the first failing window closes it. Candidates
//! at least the minimum length are emitted, and scanning resumes at their end.
//!
//! The cursor logic lives in [`ScanState::advance`], a pure step function;
//! [`WindowScanner`] drives it over one locus.

mod mask;
mod scanner;
mod window;

pub use mask::SiteMasks;
pub use scanner::{scan_consensus, ScanState, TargetRegion, WindowScanner};
pub use window::{ScanError, ScanParams, WindowLimits};
