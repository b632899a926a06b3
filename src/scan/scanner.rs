use std::ops::Range;

use super::{ScanParams, SiteMasks};
use crate::consensus::SiteCounts;
use crate::store::RegionDraft;

/// A candidate stretch emitted by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRegion {
    /// Start offset (inclusive).
    pub start: usize,
    /// Stop offset (exclusive).
    pub stop: usize,
    /// Class counts over `[start, stop)`.
    pub counts: SiteCounts,
}

impl TargetRegion {
    /// Region length.
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Returns `true` for a zero-length region (never emitted).
    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Borrow the region's slice of `consensus` as an insertable draft.
    pub fn draft<'a>(&self, consensus: &'a str) -> RegionDraft<'a> {
        RegionDraft {
            start: self.start,
            stop: self.stop,
            sequence: &consensus[self.start..self.stop],
            counts: self.counts,
        }
    }
}

/// Cursor state of a window scan.
///
/// `next` is the start of the next window to classify; `[start, stop)` is the
/// open candidate (empty while `stop <= start`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Start of the next window.
    pub next: usize,
    /// Start of the open candidate.
    pub start: usize,
    /// End of the open candidate.
    pub stop: usize,
}

impl ScanState {
    /// Length of the open candidate.
    pub fn open_len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    /// Whether no window remains for a sequence of `len` positions.
    pub fn is_terminal(&self, len: usize) -> bool {
        self.next >= len
    }

    /// Fold one classified window into the state.
    ///
    /// `window_end` is the (clamped) end of the window starting at `self.next`.
    /// Returns the new state and the region closed by this step, if any.
    pub fn advance(
        self,
        window_end: usize,
        passed: bool,
        params: &ScanParams,
    ) -> (ScanState, Option<Range<usize>>) {
        if passed {
            let state = ScanState {
                next: self.next + params.shift,
                stop: window_end,
                ..self
            };
            return (state, None);
        }

        if self.open_len() > 0 && self.open_len() >= params.min_len {
            // resume at the end of the emitted region
            let state = ScanState {
                next: self.stop,
                start: self.stop,
                stop: self.stop,
            };
            return (state, Some(self.start..self.stop));
        }

        let next = self.next + params.shift;
        let state = ScanState {
            next,
            start: next,
            stop: self.stop,
        };
        (state, None)
    }

    /// Region still open once the sequence is exhausted, if long enough.
    pub fn finish(self, params: &ScanParams) -> Option<Range<usize>> {
        let len = self.open_len();
        (len > 0 && len >= params.min_len).then_some(self.start..self.stop)
    }
}

/// Single-pass window scanner bound to one consensus sequence.
///
/// Iterating the scanner yields the locus's target regions in order; regions
/// never overlap and are never shorter than the configured minimum.
#[derive(Debug)]
pub struct WindowScanner<'a> {
    consensus: &'a [u8],
    masks: SiteMasks,
    params: ScanParams,
    state: ScanState,
    finished: bool,
}

impl<'a> WindowScanner<'a> {
    /// Bind a scanner to `consensus`.
    pub fn new(consensus: &'a [u8], params: ScanParams) -> Self {
        Self {
            consensus,
            masks: SiteMasks::new(consensus),
            params,
            state: ScanState::default(),
            finished: false,
        }
    }

    /// Current cursor state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Consensus the scanner is bound to.
    pub fn consensus(&self) -> &'a [u8] {
        self.consensus
    }

    /// Classify the window starting at `self.state.next`.
    fn classify_next(&self) -> (usize, bool) {
        let start = self.state.next;
        let end = (start + self.params.width).min(self.consensus.len());
        let counts = self.masks.counts(start..end);
        (end, self.params.limits.admits(&counts))
    }

    fn region(&self, span: Range<usize>) -> TargetRegion {
        TargetRegion {
            start: span.start,
            stop: span.end,
            counts: self.masks.counts(span),
        }
    }
}

impl Iterator for WindowScanner<'_> {
    type Item = TargetRegion;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while !self.state.is_terminal(self.consensus.len()) {
            let (end, passed) = self.classify_next();
            let (state, closed) = self.state.advance(end, passed, &self.params);
            self.state = state;
            if let Some(span) = closed {
                return Some(self.region(span));
            }
        }

        self.finished = true;
        self.state.finish(&self.params).map(|span| self.region(span))
    }
}

/// Scan a whole consensus and collect its regions.
pub fn scan_consensus(consensus: &[u8], params: ScanParams) -> Vec<TargetRegion> {
    WindowScanner::new(consensus, params).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::WindowLimits;

    fn params(width: usize, shift: usize, limits: (u32, u32, u32), min_len: usize) -> ScanParams {
        ScanParams::new(
            width,
            shift,
            WindowLimits {
                max_variants: limits.0,
                max_missing: limits.1,
                max_gaps: limits.2,
            },
            min_len,
        )
        .unwrap()
    }

    #[test]
    fn clean_sequence_is_one_region() {
        let seq = vec![b'A'; 50];
        let regions = scan_consensus(&seq, params(10, 5, (0, 0, 0), 20));
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start, regions[0].stop), (0, 50));
    }

    #[test]
    fn failing_window_closes_region_and_resumes_at_its_end() {
        let mut seq = vec![b'A'; 100];
        seq[65] = b'-';
        let p = params(20, 10, (2, 1, 0), 15);

        let mut state = ScanState::default();
        let mut closed = None;
        while closed.is_none() {
            let end = (state.next + p.width).min(seq.len());
            let passed = p.limits.admits(&SiteCounts::of(&seq[state.next..end]));
            let (next_state, span) = state.advance(end, passed, &p);
            state = next_state;
            closed = span;
        }
        assert_eq!(closed, Some(0..60));
        assert_eq!(state.next, 60);
        assert_eq!(state.start, 60);

        let regions = scan_consensus(&seq, p);
        assert_eq!(
            regions.iter().map(|r| (r.start, r.stop)).collect::<Vec<_>>(),
            vec![(0, 60), (70, 100)]
        );
    }

    #[test]
    fn failing_first_window_emits_nothing() {
        let seq = b"NNNNNNNNNN";
        assert!(scan_consensus(seq, params(10, 5, (0, 0, 0), 5)).is_empty());
    }

    #[test]
    fn short_candidates_are_discarded() {
        // a clean stretch of 8 between two gap blocks
        let seq = b"----AAAAAAAA----";
        assert!(scan_consensus(seq, params(4, 4, (0, 0, 0), 9)).is_empty());
        let regions = scan_consensus(seq, params(4, 4, (0, 0, 0), 8));
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start, regions[0].stop), (4, 12));
    }

    #[test]
    fn window_past_the_end_is_clamped() {
        let seq = vec![b'C'; 23];
        let regions = scan_consensus(&seq, params(10, 10, (0, 0, 0), 5));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].stop, 23);
    }

    #[test]
    fn regions_carry_counts_and_sequence() {
        let seq = b"ACGTRACGTACGT----";
        let regions = scan_consensus(seq, params(5, 1, (1, 0, 0), 5));
        assert_eq!(regions.len(), 1);
        let region = regions[0];
        assert_eq!(region.counts.variants, 1);
        assert_eq!(region.counts.gaps, 0);
        let text = std::str::from_utf8(seq).unwrap();
        let draft = region.draft(text);
        assert_eq!(draft.sequence, &text[region.start..region.stop]);
    }

    #[test]
    fn equal_width_and_shift_terminates() {
        let seq = b"AAAAA-AAAAA-AAAAA";
        let regions = scan_consensus(seq, params(5, 5, (0, 0, 0), 5));
        for pair in regions.windows(2) {
            assert!(pair[0].stop <= pair[1].start);
        }
        assert!(regions.iter().all(|r| r.len() >= 5));
    }
}
