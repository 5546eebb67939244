//! One scanline's worth of video samples.

/// Allocated sample slots per scanline.
pub const SCANLINE_CAPACITY: usize = 4096;

/// The scanline loop stops once a line holds this many samples, leaving
/// headroom below [`SCANLINE_CAPACITY`] for the instruction that crossed it.
pub const MAX_SAMPLES: usize = 4000;

/// What ended a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncKind {
    /// Still running, or stopped without a sync.
    #[default]
    None,
    /// Horizontal sync from the ULA's own line timer.
    Horizontal,
    /// The program switched the HSYNC generator back on after a pulse.
    Vertical,
}

/// Samples for one call of the scanline loop.
///
/// Samples are palette indices, two per T-state. The buffer is reused from
/// call to call; the sync fields survive a call that stopped without a sync
/// so that a long vertical pulse can span several calls.
#[derive(Debug, Clone)]
pub struct Scanline {
    samples: Vec<u8>,
    /// Length of the sync pulse seen so far, in T-states.
    sync_len: u32,
    sync_valid: SyncKind,
}

impl Scanline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(SCANLINE_CAPACITY),
            sync_len: 0,
            sync_valid: SyncKind::None,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append one sample.
    pub fn push(&mut self, colour: u8) {
        debug_assert!(
            self.samples.len() < SCANLINE_CAPACITY,
            "scanline buffer overflow"
        );
        if self.samples.len() < SCANLINE_CAPACITY {
            self.samples.push(colour);
        }
    }

    /// Append `count` samples of the same colour.
    pub fn fill(&mut self, colour: u8, count: usize) {
        for _ in 0..count {
            self.push(colour);
        }
    }

    /// Drop samples beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }

    /// Drop all samples, keeping the sync state.
    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn sync_len(&self) -> u32 {
        self.sync_len
    }

    pub fn set_sync_len(&mut self, tstates: u32) {
        self.sync_len = tstates;
    }

    pub fn add_sync_len(&mut self, tstates: u32) {
        self.sync_len = self.sync_len.saturating_add(tstates);
    }

    #[must_use]
    pub fn sync_valid(&self) -> SyncKind {
        self.sync_valid
    }

    pub fn set_sync_valid(&mut self, kind: SyncKind) {
        self.sync_valid = kind;
    }

    /// True once a sync pulse has ended this line.
    #[must_use]
    pub fn has_sync(&self) -> bool {
        self.sync_valid != SyncKind::None
    }

    /// Forget the sync pulse that ended the previous line.
    pub fn reset_sync(&mut self) {
        self.sync_len = 0;
        self.sync_valid = SyncKind::None;
    }
}

impl Default for Scanline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_truncate() {
        let mut line = Scanline::new();
        line.fill(1, 10);
        assert_eq!(line.len(), 10);
        line.truncate(4);
        assert_eq!(line.samples(), &[1, 1, 1, 1]);
    }

    #[test]
    fn clear_keeps_sync() {
        let mut line = Scanline::new();
        line.push(0);
        line.add_sync_len(400);
        line.set_sync_valid(SyncKind::Vertical);
        line.clear_samples();
        assert!(line.is_empty());
        assert_eq!(line.sync_len(), 400);
        assert!(line.has_sync());

        line.reset_sync();
        assert_eq!(line.sync_len(), 0);
        assert_eq!(line.sync_valid(), SyncKind::None);
    }

    #[test]
    fn capacity_leaves_headroom() {
        let line = Scanline::new();
        assert!(line.samples.capacity() >= SCANLINE_CAPACITY);
        assert!(MAX_SAMPLES < SCANLINE_CAPACITY);
    }
}
