//! Toggle-flag crossing.
//!
//! One domain owns a single flag bit and flips it once per event; the other domain observes it
//! through a synchronizer. This is the only signal path between domains: payload registers are read
//! by the observer only after the flag says the owner has committed to them.

use crate::sync::{DelayLine, SyncMode, MAX_STAGES};
use crate::wire::{wire, WireReader, WireWriter};

/// Creates a crossing: the owner-side flag and the observer-side synchronizer.
///
/// `mode` is the configured synchronization mode. It is captured here and cannot change afterwards.
pub fn crossing(mode: SyncMode) -> (ToggleFlag, Synchronizer) {
    let (flag, reader) = wire(false);
    (ToggleFlag { flag }, Synchronizer::new(reader, mode))
}

/// Owner side of a crossing.
#[derive(Debug)]
pub struct ToggleFlag {
    flag: WireWriter<bool>,
}

impl ToggleFlag {
    /// Current (staged) value of the flag.
    pub fn get(&self) -> bool { *self.flag.get() }

    /// Flips the flag, signalling one event.
    pub fn toggle(&mut self) {
        let next = !self.get();
        self.flag.set(next);
    }

    /// Drives the flag low.
    pub fn clear(&mut self) { self.flag.set(false); }

    /// Commits the flag at the end of the owner's clock edge.
    pub fn publish(&self) { self.flag.publish(); }

    /// Asynchronously clears the flag.
    pub fn reset(&mut self) { self.flag.reset(); }
}

/// Observer side of a crossing.
///
/// Holds two register chains of identical depth, one for the flag and one for the mode. The mode
/// chain resets to [`SyncMode::Async`], so until the configured mode has propagated through it the
/// flag is taken from the deepest stage.
#[derive(Debug)]
pub struct Synchronizer {
    flag: WireReader<bool>,
    mode: SyncMode,
    flag_line: DelayLine<bool, MAX_STAGES>,
    mode_line: DelayLine<SyncMode, MAX_STAGES>,
}

impl Synchronizer {
    fn new(flag: WireReader<bool>, mode: SyncMode) -> Self {
        Self { flag, mode, flag_line: DelayLine::new(false), mode_line: DelayLine::new(SyncMode::Async) }
    }

    /// Mode as seen through the mode chain.
    pub fn mode(&self) -> SyncMode { self.mode_line.last() }

    /// Synchronized view of the flag for the current edge.
    pub fn sample(&self) -> bool { self.flag_line.tap(self.flag.get(), self.mode().stages()) }

    /// Clocks both register chains once. Call after sampling, at every observer edge.
    pub fn clock(&mut self) {
        self.flag_line.shift(self.flag.get());
        self.mode_line.shift(self.mode);
    }

    /// Asynchronously clears both register chains.
    pub fn reset(&mut self) {
        self.flag_line.clear();
        self.mode_line.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clocks `sync` until its mode chain has settled.
    fn settle(sync: &mut Synchronizer) {
        for _ in 0..MAX_STAGES {
            sync.clock();
        }
    }

    /// Number of observer edges between publishing a toggle and sampling it.
    fn latency(mode: SyncMode) -> usize {
        let (mut flag, mut sync) = crossing(mode);
        settle(&mut sync);
        assert_eq!(sync.mode(), mode);

        flag.toggle();
        flag.publish();
        let mut edges = 0;
        while !sync.sample() {
            sync.clock();
            edges += 1;
        }
        edges
    }

    #[test]
    fn latency_follows_mode() {
        assert_eq!(latency(SyncMode::Isochronous), 0);
        assert_eq!(latency(SyncMode::Mesochronous), 1);
        assert_eq!(latency(SyncMode::Async), 2);
    }

    #[test]
    fn staged_toggle_is_not_observed() {
        let (mut flag, mut sync) = crossing(SyncMode::Isochronous);
        settle(&mut sync);
        flag.toggle();
        assert!(flag.get());
        assert!(!sync.sample());
        flag.publish();
        assert!(sync.sample());
    }

    #[test]
    fn mode_chain_starts_async() {
        let (mut flag, mut sync) = crossing(SyncMode::Isochronous);
        assert_eq!(sync.mode(), SyncMode::Async);

        flag.toggle();
        flag.publish();
        assert!(!sync.sample());
        sync.clock();
        sync.clock();
        assert_eq!(sync.mode(), SyncMode::Isochronous);
        assert!(sync.sample());

        sync.reset();
        assert_eq!(sync.mode(), SyncMode::Async);
    }

    #[test]
    fn owner_reset_clears_flag() {
        let (mut flag, sync) = crossing(SyncMode::Isochronous);
        flag.toggle();
        flag.publish();
        flag.reset();
        assert!(!flag.get());
        assert!(!sync.flag.get());
    }
}
