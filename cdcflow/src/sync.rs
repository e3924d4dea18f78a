//! Synchronization modes and synchronizer register chains.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Number of synchronizer registers instantiated per crossing. The mode selects how many are used.
pub const MAX_STAGES: usize = 2;

/// Relationship between the two clocks, which decides the synchronizer depth.
///
/// The mode is a configuration input: it is captured when a relay is built and cannot change
/// afterwards. It is itself re-synchronized through the crossing's register chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Unrelated clocks: two synchronizer stages.
    #[default]
    Async,

    /// Same frequency with a fixed phase offset: one stage.
    Mesochronous,

    /// Edge-aligned clocks: no stage, the flag is used directly.
    Isochronous,
}

impl SyncMode {
    /// All modes, from the safest to the fastest.
    pub const ALL: [SyncMode; 3] = [SyncMode::Async, SyncMode::Mesochronous, SyncMode::Isochronous];

    /// Number of destination-domain registers a flag passes through.
    pub const fn stages(self) -> usize {
        match self {
            SyncMode::Async => 2,
            SyncMode::Mesochronous => 1,
            SyncMode::Isochronous => 0,
        }
    }

    /// Decodes the 2-bit mode selector.
    ///
    /// `0b00` is asynchronous, `0b01` and `0b10` are both mesochronous, `0b11` is isochronous.
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            0b00 => Ok(SyncMode::Async),
            0b01 | 0b10 => Ok(SyncMode::Mesochronous),
            0b11 => Ok(SyncMode::Isochronous),
            _ => Err(ConfigError::InvalidSyncModeBits(bits)),
        }
    }

    /// Canonical 2-bit encoding.
    pub const fn bits(self) -> u8 {
        match self {
            SyncMode::Async => 0b00,
            SyncMode::Mesochronous => 0b01,
            SyncMode::Isochronous => 0b11,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncMode::Async => "async",
            SyncMode::Mesochronous => "mesochronous",
            SyncMode::Isochronous => "isochronous",
        };
        f.write_str(name)
    }
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "async" | "asynchronous" => Ok(SyncMode::Async),
            "meso" | "mesochronous" => Ok(SyncMode::Mesochronous),
            "iso" | "isochronous" => Ok(SyncMode::Isochronous),
            _ => Err(ConfigError::UnknownSyncMode(s.to_string())),
        }
    }
}

/// Register chain of `N` stages clocked by the destination domain.
#[derive(Debug, Clone)]
pub struct DelayLine<T, const N: usize> {
    stages: [T; N],
    init: T,
}

impl<T: Copy, const N: usize> DelayLine<T, N> {
    /// Creates a delay line whose registers reset to `init`.
    pub fn new(init: T) -> Self { Self { stages: [init; N], init } }

    /// Returns `input` itself for depth 0, and the output of register `depth` otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `depth > N`.
    pub fn tap(&self, input: T, depth: usize) -> T {
        assert!(depth <= N, "delay line has only {} stages, tapped at {}", N, depth);
        match depth {
            0 => input,
            depth => self.stages[depth - 1],
        }
    }

    /// Output of the last register, or `init` for an empty line.
    pub fn last(&self) -> T { self.stages.last().copied().unwrap_or(self.init) }

    /// Clocks the chain once, shifting `input` into the first register.
    pub fn shift(&mut self, input: T) {
        if N > 0 {
            self.stages.copy_within(0..N - 1, 1);
            self.stages[0] = input;
        }
    }

    /// Resets every register.
    pub fn clear(&mut self) { self.stages = [self.init; N]; }

    /// Register contents, first stage first.
    pub fn stages(&self) -> &[T; N] { &self.stages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_encodings() {
        assert_eq!(SyncMode::from_bits(0b00), Ok(SyncMode::Async));
        assert_eq!(SyncMode::from_bits(0b01), Ok(SyncMode::Mesochronous));
        assert_eq!(SyncMode::from_bits(0b10), Ok(SyncMode::Mesochronous));
        assert_eq!(SyncMode::from_bits(0b11), Ok(SyncMode::Isochronous));
        assert_eq!(SyncMode::from_bits(0b100), Err(ConfigError::InvalidSyncModeBits(0b100)));
        for mode in SyncMode::ALL {
            assert_eq!(SyncMode::from_bits(mode.bits()), Ok(mode));
            assert_eq!(mode.to_string().parse::<SyncMode>(), Ok(mode));
        }
    }

    #[test]
    fn mode_names() {
        assert_eq!("meso".parse::<SyncMode>(), Ok(SyncMode::Mesochronous));
        assert_eq!("ISO".parse::<SyncMode>(), Ok(SyncMode::Isochronous));
        assert!(matches!("plesio".parse::<SyncMode>(), Err(ConfigError::UnknownSyncMode(_))));
        assert_eq!(SyncMode::default().stages(), 2);
    }

    #[test]
    fn delay_line_shifts_one_stage_per_clock() {
        let mut line = DelayLine::<bool, 2>::new(false);
        assert!(line.tap(true, 0));
        assert!(!line.tap(true, 1));

        line.shift(true);
        assert_eq!(line.stages(), &[true, false]);
        assert!(line.tap(false, 1));
        assert!(!line.tap(false, 2));

        line.shift(false);
        assert_eq!(line.stages(), &[false, true]);
        assert!(line.last());

        line.clear();
        assert_eq!(line.stages(), &[false, false]);
    }

    #[test]
    #[should_panic]
    fn delay_line_rejects_deep_tap() {
        let line = DelayLine::<bool, 1>::new(false);
        let _ = line.tap(false, 2);
    }
}
