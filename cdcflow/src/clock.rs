//! Clock domains and the processes they drive.

use std::fmt;

use crate::error::ConfigError;

/// One of the two clock domains a bridge spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    /// Domain of the upstream initiator and the initiator-side controllers.
    Initiator,

    /// Domain of the downstream target and the target-side controllers.
    Target,
}

impl Domain {
    /// Both domains.
    pub const ALL: [Domain; 2] = [Domain::Initiator, Domain::Target];

    /// Index of the domain in per-domain arrays.
    pub const fn index(self) -> usize {
        match self {
            Domain::Initiator => 0,
            Domain::Target => 1,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Initiator => f.write_str("initiator"),
            Domain::Target => f.write_str("target"),
        }
    }
}

/// Periodic rising edges in abstract time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Clock {
    period: u64,
    phase: u64,
}

impl Clock {
    /// Creates a clock with its first rising edge at `phase`.
    pub fn new(period: u64, phase: u64) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(Self { period, phase })
    }

    /// Period.
    pub fn period(&self) -> u64 { self.period }

    /// Time of the first rising edge.
    pub fn phase(&self) -> u64 { self.phase }

    /// Time of the `cycle`-th rising edge, counting from zero. Saturates at `u64::MAX`.
    pub fn edge(&self, cycle: u64) -> u64 { self.phase.saturating_add(cycle.saturating_mul(self.period)) }
}

/// Everything clocked by one domain.
///
/// A process owns the domain's relay halves and whatever models drive them. Each rising edge is
/// split in two: `on_edge` samples inputs and computes the next register values, `publish` makes the
/// registers observed by the other domain take them. When both domains have an edge at the same
/// instant, both are evaluated before either publishes.
pub trait Process: Send {
    /// Evaluates one rising edge. `cycle` counts this domain's edges from zero.
    fn on_edge(&mut self, cycle: u64);

    /// Commits cross-domain outputs staged by the last `on_edge`.
    fn publish(&mut self);

    /// Asserts this domain's reset.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(Clock::new(0, 0), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn edges_are_periodic() {
        let clock = Clock::new(10, 3).unwrap();
        assert_eq!(clock.edge(0), 3);
        assert_eq!(clock.edge(4), 43);
        assert_eq!(Domain::Target.to_string(), "target");
        assert_eq!(Domain::ALL.map(Domain::index), [0, 1]);
    }

    #[test]
    fn far_edges_saturate() {
        let clock = Clock::new(u64::MAX / 2, 7).unwrap();
        assert_eq!(clock.edge(1), u64::MAX / 2 + 7);
        assert_eq!(clock.edge(3), u64::MAX);
        assert_eq!(Clock::new(u64::MAX, u64::MAX).unwrap().edge(1), u64::MAX);
    }
}
