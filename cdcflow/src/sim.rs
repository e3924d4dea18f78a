//! Deterministic two-clock simulator.

use arrayvec::ArrayVec;
use tracing::trace;

use crate::clock::{Clock, Domain, Process};
use crate::error::SimError;
use crate::some_or;

/// Event-driven scheduler of the initiator and target domains.
///
/// Time advances from one rising edge to the next. Every domain with an edge at that instant is
/// evaluated, then all of them publish.
#[derive(Debug)]
pub struct Simulator<I, T> {
    initiator: I,
    target: T,
    clocks: [Clock; 2],
    cycles: [u64; 2],
    now: u64,
}

impl<I: Process, T: Process> Simulator<I, T> {
    /// Creates a new simulator. No edge has happened yet.
    pub fn new(initiator: I, target: T, initiator_clock: Clock, target_clock: Clock) -> Self {
        Self { initiator, target, clocks: [initiator_clock, target_clock], cycles: [0; 2], now: 0 }
    }

    /// Initiator-domain process.
    pub fn initiator(&self) -> &I { &self.initiator }

    /// Initiator-domain process, mutably.
    pub fn initiator_mut(&mut self) -> &mut I { &mut self.initiator }

    /// Target-domain process.
    pub fn target(&self) -> &T { &self.target }

    /// Target-domain process, mutably.
    pub fn target_mut(&mut self) -> &mut T { &mut self.target }

    /// Consumes the simulator, returning both processes.
    pub fn into_parts(self) -> (I, T) { (self.initiator, self.target) }

    /// Time of the last edge.
    pub fn now(&self) -> u64 { self.now }

    /// Number of edges `domain` has seen.
    pub fn cycles(&self, domain: Domain) -> u64 { self.cycles[domain.index()] }

    fn next_edge(&self, domain: Domain) -> u64 { self.clocks[domain.index()].edge(self.cycles[domain.index()]) }

    /// Advances to the next edge instant, returning the domains clocked at it.
    pub fn step(&mut self) -> ArrayVec<Domain, 2> {
        let now = some_or!(Domain::ALL.iter().map(|&domain| self.next_edge(domain)).min(), return ArrayVec::new());
        let edges = Domain::ALL.into_iter().filter(|&domain| self.next_edge(domain) == now).collect::<ArrayVec<_, 2>>();

        trace!(time = now, ?edges, "edge");
        for &domain in &edges {
            let cycle = self.cycles[domain.index()];
            match domain {
                Domain::Initiator => self.initiator.on_edge(cycle),
                Domain::Target => self.target.on_edge(cycle),
            }
        }
        for &domain in &edges {
            match domain {
                Domain::Initiator => self.initiator.publish(),
                Domain::Target => self.target.publish(),
            }
            self.cycles[domain.index()] += 1;
        }

        self.now = now;
        edges
    }

    /// Advances until `domain` has seen `cycles` more edges.
    pub fn run_cycles(&mut self, domain: Domain, cycles: u64) {
        let until = self.cycles(domain) + cycles;
        while self.cycles(domain) < until {
            let _ = self.step();
        }
    }

    /// Steps until `done` holds, at most `max_steps` times. Returns the number of steps taken.
    pub fn run_until<F>(&mut self, mut done: F, max_steps: u64) -> Result<u64, SimError>
    where F: FnMut(&I, &T) -> bool {
        for steps in 0..max_steps {
            if done(&self.initiator, &self.target) {
                return Ok(steps);
            }
            let _ = self.step();
        }

        if done(&self.initiator, &self.target) {
            Ok(max_steps)
        } else {
            Err(SimError::Timeout { steps: max_steps })
        }
    }

    /// Asserts the reset of `domain` alone, between edges.
    pub fn reset(&mut self, domain: Domain) {
        match domain {
            Domain::Initiator => self.initiator.reset(),
            Domain::Target => self.target.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the global order of edges.
    #[derive(Debug, Default)]
    struct Recorder {
        edges: Vec<u64>,
        published: usize,
        resets: usize,
    }

    impl Process for Recorder {
        fn on_edge(&mut self, cycle: u64) { self.edges.push(cycle); }

        fn publish(&mut self) { self.published += 1; }

        fn reset(&mut self) { self.resets += 1; }
    }

    #[test]
    fn interleaves_by_period() {
        let mut sim =
            Simulator::new(Recorder::default(), Recorder::default(), Clock::new(2, 0).unwrap(), Clock::new(3, 0).unwrap());

        // Both clocks rise at t = 0.
        assert_eq!(sim.step().as_slice(), &[Domain::Initiator, Domain::Target]);
        assert_eq!(sim.step().as_slice(), &[Domain::Initiator]);
        assert_eq!(sim.now(), 2);
        assert_eq!(sim.step().as_slice(), &[Domain::Target]);
        assert_eq!(sim.now(), 3);

        sim.run_cycles(Domain::Initiator, 4);
        assert_eq!(sim.cycles(Domain::Initiator), 6);
        assert_eq!(sim.initiator().edges, (0..6).collect::<Vec<_>>());
        assert_eq!(sim.initiator().published, 6);
    }

    #[test]
    fn run_until_times_out() {
        let mut sim =
            Simulator::new(Recorder::default(), Recorder::default(), Clock::new(1, 0).unwrap(), Clock::new(1, 0).unwrap());
        assert_eq!(sim.run_until(|i, _| i.edges.len() == 3, 10), Ok(3));
        assert_eq!(sim.run_until(|_, _| false, 5), Err(SimError::Timeout { steps: 5 }));
    }

    #[test]
    fn reset_targets_one_domain() {
        let mut sim =
            Simulator::new(Recorder::default(), Recorder::default(), Clock::new(1, 0).unwrap(), Clock::new(1, 0).unwrap());
        sim.reset(Domain::Target);
        let (initiator, target) = sim.into_parts();
        assert_eq!((initiator.resets, target.resets), (0, 1));
    }
}
