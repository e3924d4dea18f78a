//! Free-running domains on OS threads.
//!
//! Each domain loops at its own period on its own thread. The threads share nothing but the relay
//! wires owned by the processes, so this exercises the crossings under real, unrelated timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::clock::{Domain, Process};
use crate::error::SimError;

/// Configuration of a threaded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Time between initiator-domain edges. Zero yields instead of sleeping.
    pub initiator_period: Duration,

    /// Time between target-domain edges. Zero yields instead of sleeping.
    pub target_period: Duration,

    /// Initiator-domain edges after which the run gives up.
    pub max_cycles: u64,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self { initiator_period: Duration::from_micros(3), target_period: Duration::from_micros(7), max_cycles: 1 << 20 }
    }
}

/// Raises the stop flag when dropped, so a domain that finishes or panics always releases its peer.
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) { self.0.store(true, Ordering::Release); }
}

fn run_domain<P: Process, F: FnMut(&P) -> bool>(
    domain: Domain, process: &mut P, period: Duration, max_cycles: u64, stop: &AtomicBool, mut done: F,
) -> Result<u64, SimError> {
    let _guard = StopOnDrop(stop);

    for cycle in 0..max_cycles {
        if stop.load(Ordering::Acquire) {
            debug!(%domain, cycle, "stopped by peer");
            return Ok(cycle);
        }

        process.on_edge(cycle);
        process.publish();

        if done(process) {
            debug!(%domain, cycles = cycle + 1, "done");
            return Ok(cycle + 1);
        }

        if period.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(period);
        }
    }

    Err(SimError::Timeout { steps: max_cycles })
}

/// Runs both domains on their own threads until `done` holds for the initiator process.
///
/// The target domain runs until the initiator domain stops. Returns both processes on success.
pub fn run<I, T, F>(mut initiator: I, mut target: T, config: &ThreadConfig, done: F) -> Result<(I, T), SimError>
where
    I: Process,
    T: Process,
    F: FnMut(&I) -> bool + Send,
{
    let stop = AtomicBool::new(false);

    let (initiator_result, target_result) = thread::scope(|s| {
        let stop = &stop;
        let initiator = &mut initiator;
        let target = &mut target;

        let initiator_handle = s.spawn(move || {
            run_domain(Domain::Initiator, initiator, config.initiator_period, config.max_cycles, stop, done)
        });
        let target_handle =
            s.spawn(move || run_domain(Domain::Target, target, config.target_period, u64::MAX, stop, |_: &T| false));

        (initiator_handle.join(), target_handle.join())
    });

    let initiator_result = initiator_result.map_err(|_| SimError::DomainPanicked(Domain::Initiator))?;
    let target_result = target_result.map_err(|_| SimError::DomainPanicked(Domain::Target))?;
    let initiator_cycles = initiator_result?;
    let target_cycles = target_result?;
    debug!(initiator_cycles, target_cycles, "threaded run finished");

    Ok((initiator, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        edges: u64,
        panic_at: Option<u64>,
    }

    impl Process for Counter {
        fn on_edge(&mut self, cycle: u64) {
            if self.panic_at == Some(cycle) {
                panic!("injected failure");
            }
            self.edges += 1;
        }

        fn publish(&mut self) {}

        fn reset(&mut self) { self.edges = 0; }
    }

    fn fast() -> ThreadConfig {
        ThreadConfig { initiator_period: Duration::ZERO, target_period: Duration::ZERO, max_cycles: 1000 }
    }

    #[test]
    fn stops_when_initiator_is_done() {
        let (initiator, _) = run(Counter::default(), Counter::default(), &fast(), |c| c.edges == 10).unwrap();
        assert_eq!(initiator.edges, 10);
    }

    #[test]
    fn times_out() {
        let result = run(Counter::default(), Counter::default(), &fast(), |_| false);
        assert_eq!(result.unwrap_err(), SimError::Timeout { steps: 1000 });
    }

    #[test]
    fn reports_panicked_domain() {
        let target = Counter { edges: 0, panic_at: Some(5) };
        let result = run(Counter::default(), target, &ThreadConfig { max_cycles: u64::MAX, ..fast() }, |_| false);
        assert_eq!(result.unwrap_err(), SimError::DomainPanicked(Domain::Target));
    }
}
