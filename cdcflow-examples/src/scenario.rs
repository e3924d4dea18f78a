//! Demo scenarios.

use std::time::Duration;

use cdcflow::{thread, Clock, Domain, Simulator, TargetState, ThreadConfig};
use cdcflow_axil::*;
use clap::ValueEnum;
use itertools::Itertools;
use tracing::{info, warn};

use crate::DemoError;

const MAX_STEPS: u64 = 1 << 20;

/// How the two domains are clocked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Setup {
    pub(crate) config: BridgeConfig,
    pub(crate) initiator: Clock,
    pub(crate) target: Clock,
    pub(crate) threaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Every scenario below, in order
    All,
    /// Read of 0x100 answered with 0xDEADBEEF
    Read,
    /// Write to 0x200 answered with a subordinate error
    Write,
    /// Writes and reads against a word memory
    Memory,
    /// Initiator-only reset in the middle of a read
    Reset,
}

impl Scenario {
    pub(crate) fn expand(self) -> Vec<Scenario> {
        match self {
            Self::All => vec![Self::Read, Self::Write, Self::Memory, Self::Reset],
            scenario => vec![scenario],
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Read => "read",
            Self::Write => "write",
            Self::Memory => "memory",
            Self::Reset => "reset",
        }
    }

    pub(crate) fn run(self, setup: &Setup) -> Result<(), DemoError> {
        info!(scenario = self.name(), "running");
        match self {
            Self::All => self.expand().into_iter().try_for_each(|scenario| scenario.run(setup)),
            Self::Read => {
                let driver = Driver::new([Txn::read(0x100)]).with_accept_delay(2);
                let (up, _) = execute(setup, driver, Responder::new(device))?;
                check(self, &up.driver, &[Outcome::Read(RRes::new(0xdead_beef, Resp::Okay))])
            }
            Self::Write => {
                let driver = Driver::new([Txn::write(0x200, 0x1, 0xf)]).with_w_delay(2);
                let (up, down) = execute(setup, driver, Responder::new(device))?;
                if !down.responder.violations().is_empty() {
                    return Err(DemoError::Check {
                        scenario: self.name(),
                        detail: format!("write halves split at cycles {:?}", down.responder.violations()),
                    });
                }
                check(self, &up.driver, &[Outcome::Write(WRes::new(Resp::SlvErr))])
            }
            Self::Memory => {
                let txns = (0..4u64).flat_map(|i| [Txn::write(4 * i, 0x1111_1111 * (i + 1), 0xf), Txn::read(4 * i)]);
                let (up, _) = execute(setup, Driver::new(txns), Responder::memory().with_latency(1))?;
                let expected = (0..4u64)
                    .flat_map(|i| {
                        [
                            Outcome::Write(WRes::new(Resp::Okay)),
                            Outcome::Read(RRes::new(0x1111_1111 * (i + 1), Resp::Okay)),
                        ]
                    })
                    .collect::<Vec<_>>();
                check(self, &up.driver, &expected)
            }
            Self::Reset => reset(self, setup),
        }
    }
}

/// Answers reads of 0x100 with 0xDEADBEEF and fails writes with a subordinate error.
fn device(request: &Request) -> Outcome {
    match request {
        Request::Read(addr) if addr.addr.value() == 0x100 => Outcome::Read(RRes::new(0xdead_beef, Resp::Okay)),
        Request::Read(_) => Outcome::Read(RRes::new(0, Resp::DecErr)),
        Request::Write(..) => Outcome::Write(WRes::new(Resp::SlvErr)),
    }
}

fn execute(setup: &Setup, driver: Driver, responder: Responder) -> Result<(InitiatorDomain, TargetDomain), DemoError> {
    let (up, down) = domains(setup.config, driver, responder);

    if setup.threaded {
        let config = ThreadConfig {
            initiator_period: Duration::from_micros(setup.initiator.period()),
            target_period: Duration::from_micros(setup.target.period()),
            ..ThreadConfig::default()
        };
        return Ok(thread::run(up, down, &config, |up: &InitiatorDomain| up.driver.is_done())?);
    }

    let mut sim = Simulator::new(up, down, setup.initiator, setup.target);
    let steps = sim.run_until(|up, _| up.driver.is_done(), MAX_STEPS)?;
    info!(
        steps,
        time = sim.now(),
        initiator_cycles = sim.cycles(Domain::Initiator),
        target_cycles = sim.cycles(Domain::Target),
        "simulation finished"
    );
    Ok(sim.into_parts())
}

fn check(scenario: Scenario, driver: &Driver, expected: &[Outcome]) -> Result<(), DemoError> {
    for completion in driver.completions() {
        info!(
            txn = ?completion.txn,
            outcome = ?completion.outcome,
            latency = completion.completed_at - completion.accepted_at,
            "completed"
        );
    }

    let outcomes = driver.completions().iter().map(|completion| completion.outcome).collect::<Vec<_>>();
    if outcomes != expected {
        return Err(DemoError::Check {
            scenario: scenario.name(),
            detail: format!(
                "got [{}], expected [{}]",
                outcomes.iter().map(|o| format!("{o:?}")).join(", "),
                expected.iter().map(|o| format!("{o:?}")).join(", ")
            ),
        });
    }
    Ok(())
}

/// Resets the initiator domain while the target waits on a silent subordinate. The target is left
/// waiting: reset is not coordinated across domains.
fn reset(scenario: Scenario, setup: &Setup) -> Result<(), DemoError> {
    if setup.threaded {
        warn!(scenario = scenario.name(), "needs the deterministic simulator, skipped");
        return Ok(());
    }

    let (up, down) = domains(setup.config, Driver::new([Txn::read(0x100)]), Responder::silent());
    let mut sim = Simulator::new(up, down, setup.initiator, setup.target);
    let _ = sim.run_until(|_, down| down.bridge.read.state() == TargetState::Issue, MAX_STEPS)?;

    sim.reset(Domain::Initiator);
    info!(initiator = ?sim.initiator().bridge.read.state(), target = ?sim.target().bridge.read.state(), "initiator reset");
    sim.run_cycles(Domain::Target, 100);

    let stuck = sim.target().bridge.read.state();
    if !sim.initiator().bridge.is_idle() || stuck != TargetState::Issue {
        return Err(DemoError::Check {
            scenario: scenario.name(),
            detail: format!("initiator idle: {}, target state: {stuck:?}", sim.initiator().bridge.is_idle()),
        });
    }
    warn!(state = ?stuck, "target half is still waiting after 100 cycles");
    Ok(())
}
