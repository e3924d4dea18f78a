//! Bus models driving the two ports of the bridge.
//!
//! [`Driver`] plays the upstream manager and [`Responder`] the downstream subordinate. Both follow
//! the same per-edge protocol as the bridge halves: `inputs` computes what the model drives this
//! cycle from the bridge's current outputs, and `tick` records what fired at the edge.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use cdcflow::{some_or, Process, Ready, Valid};
use tracing::{debug, warn};

use crate::bridge::*;
use crate::types::*;

/// Transaction issued by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Txn {
    /// Single read.
    Read {
        /// Read address.
        addr: Addr,
    },

    /// Single write.
    Write {
        /// Write address.
        addr: Addr,
        /// Write data.
        data: WReq,
    },
}

impl Txn {
    /// Read of `addr`.
    pub fn read(addr: u64) -> Self { Self::Read { addr: Addr::new(addr) } }

    /// Write of `data` to `addr` with byte enables `strb`.
    pub fn write(addr: u64, data: u64, strb: u64) -> Self {
        Self::Write { addr: Addr::new(addr), data: WReq::new(data, strb) }
    }
}

/// Response to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// R channel beat.
    Read(RRes),
    /// B channel beat.
    Write(WRes),
}

impl Outcome {
    /// Response status.
    pub fn resp(&self) -> Resp {
        match self {
            Self::Read(r) => r.resp,
            Self::Write(b) => b.resp,
        }
    }
}

/// Transaction completed at the upstream port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Completion {
    /// The transaction.
    pub txn: Txn,
    /// Its response.
    pub outcome: Outcome,
    /// Initiator cycle at which the bridge took the last request field.
    pub accepted_at: u64,
    /// Initiator cycle at which the driver took the response.
    pub completed_at: u64,
    /// Cycles the response was held valid before the driver took it.
    pub held: u64,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    txn: Txn,
    offered_at: u64,
    addr_done: bool,
    data_done: bool,
    accepted_at: Option<u64>,
    held: u64,
}

/// Upstream manager model issuing one transaction at a time.
#[derive(Debug, Default)]
pub struct Driver {
    pending: VecDeque<Txn>,
    current: Option<InFlight>,
    w_delay: u64,
    accept_delay: u64,
    completions: Vec<Completion>,
    aborted: Vec<Txn>,
}

impl Driver {
    /// Creates a driver issuing `txns` in order.
    pub fn new(txns: impl IntoIterator<Item = Txn>) -> Self { Self { pending: txns.into_iter().collect(), ..Self::default() } }

    /// Offers W `cycles` after AW instead of together with it.
    #[must_use]
    pub fn with_w_delay(self, cycles: u64) -> Self { Self { w_delay: cycles, ..self } }

    /// Keeps response-ready low for the first `cycles` cycles a response is valid.
    #[must_use]
    pub fn with_accept_delay(self, cycles: u64) -> Self { Self { accept_delay: cycles, ..self } }

    /// Transactions completed so far, in order.
    pub fn completions(&self) -> &[Completion] { &self.completions }

    /// Transactions dropped by a reset while in flight.
    pub fn aborted(&self) -> &[Txn] { &self.aborted }

    /// Whether every queued transaction has completed or been aborted.
    pub fn is_done(&self) -> bool { self.current.is_none() && self.pending.is_empty() }

    /// Signals driven into the bridge this cycle.
    pub fn inputs(&self, out: &SlaveOut, cycle: u64) -> SlaveIn {
        let mut input = SlaveIn::default();
        let flight = some_or!(self.current.as_ref(), return input);
        let taking = flight.held >= self.accept_delay;

        match flight.txn {
            Txn::Read { addr } => {
                if !flight.addr_done {
                    input.ar = Valid::valid(addr);
                }
                input.r = Ready::new(out.r.valid && taking);
            }
            Txn::Write { addr, data } => {
                if !flight.addr_done {
                    input.aw = Valid::valid(addr);
                }
                if !flight.data_done && cycle >= flight.offered_at + self.w_delay {
                    input.w = Valid::valid(data);
                }
                input.b = Ready::new(out.b.valid && taking);
            }
        }

        input
    }

    /// Records what fired at this edge.
    pub fn tick(&mut self, out: &SlaveOut, input: &SlaveIn, cycle: u64) {
        if let Some(mut flight) = self.current.take() {
            let (response, outcome) = match flight.txn {
                Txn::Read { .. } => {
                    if input.ar.fire(out.ar) {
                        flight.addr_done = true;
                        flight.data_done = true;
                    }
                    (out.r.valid, out.r.fire(input.r).then_some(Outcome::Read(out.r.inner)))
                }
                Txn::Write { .. } => {
                    flight.addr_done |= input.aw.fire(out.aw);
                    flight.data_done |= input.w.fire(out.w);
                    (out.b.valid, out.b.fire(input.b).then_some(Outcome::Write(out.b.inner)))
                }
            };

            if flight.addr_done && flight.data_done && flight.accepted_at.is_none() {
                flight.accepted_at = Some(cycle);
            }

            match (outcome, flight.accepted_at) {
                (Some(outcome), Some(accepted_at)) => {
                    debug!(txn = ?flight.txn, ?outcome, accepted_at, completed_at = cycle, "transaction completed");
                    self.completions.push(Completion {
                        txn: flight.txn,
                        outcome,
                        accepted_at,
                        completed_at: cycle,
                        held: flight.held,
                    });
                }
                (Some(outcome), None) => {
                    warn!(txn = ?flight.txn, ?outcome, "response before request was accepted");
                    self.current = Some(flight);
                }
                (None, _) => {
                    if response {
                        flight.held += 1;
                    }
                    self.current = Some(flight);
                }
            }
        }

        if self.current.is_none() {
            if let Some(txn) = self.pending.pop_front() {
                self.current = Some(InFlight {
                    txn,
                    offered_at: cycle + 1,
                    addr_done: false,
                    data_done: false,
                    accepted_at: None,
                    held: 0,
                });
            }
        }
    }

    /// Drops the transaction in flight. Queued transactions are kept.
    pub fn reset(&mut self) {
        if let Some(flight) = self.current.take() {
            debug!(txn = ?flight.txn, "transaction aborted by reset");
            self.aborted.push(flight.txn);
        }
    }
}

/// Request observed at the downstream port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// AR beat.
    Read(Addr),
    /// AW and W beats.
    Write(Addr, WReq),
}

/// Request as recorded by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observed {
    /// The request.
    pub request: Request,
    /// Target cycle at which any of its fields first became valid.
    pub visible_at: u64,
    /// Target cycle at which its last field was taken.
    pub accepted_at: u64,
}

type Respond = Box<dyn FnMut(&Request) -> Outcome + Send>;

#[derive(Debug, Clone, Copy)]
struct Pending {
    accepted_at: u64,
    outcome: Option<Outcome>,
}

/// Downstream subordinate model.
///
/// Takes one request at a time and answers it with a response function, or never answers in silent
/// mode. Read requests win when AR and AW are presented together.
pub struct Responder {
    respond: Option<Respond>,
    latency: u64,
    aw: Option<Addr>,
    w: Option<WReq>,
    first_seen: Option<u64>,
    pending: Option<Pending>,
    observed: Vec<Observed>,
    violations: Vec<u64>,
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("silent", &self.respond.is_none())
            .field("latency", &self.latency)
            .field("pending", &self.pending)
            .field("observed", &self.observed)
            .field("violations", &self.violations)
            .finish_non_exhaustive()
    }
}

impl Responder {
    fn with(respond: Option<Respond>) -> Self {
        Self {
            respond,
            latency: 0,
            aw: None,
            w: None,
            first_seen: None,
            pending: None,
            observed: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Answers every request with `respond`.
    pub fn new(respond: impl FnMut(&Request) -> Outcome + Send + 'static) -> Self { Self::with(Some(Box::new(respond))) }

    /// Takes requests but never answers them.
    pub fn silent() -> Self { Self::with(None) }

    /// A 32-bit word memory: reads return the stored word, writes honor byte enables, both `Okay`.
    pub fn memory() -> Self {
        let mut words = HashMap::<u64, u64>::new();
        Self::new(move |request| match *request {
            Request::Read(addr) => {
                let data = words.get(&addr.addr.value()).copied().unwrap_or_default();
                Outcome::Read(RRes::new(data, Resp::Okay))
            }
            Request::Write(addr, data) => {
                let mask = (0..AXIL_STRB_WIDTH)
                    .filter(|byte| data.strb.value() >> byte & 1 == 1)
                    .fold(0u64, |mask, byte| mask | 0xff << (8 * byte));
                let word = words.entry(addr.addr.value()).or_default();
                *word = (*word & !mask) | (data.data.value() & mask);
                Outcome::Write(WRes::new(Resp::Okay))
            }
        })
    }

    /// Answers `cycles` cycles after taking a request instead of on the next cycle.
    #[must_use]
    pub fn with_latency(self, cycles: u64) -> Self { Self { latency: cycles, ..self } }

    /// Requests taken so far, in order.
    pub fn observed(&self) -> &[Observed] { &self.observed }

    /// Target cycles at which one half of a write was presented without the other.
    pub fn violations(&self) -> &[u64] { &self.violations }

    /// Whether a request has been taken and not yet answered.
    pub fn is_busy(&self) -> bool { self.pending.is_some() }

    /// Signals driven into the bridge this cycle.
    pub fn inputs(&self, out: &MasterOut, cycle: u64) -> MasterIn {
        let idle = self.pending.is_none();
        let mut input = MasterIn {
            ar: Ready::new(idle),
            aw: Ready::new(idle && !out.ar.valid && self.aw.is_none()),
            w: Ready::new(idle && !out.ar.valid && self.w.is_none()),
            ..MasterIn::default()
        };

        if let Some(pending) = self.pending {
            if cycle > pending.accepted_at + self.latency {
                match pending.outcome {
                    Some(Outcome::Read(r)) => input.r = Valid::valid(r),
                    Some(Outcome::Write(b)) => input.b = Valid::valid(b),
                    None => (),
                }
            }
        }

        input
    }

    /// Records what fired at this edge.
    pub fn tick(&mut self, out: &MasterOut, input: &MasterIn, cycle: u64) {
        if out.aw.valid != out.w.valid {
            let partner_taken = if out.aw.valid { self.w.is_some() } else { self.aw.is_some() };
            if !partner_taken {
                warn!(cycle, aw = out.aw.valid, w = out.w.valid, "write half presented alone");
                self.violations.push(cycle);
            }
        }

        if input.r.fire(out.r) || input.b.fire(out.b) {
            self.pending = None;
        }

        if self.first_seen.is_none() && (out.ar.valid || out.aw.valid || out.w.valid) {
            self.first_seen = Some(cycle);
        }

        if out.ar.fire(input.ar) {
            self.accept(Request::Read(out.ar.inner), cycle);
        }
        if out.aw.fire(input.aw) {
            self.aw = Some(out.aw.inner);
        }
        if out.w.fire(input.w) {
            self.w = Some(out.w.inner);
        }
        if let (Some(addr), Some(data)) = (self.aw, self.w) {
            self.aw = None;
            self.w = None;
            self.accept(Request::Write(addr, data), cycle);
        }
    }

    fn accept(&mut self, request: Request, cycle: u64) {
        let visible_at = self.first_seen.take().unwrap_or(cycle);
        let outcome = self.respond.as_mut().map(|respond| respond(&request));
        debug!(?request, ?outcome, visible_at, accepted_at = cycle, "request taken downstream");
        self.observed.push(Observed { request, visible_at, accepted_at: cycle });
        self.pending = Some(Pending { accepted_at: cycle, outcome });
    }

    /// Drops the request being answered and any half-taken write.
    pub fn reset(&mut self) {
        self.aw = None;
        self.w = None;
        self.first_seen = None;
        self.pending = None;
    }
}

/// Initiator-domain process: the upstream half of the bridge driven by a [`Driver`].
#[derive(Debug)]
pub struct InitiatorDomain {
    /// Upstream bridge half.
    pub bridge: AxilInitiator,
    /// Upstream manager.
    pub driver: Driver,
}

impl Process for InitiatorDomain {
    fn on_edge(&mut self, cycle: u64) {
        let out = self.bridge.outputs();
        let input = self.driver.inputs(&out, cycle);
        self.driver.tick(&out, &input, cycle);
        self.bridge.tick(&input);
    }

    fn publish(&mut self) { self.bridge.publish(); }

    fn reset(&mut self) {
        self.bridge.reset();
        self.driver.reset();
    }
}

/// Target-domain process: the downstream half of the bridge answered by a [`Responder`].
#[derive(Debug)]
pub struct TargetDomain {
    /// Downstream bridge half.
    pub bridge: AxilTarget,
    /// Downstream subordinate.
    pub responder: Responder,
}

impl Process for TargetDomain {
    fn on_edge(&mut self, cycle: u64) {
        let out = self.bridge.outputs();
        let input = self.responder.inputs(&out, cycle);
        self.responder.tick(&out, &input, cycle);
        self.bridge.tick(&input);
    }

    fn publish(&mut self) { self.bridge.publish(); }

    fn reset(&mut self) {
        self.bridge.reset();
        self.responder.reset();
    }
}

/// Builds the bridge and binds each half to its model.
pub fn domains(config: BridgeConfig, driver: Driver, responder: Responder) -> (InitiatorDomain, TargetDomain) {
    let (initiator, target) = axil_cdc(config);
    (InitiatorDomain { bridge: initiator, driver }, TargetDomain { bridge: target, responder })
}
