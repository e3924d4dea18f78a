//! Initiator-side controller.

use tracing::{debug, trace};

use crate::crossing::{Synchronizer, ToggleFlag};
use crate::payload::{Payload, Ready, Valid};
use crate::slot::Slot;
use crate::sync::SyncMode;
use crate::wire::{WireReader, WireWriter};

/// State of the initiator-side controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitiatorState {
    /// Accepting a request from upstream.
    Idle,

    /// Request flag raised, waiting for the target's complete flag.
    AwaitRemote,

    /// Response latched and request flag dropped, waiting for the complete flag to drop.
    AwaitRetire,
}

/// Initiator-side half of a relay, clocked by the initiator domain.
///
/// Faces the upstream initiator as a subordinate: it accepts requests described by `S` and returns
/// responses `R`.
#[derive(Debug)]
pub struct Initiator<S: Slot, R: Payload> {
    name: &'static str,
    state: InitiatorState,
    slot: S,
    resp: Valid<R>,
    req_flag: ToggleFlag,
    req_data: WireWriter<S::Payload>,
    comp: Synchronizer,
    resp_data: WireReader<R>,
}

impl<S: Slot, R: Payload> Initiator<S, R> {
    pub(super) fn new(
        name: &'static str, req_flag: ToggleFlag, req_data: WireWriter<S::Payload>, comp: Synchronizer,
        resp_data: WireReader<R>,
    ) -> Self {
        Self {
            name,
            state: InitiatorState::Idle,
            slot: S::default(),
            resp: Valid::invalid(),
            req_flag,
            req_data,
            comp,
            resp_data,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &'static str { self.name }

    /// Current state.
    pub fn state(&self) -> InitiatorState { self.state }

    /// Synchronization mode as currently seen by this domain.
    pub fn mode(&self) -> SyncMode { self.comp.mode() }

    /// Ready signals toward upstream for the current cycle.
    ///
    /// Withheld entirely unless the controller is idle and the previous response has been taken;
    /// otherwise each sub-channel is ready while its field is still empty.
    pub fn req_ready(&self) -> S::Bwd {
        if self.is_accepting() {
            self.slot.vacancy()
        } else {
            S::Bwd::default()
        }
    }

    /// Response toward upstream for the current cycle.
    pub fn resp(&self) -> &Valid<R> { &self.resp }

    /// Whether nothing is in flight and nothing is held.
    pub fn is_idle(&self) -> bool { self.state == InitiatorState::Idle && self.slot.is_empty() && !self.resp.valid }

    fn is_accepting(&self) -> bool { self.state == InitiatorState::Idle && !self.resp.valid }

    fn transition(&mut self, next: InitiatorState) {
        debug!(channel = self.name, domain = "initiator", from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }

    /// Applies one initiator-domain clock edge.
    ///
    /// `req` and `resp_ready` are the upstream signals sampled at this edge. Everything is evaluated
    /// against the pre-edge outputs; cross-domain outputs are staged until [`Initiator::publish`].
    pub fn tick(&mut self, req: &S::Fwd, resp_ready: Ready) {
        let accepting = self.is_accepting();
        let comp = self.comp.sample();

        // The response buffer drains independently of the handshake.
        if self.resp.fire(resp_ready) {
            trace!(channel = self.name, resp = ?self.resp.inner, "response taken upstream");
            self.resp.valid = false;
        }

        match self.state {
            InitiatorState::Idle => {
                if accepting {
                    self.slot.capture(req);
                    if let Some(payload) = self.slot.complete() {
                        trace!(channel = self.name, req = ?payload, "request captured");
                        self.req_data.set(payload);
                        self.req_flag.toggle();
                        self.transition(InitiatorState::AwaitRemote);
                    }
                }
            }
            InitiatorState::AwaitRemote => {
                if comp {
                    let resp = self.resp_data.get();
                    trace!(channel = self.name, ?resp, "response latched");
                    self.resp = Valid::valid(resp);
                    self.req_flag.clear();
                    self.transition(InitiatorState::AwaitRetire);
                }
            }
            InitiatorState::AwaitRetire => {
                if !comp {
                    self.slot.clear();
                    self.transition(InitiatorState::Idle);
                }
            }
        }

        self.comp.clock();
    }

    /// Commits the outputs staged by the last [`Initiator::tick`] to the target domain.
    pub fn publish(&self) {
        self.req_data.publish();
        self.req_flag.publish();
    }

    /// Asynchronously resets this half only. The target half is not informed.
    pub fn reset(&mut self) {
        debug!(channel = self.name, domain = "initiator", state = ?self.state, "reset");
        self.state = InitiatorState::Idle;
        self.slot.clear();
        self.resp = Valid::invalid();
        self.req_data.reset();
        self.req_flag.reset();
        self.comp.reset();
    }
}
