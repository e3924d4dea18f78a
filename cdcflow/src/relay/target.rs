//! Target-side controller.

use tracing::{debug, trace};

use crate::crossing::{Synchronizer, ToggleFlag};
use crate::payload::{Payload, Ready, Valid};
use crate::slot::Slot;
use crate::sync::SyncMode;
use crate::wire::{WireReader, WireWriter};

/// State of the target-side controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    /// Waiting for the initiator's request flag.
    Idle,

    /// Request forwarded downstream, waiting for the response.
    Issue,

    /// Complete flag raised, waiting for the request flag to drop.
    AwaitRetire,
}

/// Target-side half of a relay, clocked by the target domain.
///
/// Faces the downstream target as a manager: it issues the forwarded request and collects the
/// response.
#[derive(Debug)]
pub struct Target<S: Slot, R: Payload> {
    name: &'static str,
    state: TargetState,
    slot: S,
    req: Synchronizer,
    req_data: WireReader<S::Payload>,
    comp_flag: ToggleFlag,
    resp_data: WireWriter<R>,
}

impl<S: Slot, R: Payload> Target<S, R> {
    pub(super) fn new(
        name: &'static str, req: Synchronizer, req_data: WireReader<S::Payload>, comp_flag: ToggleFlag,
        resp_data: WireWriter<R>,
    ) -> Self {
        Self { name, state: TargetState::Idle, slot: S::default(), req, req_data, comp_flag, resp_data }
    }

    /// Channel name.
    pub fn name(&self) -> &'static str { self.name }

    /// Current state.
    pub fn state(&self) -> TargetState { self.state }

    /// Synchronization mode as currently seen by this domain.
    pub fn mode(&self) -> SyncMode { self.req.mode() }

    /// Request toward downstream for the current cycle.
    ///
    /// Each sub-channel stays valid until downstream accepts it, whatever the controller does.
    pub fn req(&self) -> S::Fwd { self.slot.present() }

    /// Ready toward downstream's response for the current cycle.
    pub fn resp_ready(&self) -> Ready { Ready::new(self.state == TargetState::Issue) }

    fn transition(&mut self, next: TargetState) {
        debug!(channel = self.name, domain = "target", from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }

    /// Applies one target-domain clock edge.
    ///
    /// `req_ready` and `resp` are the downstream signals sampled at this edge.
    pub fn tick(&mut self, req_ready: S::Bwd, resp: &Valid<R>) {
        let req = self.req.sample();
        let resp_ready = self.resp_ready();

        self.slot.retire(req_ready);

        match self.state {
            TargetState::Idle => {
                if req {
                    let payload = self.req_data.get();
                    trace!(channel = self.name, req = ?payload, "request forwarded");
                    self.slot.load(payload);
                    self.transition(TargetState::Issue);
                }
            }
            TargetState::Issue => {
                if resp.fire(resp_ready) {
                    trace!(channel = self.name, resp = ?resp.inner, "response collected");
                    self.resp_data.set(resp.inner.clone());
                    self.comp_flag.toggle();
                    self.transition(TargetState::AwaitRetire);
                }
            }
            TargetState::AwaitRetire => {
                if !req {
                    self.comp_flag.clear();
                    self.transition(TargetState::Idle);
                }
            }
        }

        self.req.clock();
    }

    /// Commits the outputs staged by the last [`Target::tick`] to the initiator domain.
    pub fn publish(&self) {
        self.resp_data.publish();
        self.comp_flag.publish();
    }

    /// Asynchronously resets this half only. The initiator half is not informed.
    pub fn reset(&mut self) {
        debug!(channel = self.name, domain = "target", state = ?self.state, "reset");
        self.state = TargetState::Idle;
        self.slot.clear();
        self.resp_data.reset();
        self.comp_flag.reset();
        self.req.reset();
    }
}
