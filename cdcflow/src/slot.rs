//! Single-slot request registers.
//!
//! A slot holds the one request a relay may have in flight. It knows which sub-channels the request
//! travels on and when enough of them are valid for the relay to advance. The initiator side fills
//! it from upstream (`vacancy`, `capture`, `complete`), the target side empties it downstream
//! (`load`, `present`, `retire`).

use std::fmt::Debug;

use crate::payload::{Payload, Ready, Valid};

/// Request register of a relay, generic over the shape of the request.
pub trait Slot: 'static + Debug + Default + Send {
    /// The joined request payload crossing the domains.
    type Payload: Payload;

    /// Forward signals of the sub-channels.
    type Fwd: Clone + Debug + Default + PartialEq + Send;

    /// Backward signals of the sub-channels. The default value is "not ready" on every sub-channel.
    type Bwd: Copy + Debug + Default + PartialEq + Send;

    /// Ready signals while accepting: a sub-channel is ready while its field is empty.
    fn vacancy(&self) -> Self::Bwd;

    /// Captures every offered field whose sub-channel fires against `vacancy`.
    fn capture(&mut self, fwd: &Self::Fwd);

    /// The joined payload, once every field has been captured.
    fn complete(&self) -> Option<Self::Payload>;

    /// Loads `payload` with every sub-channel valid in the same cycle.
    fn load(&mut self, payload: Self::Payload);

    /// Forward signals presented downstream.
    fn present(&self) -> Self::Fwd;

    /// Drops the fields whose sub-channel fires against `bwd`.
    fn retire(&mut self, bwd: Self::Bwd);

    /// Whether no field is held.
    fn is_empty(&self) -> bool;

    /// Drops every field.
    fn clear(&mut self) { *self = Self::default(); }
}

/// Request carried on a single sub-channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Single<P: Payload> {
    reg: Valid<P>,
}

impl<P: Payload> Slot for Single<P> {
    type Bwd = Ready;
    type Fwd = Valid<P>;
    type Payload = P;

    fn vacancy(&self) -> Ready { Ready::new(!self.reg.valid) }

    fn capture(&mut self, fwd: &Valid<P>) {
        if fwd.fire(self.vacancy()) {
            self.reg = fwd.clone();
        }
    }

    fn complete(&self) -> Option<P> { self.reg.as_option().cloned() }

    fn load(&mut self, payload: P) { self.reg = Valid::valid(payload); }

    fn present(&self) -> Valid<P> { self.reg.clone() }

    fn retire(&mut self, bwd: Ready) {
        if self.reg.fire(bwd) {
            self.reg.valid = false;
        }
    }

    fn is_empty(&self) -> bool { !self.reg.valid }
}

/// Request carried on two independently arriving sub-channels.
///
/// The request is complete only when both fields are held, and is presented downstream with both
/// fields valid in the same cycle, so neither half is ever forwarded without the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pair<A: Payload, B: Payload> {
    first: Valid<A>,
    second: Valid<B>,
}

impl<A: Payload, B: Payload> Slot for Pair<A, B> {
    type Bwd = (Ready, Ready);
    type Fwd = (Valid<A>, Valid<B>);
    type Payload = (A, B);

    fn vacancy(&self) -> (Ready, Ready) { (Ready::new(!self.first.valid), Ready::new(!self.second.valid)) }

    fn capture(&mut self, fwd: &(Valid<A>, Valid<B>)) {
        let (first_ready, second_ready) = self.vacancy();
        if fwd.0.fire(first_ready) {
            self.first = fwd.0.clone();
        }
        if fwd.1.fire(second_ready) {
            self.second = fwd.1.clone();
        }
    }

    fn complete(&self) -> Option<(A, B)> {
        match (self.first.as_option(), self.second.as_option()) {
            (Some(first), Some(second)) => Some((first.clone(), second.clone())),
            _ => None,
        }
    }

    fn load(&mut self, (first, second): (A, B)) {
        self.first = Valid::valid(first);
        self.second = Valid::valid(second);
    }

    fn present(&self) -> (Valid<A>, Valid<B>) { (self.first.clone(), self.second.clone()) }

    fn retire(&mut self, (first_ready, second_ready): (Ready, Ready)) {
        if self.first.fire(first_ready) {
            self.first.valid = false;
        }
        if self.second.fire(second_ready) {
            self.second.valid = false;
        }
    }

    fn is_empty(&self) -> bool { !self.first.valid && !self.second.valid }
}
