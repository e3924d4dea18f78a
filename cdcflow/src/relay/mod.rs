//! Single-slot cross-domain relay.
//!
//! A relay carries one request from the initiator domain to the target domain and one response
//! back, using two toggle-flag crossings:
//!
//! ```text
//! initiator ---- req flag / req payload ----> target
//! initiator <-- comp flag / resp payload ---- target
//! ```
//!
//! Both flags follow a four-phase handshake: the initiator raises `req`, the target raises `comp`,
//! the initiator drops `req`, the target drops `comp`. Each payload register is written only while
//! its owner's flag is low, and read by the peer only while that flag is observed high.

mod initiator;
mod target;

use tracing::debug;

pub use initiator::{Initiator, InitiatorState};
pub use target::{Target, TargetState};

use crate::crossing::crossing;
use crate::payload::Payload;
use crate::slot::Slot;
use crate::sync::SyncMode;
use crate::wire::wire;

/// Creates a relay channel named `name`, returning its initiator-side and target-side halves.
///
/// `S` is the request shape and `R` the response payload. Both crossings use `mode`.
pub fn relay<S: Slot, R: Payload>(name: &'static str, mode: SyncMode) -> (Initiator<S, R>, Target<S, R>) {
    let (req_flag, req_sync) = crossing(mode);
    let (comp_flag, comp_sync) = crossing(mode);
    let (req_data, req_data_reader) = wire(S::Payload::default());
    let (resp_data, resp_data_reader) = wire(R::default());

    debug!(channel = name, %mode, req_width = S::Payload::WIDTH, resp_width = R::WIDTH, "relay built");

    (
        Initiator::new(name, req_flag, req_data, comp_sync, resp_data_reader),
        Target::new(name, req_sync, req_data_reader, comp_flag, resp_data),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Ready, Valid};
    use crate::slot::{Pair, Single};

    /// Advances both halves by one simultaneous edge with the given bus inputs.
    fn edge<S: Slot, R: Payload>(
        initiator: &mut Initiator<S, R>, target: &mut Target<S, R>, req: &S::Fwd, resp_ready: Ready,
        req_ready: S::Bwd, resp: &Valid<R>,
    ) {
        initiator.tick(req, resp_ready);
        target.tick(req_ready, resp);
        initiator.publish();
        target.publish();
    }

    #[test]
    fn read_round_trip_lockstep() {
        let (mut ini, mut tgt) = relay::<Single<u32>, u64>("read", SyncMode::Async);
        let idle = Valid::invalid();

        // Let the mode chains settle.
        for _ in 0..2 {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), Ready::new(true), &Valid::invalid());
        }
        assert_eq!(ini.mode(), SyncMode::Async);
        assert_eq!(ini.req_ready(), Ready::new(true));

        edge(&mut ini, &mut tgt, &Valid::valid(0x100), Ready::new(true), Ready::new(true), &Valid::invalid());
        assert_eq!(ini.state(), InitiatorState::AwaitRemote);
        assert_eq!(ini.req_ready(), Ready::new(false));

        let mut edges = 0;
        while !tgt.req().valid {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), Ready::new(false), &Valid::invalid());
            edges += 1;
        }
        // One edge to copy the payload after two synchronizer stages.
        assert_eq!(edges, 3);
        assert_eq!(tgt.req().inner, 0x100);
        assert_eq!(tgt.state(), TargetState::Issue);
        assert_eq!(tgt.resp_ready(), Ready::new(true));

        // Downstream accepts and answers in the same edge.
        edge(&mut ini, &mut tgt, &idle, Ready::new(false), Ready::new(true), &Valid::valid(0xdead_beef));
        assert_eq!(tgt.state(), TargetState::AwaitRetire);
        assert!(!tgt.req().valid);

        while !ini.resp().valid {
            edge(&mut ini, &mut tgt, &idle, Ready::new(false), Ready::new(false), &Valid::invalid());
        }
        assert_eq!(ini.resp().inner, 0xdead_beef);
        assert_eq!(ini.state(), InitiatorState::AwaitRetire);

        // The response is held while upstream is not ready, even after the round trip retires.
        for _ in 0..8 {
            edge(&mut ini, &mut tgt, &idle, Ready::new(false), Ready::new(false), &Valid::invalid());
        }
        assert_eq!(ini.state(), InitiatorState::Idle);
        assert_eq!(tgt.state(), TargetState::Idle);
        assert!(ini.resp().valid);
        assert_eq!(ini.req_ready(), Ready::new(false));

        edge(&mut ini, &mut tgt, &idle, Ready::new(true), Ready::new(false), &Valid::invalid());
        assert!(!ini.resp().valid);
        assert!(ini.is_idle());
        assert_eq!(ini.req_ready(), Ready::new(true));
    }

    #[test]
    fn pair_advances_only_when_both_fields_arrive() {
        let (mut ini, mut tgt) = relay::<Pair<u32, u8>, u8>("write", SyncMode::Isochronous);
        let no_ready = (Ready::new(false), Ready::new(false));
        let idle = (Valid::invalid(), Valid::invalid());
        for _ in 0..2 {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), no_ready, &Valid::invalid());
        }

        edge(&mut ini, &mut tgt, &(Valid::valid(0x200), Valid::invalid()), Ready::new(true), no_ready, &Valid::invalid());
        assert_eq!(ini.state(), InitiatorState::Idle);
        assert_eq!(ini.req_ready(), (Ready::new(false), Ready::new(true)));

        for _ in 0..4 {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), no_ready, &Valid::invalid());
            assert_eq!(tgt.state(), TargetState::Idle);
            let (addr, data) = tgt.req();
            assert!(!addr.valid && !data.valid);
        }

        edge(&mut ini, &mut tgt, &(Valid::invalid(), Valid::valid(0x1)), Ready::new(true), no_ready, &Valid::invalid());
        assert_eq!(ini.state(), InitiatorState::AwaitRemote);

        edge(&mut ini, &mut tgt, &idle, Ready::new(true), no_ready, &Valid::invalid());
        let (addr, data) = tgt.req();
        assert!(addr.valid && data.valid);
        assert_eq!((addr.inner, data.inner), (0x200, 0x1));
    }

    #[test]
    fn initiator_reset_leaves_target_waiting() {
        let (mut ini, mut tgt) = relay::<Single<u32>, u32>("read", SyncMode::Mesochronous);
        let idle = Valid::invalid();
        edge(&mut ini, &mut tgt, &Valid::valid(4), Ready::new(true), Ready::new(true), &Valid::invalid());
        while tgt.state() != TargetState::Issue {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), Ready::new(true), &Valid::invalid());
        }

        ini.reset();
        assert!(ini.is_idle());
        assert_eq!(ini.req_ready(), Ready::new(true));

        // The downstream target never answers: the target side stays in `Issue` for good.
        for _ in 0..16 {
            edge(&mut ini, &mut tgt, &idle, Ready::new(true), Ready::new(true), &Valid::invalid());
        }
        assert_eq!(tgt.state(), TargetState::Issue);
        assert_eq!(ini.state(), InitiatorState::Idle);
    }
}
