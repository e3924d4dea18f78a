//! AXI-Lite bridge: the read relay and the write relay behind one pair of bus ports.

use std::fmt;

use cdcflow::{relay, ConfigError, Initiator, Payload, Ready, SyncMode, Target, Valid};
use tracing::info;

use crate::types::*;

/// Read request shape: AR alone.
pub type ReadSlot = cdcflow::Single<Addr>;

/// Write request shape: AW and W, which may arrive on different cycles.
pub type WriteSlot = cdcflow::Pair<Addr, WReq>;

/// Bridge configuration, fixed when the bridge is built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Synchronization mode shared by both relays.
    pub sync_mode: SyncMode,
}

impl BridgeConfig {
    /// Creates a new configuration.
    pub fn new(sync_mode: SyncMode) -> Self { Self { sync_mode } }

    /// Configuration from the two-bit mode encoding.
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> { Ok(Self::new(SyncMode::from_bits(bits)?)) }
}

/// Signals driven by the upstream manager into the bridge (`s_axil_*` inputs).
#[derive(Debug, Default, Clone, PartialEq, Payload)]
pub struct SlaveIn {
    /// Read address.
    pub ar: Valid<Addr>,
    /// Write address.
    pub aw: Valid<Addr>,
    /// Write data.
    pub w: Valid<WReq>,
    /// Read response ready.
    pub r: Ready,
    /// Write response ready.
    pub b: Ready,
}

/// Signals driven by the bridge toward the upstream manager (`s_axil_*` outputs).
#[derive(Debug, Default, Clone, PartialEq, Payload)]
pub struct SlaveOut {
    /// Read address ready.
    pub ar: Ready,
    /// Write address ready.
    pub aw: Ready,
    /// Write data ready.
    pub w: Ready,
    /// Read response.
    pub r: Valid<RRes>,
    /// Write response.
    pub b: Valid<WRes>,
}

/// Signals driven by the bridge toward the downstream subordinate (`m_axil_*` outputs).
#[derive(Debug, Default, Clone, PartialEq, Payload)]
pub struct MasterOut {
    /// Read address.
    pub ar: Valid<Addr>,
    /// Write address.
    pub aw: Valid<Addr>,
    /// Write data.
    pub w: Valid<WReq>,
    /// Read response ready.
    pub r: Ready,
    /// Write response ready.
    pub b: Ready,
}

/// Signals driven by the downstream subordinate into the bridge (`m_axil_*` inputs).
#[derive(Debug, Default, Clone, PartialEq, Payload)]
pub struct MasterIn {
    /// Read address ready.
    pub ar: Ready,
    /// Write address ready.
    pub aw: Ready,
    /// Write data ready.
    pub w: Ready,
    /// Read response.
    pub r: Valid<RRes>,
    /// Write response.
    pub b: Valid<WRes>,
}

/// Upstream half of the bridge, clocked by the initiator domain.
#[derive(Debug)]
pub struct AxilInitiator {
    /// Read relay.
    pub read: Initiator<ReadSlot, RRes>,
    /// Write relay.
    pub write: Initiator<WriteSlot, WRes>,
}

impl AxilInitiator {
    /// Outputs toward the upstream manager for the current cycle.
    pub fn outputs(&self) -> SlaveOut {
        let (aw, w) = self.write.req_ready();
        SlaveOut { ar: self.read.req_ready(), aw, w, r: self.read.resp().clone(), b: self.write.resp().clone() }
    }

    /// Applies one initiator-domain edge.
    pub fn tick(&mut self, input: &SlaveIn) {
        self.read.tick(&input.ar, input.r);
        self.write.tick(&(input.aw.clone(), input.w.clone()), input.b);
    }

    /// Commits staged cross-domain outputs.
    pub fn publish(&self) {
        self.read.publish();
        self.write.publish();
    }

    /// Resets both relays' initiator halves.
    pub fn reset(&mut self) {
        self.read.reset();
        self.write.reset();
    }

    /// Whether neither relay has anything in flight on this side.
    pub fn is_idle(&self) -> bool { self.read.is_idle() && self.write.is_idle() }
}

/// Downstream half of the bridge, clocked by the target domain.
#[derive(Debug)]
pub struct AxilTarget {
    /// Read relay.
    pub read: Target<ReadSlot, RRes>,
    /// Write relay.
    pub write: Target<WriteSlot, WRes>,
}

impl AxilTarget {
    /// Outputs toward the downstream subordinate for the current cycle.
    pub fn outputs(&self) -> MasterOut {
        let (aw, w) = self.write.req();
        MasterOut { ar: self.read.req(), aw, w, r: self.read.resp_ready(), b: self.write.resp_ready() }
    }

    /// Applies one target-domain edge.
    pub fn tick(&mut self, input: &MasterIn) {
        self.read.tick(input.ar, &input.r);
        self.write.tick((input.aw, input.w), &input.b);
    }

    /// Commits staged cross-domain outputs.
    pub fn publish(&self) {
        self.read.publish();
        self.write.publish();
    }

    /// Resets both relays' target halves.
    pub fn reset(&mut self) {
        self.read.reset();
        self.write.reset();
    }
}

/// Builds the bridge.
pub fn axil_cdc(config: BridgeConfig) -> (AxilInitiator, AxilTarget) {
    info!(sync_mode = %config.sync_mode, "building axil cdc bridge");
    let (read_initiator, read_target) = relay::<ReadSlot, RRes>("read", config.sync_mode);
    let (write_initiator, write_target) = relay::<WriteSlot, WRes>("write", config.sync_mode);
    (
        AxilInitiator { read: read_initiator, write: write_initiator },
        AxilTarget { read: read_target, write: write_target },
    )
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Driven into the bridge.
    Input,
    /// Driven by the bridge.
    Output,
}

/// A flattened bus port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    /// Port name.
    pub name: String,
    /// Width in bits.
    pub width: usize,
    /// Direction.
    pub direction: Direction,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Input => "input",
            Direction::Output => "output",
        };
        if self.width == 1 {
            write!(f, "{direction:6} wire {}", self.name)
        } else {
            write!(f, "{direction:6} wire [{}:0] {}", self.width - 1, self.name)
        }
    }
}

fn flatten<P: Payload>(prefix: &str, direction: Direction) -> impl Iterator<Item = Port> {
    P::port_decls().iter_ports(Some(prefix.to_string())).into_iter().map(move |(name, width)| Port {
        name: name.unwrap_or_default(),
        width,
        direction,
    })
}

/// Every bus port of the bridge: the upstream `s_axil_*` port first, then the downstream
/// `m_axil_*` port.
pub fn ports() -> Vec<Port> {
    flatten::<SlaveIn>("s_axil", Direction::Input)
        .chain(flatten::<SlaveOut>("s_axil", Direction::Output))
        .chain(flatten::<MasterOut>("m_axil", Direction::Output))
        .chain(flatten::<MasterIn>("m_axil", Direction::Input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port<'a>(ports: &'a [Port], name: &str) -> &'a Port {
        match ports.iter().find(|p| p.name == name) {
            Some(port) => port,
            None => panic!("no port named {name}"),
        }
    }

    #[test]
    fn port_list_is_complete() {
        let ports = ports();

        assert_eq!(port(&ports, "s_axil_ar_addr").width, AXIL_ADDR_WIDTH);
        assert_eq!(port(&ports, "s_axil_ar_valid").direction, Direction::Input);
        assert_eq!(port(&ports, "s_axil_ar_ready").direction, Direction::Output);
        assert_eq!(port(&ports, "s_axil_w_strb").width, AXIL_STRB_WIDTH);
        assert_eq!(port(&ports, "m_axil_r_resp").width, 2);
        assert_eq!(port(&ports, "m_axil_b_ready").direction, Direction::Output);

        // Upstream and downstream ports mirror each other.
        let upstream = ports.iter().filter(|p| p.name.starts_with("s_axil_")).count();
        assert_eq!(upstream * 2, ports.len());
        let width = |prefix: &str| ports.iter().filter(|p| p.name.starts_with(prefix)).map(|p| p.width).sum::<usize>();
        assert_eq!(width("s_axil_"), width("m_axil_"));
        assert_eq!(width("s_axil_"), SlaveIn::WIDTH + SlaveOut::WIDTH);
    }

    #[test]
    fn port_display() {
        let ports = ports();
        assert_eq!(port(&ports, "s_axil_ar_addr").to_string(), "input  wire [31:0] s_axil_ar_addr");
        assert_eq!(port(&ports, "m_axil_b_valid").to_string(), "input  wire m_axil_b_valid");
        assert_eq!(port(&ports, "m_axil_b_ready").to_string(), "output wire m_axil_b_ready");
        assert_eq!(port(&ports, "s_axil_b_valid").to_string(), "output wire s_axil_b_valid");
    }

    #[test]
    fn config_from_bits() {
        assert_eq!(BridgeConfig::from_bits(0b01), Ok(BridgeConfig::new(SyncMode::Mesochronous)));
        assert_eq!(BridgeConfig::from_bits(0b100), Err(ConfigError::InvalidSyncModeBits(0b100)));
        assert_eq!(BridgeConfig::default().sync_mode, SyncMode::Async);
    }

    #[test]
    fn fresh_bridge_is_idle() {
        let (initiator, target) = axil_cdc(BridgeConfig::default());
        let up = initiator.outputs();
        assert!(up.ar.ready && up.aw.ready && up.w.ready);
        assert!(!up.r.valid && !up.b.valid);
        assert_eq!(target.outputs(), MasterOut::default());
        assert!(initiator.is_idle());
    }
}
