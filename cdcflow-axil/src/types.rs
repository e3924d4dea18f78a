//! AXI-Lite channel payloads.

use cdcflow::{Bits, Payload};
use static_assertions::*;

/// Width of AXI lite address bus in bits
pub const AXIL_ADDR_WIDTH: usize = 32;

/// Width of AXI lite data bus in bits
pub const AXIL_DATA_WIDTH: usize = 32;

/// Width of AXI lite wstrb (width of data bus in words)
pub const AXIL_STRB_WIDTH: usize = AXIL_DATA_WIDTH / 8;

/// Width of AXI lite protection attributes
pub const AXIL_PROT_WIDTH: usize = 3;

// Error: AXI lite interface width must be 32
const_assert!(AXIL_DATA_WIDTH == 32);

// Error: AXI lite interface requires byte (8-bit) granularity
const_assert!(AXIL_STRB_WIDTH * 8 == AXIL_DATA_WIDTH);

const_assert!(AXIL_ADDR_WIDTH <= 64);

/// s_axil_aw*, s_axil_ar*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Payload)]
pub struct Addr {
    /// Address.
    pub addr: Bits<AXIL_ADDR_WIDTH>,
    /// Protection attributes.
    pub prot: Bits<AXIL_PROT_WIDTH>,
}

impl Addr {
    /// Unprivileged, secure, data access to `addr`.
    pub fn new(addr: u64) -> Self { Self { addr: Bits::new(addr), prot: Bits::default() } }

    /// Sets the protection attributes.
    #[must_use]
    pub fn with_prot(self, prot: u64) -> Self { Self { prot: Bits::new(prot), ..self } }
}

/// s_axil_w*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Payload)]
pub struct WReq {
    /// Write data.
    pub data: Bits<AXIL_DATA_WIDTH>,
    /// Byte enables.
    pub strb: Bits<AXIL_STRB_WIDTH>,
}

impl WReq {
    /// Creates a new write beat.
    pub fn new(data: u64, strb: u64) -> Self { Self { data: Bits::new(data), strb: Bits::new(strb) } }

    /// Write beat with every byte enabled.
    pub fn full(data: u64) -> Self { Self { data: Bits::new(data), strb: Bits::ones() } }
}

/// Response status.
///
/// The bridge neither produces nor inspects it: whatever the downstream target returns reaches the
/// upstream initiator unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Payload)]
pub enum Resp {
    /// Normal access success.
    #[default]
    Okay,
    /// Exclusive access success.
    ExOkay,
    /// Subordinate error.
    SlvErr,
    /// Decode error.
    DecErr,
}

/// s_axil_b*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Payload)]
pub struct WRes {
    /// Write status.
    pub resp: Resp,
}

impl WRes {
    /// Creates a new write response.
    pub fn new(resp: Resp) -> Self { Self { resp } }
}

/// s_axil_r*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Payload)]
pub struct RRes {
    /// Read data.
    pub data: Bits<AXIL_DATA_WIDTH>,
    /// Read status.
    pub resp: Resp,
}

impl RRes {
    /// Creates a new read response.
    pub fn new(data: u64, resp: Resp) -> Self { Self { data: Bits::new(data), resp } }
}

const_assert_eq!(<Addr as Payload>::WIDTH, AXIL_ADDR_WIDTH + AXIL_PROT_WIDTH);
const_assert_eq!(<WReq as Payload>::WIDTH, AXIL_DATA_WIDTH + AXIL_STRB_WIDTH);
const_assert_eq!(<Resp as Payload>::WIDTH, 2);
const_assert_eq!(<RRes as Payload>::WIDTH, AXIL_DATA_WIDTH + 2);
const_assert_eq!(<WRes as Payload>::WIDTH, 2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_mask_to_width() {
        assert_eq!(Addr::new(0x1_0000_0100).addr.value(), 0x100);
        assert_eq!(Addr::new(0x100).with_prot(0b1010).prot.value(), 0b010);
        assert_eq!(WReq::full(1).strb.value(), 0xf);
        assert_eq!(RRes::new(0xdead_beef, Resp::Okay).data.value(), 0xdead_beef);
    }

    #[test]
    fn ports_follow_member_names() {
        let ports = RRes::port_decls().iter_ports(Some("s_axil_r".to_string()));
        assert_eq!(ports, vec![(Some("s_axil_r_data".to_string()), 32), (Some("s_axil_r_resp".to_string()), 2)]);
    }
}
