//! Payloads carried by the relays, and the ready/valid signals that frame them.

use std::fmt::{self, Debug};

use itertools::Itertools;

use crate::utils::join_options;

/// Port declarations of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortDecls {
    /// Collection of members, each optionally named.
    Struct(Vec<(Option<String>, PortDecls)>),

    /// Single port which contains its width.
    Bits(usize),
}

impl PortDecls {
    /// Width of `PortDecls`.
    pub fn width(&self) -> usize {
        match self {
            PortDecls::Struct(inner) => inner.iter().map(|(_, m)| m.width()).sum(),
            PortDecls::Bits(width) => *width,
        }
    }

    /// Flattens the declarations into `(name, width)` pairs.
    ///
    /// # Note
    ///
    /// Member names are joined to `prefix` with `_`, and only ports with nonzero width are returned.
    /// This is to ignore meaningless unit types.
    pub fn iter_ports(&self, prefix: Option<String>) -> Vec<(Option<String>, usize)> {
        match self {
            PortDecls::Struct(inner) => inner
                .iter()
                .flat_map(|(name, member)| member.iter_ports(join_options("_", [prefix.clone(), name.clone()])))
                .collect(),
            PortDecls::Bits(width) => {
                if *width > 0 {
                    vec![(prefix, *width)]
                } else {
                    vec![]
                }
            }
        }
    }
}

impl fmt::Display for PortDecls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports = self
            .iter_ports(None)
            .into_iter()
            .map(|(name, width)| format!("{}[{}]", name.unwrap_or_else(|| "_".to_string()), width))
            .join(", ");
        write!(f, "{{{}}}", ports)
    }
}

/// Value carried across a relay in a single register.
///
/// A payload register is written by exactly one domain and read by the other only after the
/// corresponding toggle flag has been observed through the synchronizer, so payloads only need to
/// be cheaply clonable and sendable between threads.
pub trait Payload: 'static + Clone + Debug + Default + PartialEq + Send {
    /// Width of the payload in bits.
    const WIDTH: usize;

    /// Returns the port declarations.
    fn port_decls() -> PortDecls;
}

impl Payload for () {
    const WIDTH: usize = 0;

    fn port_decls() -> PortDecls { PortDecls::Bits(0) }
}

impl Payload for bool {
    const WIDTH: usize = 1;

    fn port_decls() -> PortDecls { PortDecls::Bits(1) }
}

macro_rules! impl_payload_uint {
    ($($t:ty),*) => {
        $(
            impl Payload for $t {
                const WIDTH: usize = <$t>::BITS as usize;

                fn port_decls() -> PortDecls { PortDecls::Bits(Self::WIDTH) }
            }
        )*
    };
}

impl_payload_uint!(u8, u16, u32, u64);

impl<A: Payload, B: Payload> Payload for (A, B) {
    const WIDTH: usize = A::WIDTH + B::WIDTH;

    fn port_decls() -> PortDecls { PortDecls::Struct(vec![(None, A::port_decls()), (None, B::port_decls())]) }
}

/// Bit vector of width `N`, up to 64 bits.
///
/// The value is masked to `N` bits on construction.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bits<const N: usize>(u64);

impl<const N: usize> Bits<N> {
    /// Mask of the valid bits.
    pub const MASK: u64 = if N >= 64 { u64::MAX } else { (1u64 << N) - 1 };

    /// Creates a new bit vector, dropping bits above `N`.
    pub const fn new(value: u64) -> Self { Self(value & Self::MASK) }

    /// All ones.
    pub const fn ones() -> Self { Self(Self::MASK) }

    /// Returns the value.
    pub const fn value(self) -> u64 { self.0 }
}

impl<const N: usize> From<u64> for Bits<N> {
    fn from(value: u64) -> Self { Self::new(value) }
}

impl<const N: usize> Debug for Bits<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}'h{:x}", N, self.0) }
}

impl<const N: usize> fmt::LowerHex for Bits<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::LowerHex::fmt(&self.0, f) }
}

impl<const N: usize> Payload for Bits<N> {
    const WIDTH: usize = N;

    fn port_decls() -> PortDecls { PortDecls::Bits(N) }
}

/// Valid/ready channel's forward signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Valid<P> {
    /// Inner data
    pub inner: P,

    /// Valid bit
    pub valid: bool,
}

impl<P: Payload> Valid<P> {
    /// Creates a new value.
    pub fn new(valid: bool, inner: P) -> Self { Self { inner, valid } }

    /// Creates a valid value.
    pub fn valid(inner: P) -> Self { Self::new(true, inner) }

    /// Creates an invalid value.
    pub fn invalid() -> Self { Self::new(false, P::default()) }

    /// Whether the channel transfers in a cycle where the consumer presents `ready`.
    pub fn fire(&self, ready: Ready) -> bool { self.valid && ready.ready }

    /// Returns the inner data if valid.
    pub fn as_option(&self) -> Option<&P> { self.valid.then_some(&self.inner) }
}

impl<P: Payload> Payload for Valid<P> {
    const WIDTH: usize = P::WIDTH + 1;

    fn port_decls() -> PortDecls {
        PortDecls::Struct(vec![(None, P::port_decls()), (Some("valid".to_string()), PortDecls::Bits(1))])
    }
}

/// Ready signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new ready signal.
    pub const fn new(ready: bool) -> Self { Self { ready } }
}

impl Payload for Ready {
    const WIDTH: usize = 1;

    fn port_decls() -> PortDecls { PortDecls::Struct(vec![(Some("ready".to_string()), PortDecls::Bits(1))]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_masked() {
        assert_eq!(Bits::<4>::new(0x1f).value(), 0xf);
        assert_eq!(Bits::<64>::new(u64::MAX).value(), u64::MAX);
        assert_eq!(Bits::<3>::ones().value(), 0b111);
        assert_eq!(format!("{:?}", Bits::<32>::new(0x100)), "32'h100");
    }

    #[test]
    fn valid_fires_only_with_ready() {
        let v = Valid::valid(7u32);
        assert!(v.fire(Ready::new(true)));
        assert!(!v.fire(Ready::new(false)));
        assert!(!Valid::<u32>::invalid().fire(Ready::new(true)));
        assert_eq!(v.as_option(), Some(&7));
    }

    #[test]
    fn port_decls_flatten_with_prefix() {
        let decls = <Valid<(Bits<32>, Bits<4>)>>::port_decls();
        assert_eq!(decls.width(), 37);
        assert_eq!(<Valid<(Bits<32>, Bits<4>)>>::WIDTH, 37);
        assert_eq!(decls.iter_ports(Some("w".to_string())), vec![
            (Some("w".to_string()), 32),
            (Some("w".to_string()), 4),
            (Some("w_valid".to_string()), 1),
        ]);
        assert_eq!(<()>::port_decls().iter_ports(Some("unit".to_string())), vec![]);
    }

    #[test]
    fn ready_port_is_named() {
        assert_eq!(Ready::port_decls().iter_ports(Some("r".to_string())), vec![(Some("r_ready".to_string()), 1)]);
        assert_eq!(format!("{}", Ready::port_decls()), "{ready[1]}");
    }
}
