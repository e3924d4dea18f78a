//! Implementation of the `Payload` derive macro.
//!
//! # Note
//!
//! `#[derive(Payload)]` on a struct assumes every member type already implements `Payload`. Its
//! `port_decls()` is the struct of its members' port declarations, in declaration order.
//!
//! For example, for the AXI-Lite read response
//!
//! ```ignore
//! #[derive(Debug, Clone, Default, PartialEq, Payload)]
//! pub struct RRes {
//!     data: Bits<32>,
//!     #[member(name = "")]
//!     resp: Resp,
//! }
//! ```
//!
//! the generated implementation is
//!
//! ```ignore
//! impl Payload for RRes {
//!     const WIDTH: usize = 0 + <Bits<32>>::WIDTH + <Resp>::WIDTH;
//!     fn port_decls() -> PortDecls {
//!         PortDecls::Struct(vec![
//!             (Some("data".to_string()), <Bits<32>>::port_decls()),
//!             (None, <Resp>::port_decls()),
//!         ])
//!     }
//! }
//! ```

mod payload;
mod utils;

use proc_macro::{self, TokenStream};

#[proc_macro_derive(Payload, attributes(member, width))]
pub fn payload(input: TokenStream) -> TokenStream { payload::derive(input) }
