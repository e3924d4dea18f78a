//! CdcFlow: cycle-level model of single-transaction relays across two independently clocked domains.
//!
//! Each relay moves one request and one response per round trip through a pair of toggle-flag
//! crossings. The flags are the only signals that cross between domains; payload registers are read
//! by the peer only after its synchronized flag view says they are stable.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

pub mod clock;
pub mod crossing;
pub mod error;
pub mod payload;
pub mod relay;
pub mod sim;
pub mod slot;
pub mod sync;
pub mod thread;
pub mod utils;
pub mod wire;

pub use cdcflow_macro::Payload;
pub use clock::{Clock, Domain, Process};
pub use crossing::{crossing, Synchronizer, ToggleFlag};
pub use error::{ConfigError, SimError};
pub use payload::*;
pub use relay::*;
pub use sim::Simulator;
pub use slot::{Pair, Single, Slot};
pub use sync::{DelayLine, SyncMode, MAX_STAGES};
pub use thread::ThreadConfig;
pub use utils::*;
pub use wire::{wire, WireReader, WireWriter};
