//! Multi-listener: one listener over many bound addresses.
//!
//! Binds a set of `(network, address)` pairs, fans incoming connections from
//! all of them into a single `accept`, and shuts every child down with one
//! `close`.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod multi;
pub mod net;
pub mod observability;

pub use error::{CloseErrors, Error, Result};
pub use multi::MultiListener;
pub use net::{Bind, CompositeAddr, ListenAddr, Listener, NetBinder, NetListener, NetStream};
