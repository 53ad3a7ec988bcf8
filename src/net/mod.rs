//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! (network, address) pair
//!     → network.rs (parse network name)
//!     → bind.rs (resolve and bind)
//!     → listener.rs (NetListener: accept / close)
//!     → connection.rs (NetStream handed to the caller)
//! ```
//!
//! # Design Decisions
//! - Multi-listener code depends only on the `Bind` and `Listener` traits,
//!   the tokio implementations are one choice of collaborator
//! - Listener identity (`addr.rs`) is independent of the socket type

pub mod addr;
pub mod bind;
pub mod connection;
pub mod listener;
pub mod network;

pub use addr::{CompositeAddr, ListenAddr};
pub use bind::{Bind, NetBinder};
pub use connection::NetStream;
pub use listener::{Listener, NetListener};
pub use network::Network;
