//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     close() → claim signal → fan-in tasks exit → pending accepts fail
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls close()
//! ```
//!
//! # Design Decisions
//! - The signal fires once; losing callers see it as already closed
//! - Observers never lock: they wait on a cancellation token

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
