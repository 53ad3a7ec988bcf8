//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! net / multi / lifecycle
//!     → tracing events (structured fields: address, network, error)
//!     → logging.rs subscriber (fmt layer, EnvFilter)
//!     → stdout
//! ```

pub mod logging;
