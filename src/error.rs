//! Error types for the multi-listener.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::net::ListenAddr;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a [`MultiListener`](crate::MultiListener).
#[derive(Debug, Error)]
pub enum Error {
    /// The listener has been closed. Every `accept` and `close` issued after
    /// shutdown fails with this.
    #[error("listener is already closed")]
    Closed,

    /// A child listener could not be bound during construction.
    #[error("listen {network} {address}: {source}")]
    Bind {
        network: String,
        address: String,
        #[source]
        source: io::Error,
    },

    /// A child listener failed to accept a connection.
    #[error("accept on {addr}: {source}")]
    Accept {
        addr: ListenAddr,
        #[source]
        source: io::Error,
    },

    /// One or more child listeners failed to close.
    #[error(transparent)]
    Close(CloseErrors),
}

impl Error {
    /// Returns `true` for the shutdown error, as opposed to a real failure.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}

/// Every close failure collected while shutting down the child listeners.
#[derive(Debug, Default)]
pub struct CloseErrors {
    failures: Vec<(ListenAddr, io::Error)>,
}

impl CloseErrors {
    pub(crate) fn push(&mut self, addr: ListenAddr, err: io::Error) {
        self.failures.push((addr, err));
    }

    /// Converts the collection into a result: `Ok` when nothing failed.
    pub(crate) fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Close(self))
        }
    }

    /// The failed children and their errors.
    pub fn failures(&self) -> &[(ListenAddr, io::Error)] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CloseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (addr, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "close {}: {}", addr, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseErrors {}
