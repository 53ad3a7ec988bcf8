//! Fixed set of bound child listeners.

use std::sync::Arc;

use crate::error::CloseErrors;
use crate::net::{ListenAddr, Listener};

/// Child listeners keyed by the address each reported when bound.
///
/// Built once and never mutated, so reads need no lock. Addresses and
/// listeners live in parallel slices: index `i` of one belongs to index `i`
/// of the other.
#[derive(Debug)]
pub(crate) struct Registry<L> {
    addrs: Box<[ListenAddr]>,
    listeners: Box<[Arc<L>]>,
}

impl<L: Listener> Registry<L> {
    pub(crate) fn new(listeners: impl IntoIterator<Item = L>) -> Self {
        let listeners: Box<[Arc<L>]> = listeners.into_iter().map(Arc::new).collect();
        let addrs = listeners.iter().map(|l| l.local_addr()).collect();
        Self { addrs, listeners }
    }

    pub(crate) fn addrs(&self) -> &[ListenAddr] {
        &self.addrs
    }

    pub(crate) fn get(&self, addr: &ListenAddr) -> Option<&L> {
        let idx = self.addrs.iter().position(|a| a == addr)?;
        Some(&self.listeners[idx])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ListenAddr, &Arc<L>)> {
        self.addrs.iter().zip(self.listeners.iter())
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Close every child, continuing past failures.
    pub(crate) fn close_all(&self) -> CloseErrors {
        let mut errors = CloseErrors::default();
        for (addr, listener) in self.iter() {
            if let Err(e) = listener.close() {
                tracing::warn!(address = %addr, error = %e, "Failed to close listener");
                errors.push(addr.clone(), e);
            }
        }
        errors
    }
}
