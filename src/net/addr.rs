//! Listener identities.
//!
//! # Responsibilities
//! - Identify a single bound child listener ([`ListenAddr`])
//! - Describe the whole set of children as one address ([`CompositeAddr`])
//!
//! # Design Decisions
//! - `CompositeAddr` borrows the registry and joins on every query, so it
//!   never goes stale
//! - Network names follow the address family, not the requested network:
//!   a listener bound through `tcp6` still reports `tcp`

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Separator between child entries in a [`CompositeAddr`].
pub const SEPARATOR: &str = ";";

/// The address a child listener reports once bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenAddr {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl ListenAddr {
    /// Network name of this address (`"tcp"` or `"unix"`).
    pub fn network(&self) -> &'static str {
        match self {
            ListenAddr::Tcp(_) => "tcp",
            ListenAddr::Unix(_) => "unix",
        }
    }

    /// The socket address, for TCP children only.
    pub fn as_socket_addr(&self) -> Option<SocketAddr> {
        match self {
            ListenAddr::Tcp(addr) => Some(*addr),
            ListenAddr::Unix(_) => None,
        }
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenAddr::Tcp(addr) => write!(f, "{}", addr),
            ListenAddr::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<SocketAddr> for ListenAddr {
    fn from(addr: SocketAddr) -> Self {
        ListenAddr::Tcp(addr)
    }
}

/// Aggregate identity of every child listener.
///
/// `Display` yields the child addresses joined by `;`, [`network`](Self::network)
/// the child network names joined the same way. Both use registry order,
/// which callers must not rely on.
#[derive(Debug, Clone, Copy)]
pub struct CompositeAddr<'a> {
    addrs: &'a [ListenAddr],
}

impl<'a> CompositeAddr<'a> {
    pub(crate) fn new(addrs: &'a [ListenAddr]) -> Self {
        Self { addrs }
    }

    /// The `;`-joined network names of every child.
    pub fn network(&self) -> String {
        self.addrs
            .iter()
            .map(ListenAddr::network)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Iterate over the child addresses this identity is made of.
    pub fn iter(&self) -> impl Iterator<Item = &'a ListenAddr> {
        self.addrs.iter()
    }
}

impl fmt::Display for CompositeAddr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, addr) in self.addrs.iter().enumerate() {
            if i > 0 {
                f.write_str(SEPARATOR)?;
            }
            write!(f, "{}", addr)?;
        }
        Ok(())
    }
}
