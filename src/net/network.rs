//! Network type names accepted by the default binder.

use std::fmt;
use std::io;
use std::str::FromStr;

/// A transport family a child listener can be bound on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// TCP over IPv4 or IPv6, whichever the address resolves to first.
    Tcp,
    /// TCP restricted to IPv4 addresses.
    Tcp4,
    /// TCP restricted to IPv6 addresses.
    Tcp6,
    /// Unix domain stream socket bound to a filesystem path.
    Unix,
}

impl Network {
    pub const ALL: [Network; 4] = [Network::Tcp, Network::Tcp4, Network::Tcp6, Network::Unix];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
            Network::Unix => "unix",
        }
    }

    pub fn is_tcp(&self) -> bool {
        !matches!(self, Network::Unix)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown network {:?}", s),
                )
            })
    }
}
