//! Binding child listeners from `(network, address)` pairs.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::{lookup_host, TcpListener};

use super::listener::{Listener, NetListener};
use super::network::Network;

/// Capability to bind a listener on a named network.
pub trait Bind: Send + Sync {
    type Listener: Listener;

    /// Bind `address` on `network`.
    fn bind(
        &self,
        network: &str,
        address: &str,
    ) -> impl Future<Output = io::Result<Self::Listener>> + Send;
}

/// Binds tokio TCP and unix listeners.
///
/// Accepted networks are `tcp`, `tcp4`, `tcp6` and `unix`. TCP addresses
/// go through DNS resolution; an empty host (`":8080"`) means the wildcard
/// address of the requested family.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetBinder;

impl Bind for NetBinder {
    type Listener = NetListener;

    fn bind(
        &self,
        network: &str,
        address: &str,
    ) -> impl Future<Output = io::Result<NetListener>> + Send {
        let network = network.parse::<Network>();
        let address = address.to_owned();
        async move {
            let network = network?;
            if network.is_tcp() {
                NetListener::from_tcp(bind_tcp(network, &address).await?)
            } else {
                bind_unix(&address)
            }
        }
    }
}

async fn bind_tcp(network: Network, address: &str) -> io::Result<TcpListener> {
    let address = with_wildcard_host(network, address);
    let mut last_err = None;

    for addr in lookup_host(address.as_str()).await? {
        if !family_matches(network, &addr) {
            continue;
        }
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!(address = %addr, error = %e, "Bind attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no {} address found for {:?}", network, address),
        )
    }))
}

fn with_wildcard_host(network: Network, address: &str) -> String {
    match address.strip_prefix(':') {
        Some(port) if network == Network::Tcp6 => format!("[::]:{}", port),
        Some(port) => format!("0.0.0.0:{}", port),
        None => address.to_owned(),
    }
}

fn family_matches(network: Network, addr: &SocketAddr) -> bool {
    match network {
        Network::Tcp4 => addr.is_ipv4(),
        Network::Tcp6 => addr.is_ipv6(),
        _ => true,
    }
}

#[cfg(unix)]
fn bind_unix(path: &str) -> io::Result<NetListener> {
    NetListener::from_unix(tokio::net::UnixListener::bind(path)?)
}

#[cfg(not(unix))]
fn bind_unix(_path: &str) -> io::Result<NetListener> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unix sockets are not supported on this platform",
    ))
}
