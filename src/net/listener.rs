//! Child listener abstraction and its tokio-backed implementation.
//!
//! # Responsibilities
//! - Define what a multi-listener needs from a single bound listener
//! - Accept TCP and unix connections
//! - Close a listener from any task, waking accepts already in flight
//!
//! # Design Decisions
//! - `close` takes `&self`: children are shared between the fan-in task that
//!   accepts on them and whoever closes them
//! - A closed listener keeps failing every `accept` and every further `close`
//! - Accepts poll the socket under the lock instead of holding a handle, so
//!   `close` drops the only one and the OS socket is released before it
//!   returns

use std::future::{poll_fn, Future};
use std::io;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

use super::addr::ListenAddr;
use super::connection::NetStream;

/// A bound listener that a multi-listener fans in from.
pub trait Listener: Send + Sync + 'static {
    /// The connection type produced by `accept`.
    type Conn: Send + 'static;

    /// Wait for the next incoming connection.
    fn accept(&self) -> impl Future<Output = io::Result<Self::Conn>> + Send;

    /// Stop listening. Fails if the listener was already closed.
    fn close(&self) -> io::Result<()>;

    /// The address this listener is bound to.
    fn local_addr(&self) -> ListenAddr;
}

/// Error returned by operations on a closed [`NetListener`].
pub(crate) fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "use of closed listener")
}

#[derive(Debug)]
enum Socket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Socket {
    fn poll_accept(&self, cx: &mut Context<'_>) -> Poll<io::Result<NetStream>> {
        match self {
            Socket::Tcp(l) => l.poll_accept(cx).map_ok(|(s, _)| NetStream::Tcp(s)),
            #[cfg(unix)]
            Socket::Unix(l) => l.poll_accept(cx).map_ok(|(s, _)| NetStream::Unix(s)),
        }
    }
}

/// A TCP or unix listener that can be closed while accepts are pending.
#[derive(Debug)]
pub struct NetListener {
    socket: Mutex<Option<Socket>>,
    closed: CancellationToken,
    addr: ListenAddr,
}

impl NetListener {
    pub(crate) fn from_tcp(listener: TcpListener) -> io::Result<Self> {
        let addr = ListenAddr::Tcp(listener.local_addr()?);
        Ok(Self::new(Socket::Tcp(listener), addr))
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(listener: UnixListener) -> io::Result<Self> {
        let addr = listener
            .local_addr()?
            .as_pathname()
            .map(|p| ListenAddr::Unix(p.to_path_buf()))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "unix listener has no path")
            })?;
        Ok(Self::new(Socket::Unix(listener), addr))
    }

    fn new(socket: Socket, addr: ListenAddr) -> Self {
        Self {
            socket: Mutex::new(Some(socket)),
            closed: CancellationToken::new(),
            addr,
        }
    }

    /// Returns `true` once [`close`](Listener::close) has succeeded.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn poll_accept(&self, cx: &mut Context<'_>) -> Poll<io::Result<NetStream>> {
        match &*self.socket.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(socket) => socket.poll_accept(cx),
            None => Poll::Ready(Err(closed_error())),
        }
    }
}

impl Listener for NetListener {
    type Conn = NetStream;

    fn accept(&self) -> impl Future<Output = io::Result<NetStream>> + Send {
        async move {
            tokio::select! {
                biased;
                _ = self.closed.cancelled() => Err(closed_error()),
                res = poll_fn(|cx| self.poll_accept(cx)) => res,
            }
        }
    }

    fn close(&self) -> io::Result<()> {
        let socket = self
            .socket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(closed_error)?;
        drop(socket);
        self.closed.cancel();

        if let ListenAddr::Unix(path) = &self.addr {
            let _ = std::fs::remove_file(path);
        }

        tracing::debug!(address = %self.addr, "Listener closed");
        Ok(())
    }

    fn local_addr(&self) -> ListenAddr {
        self.addr.clone()
    }
}
