//! Accepted connections from the default network listeners.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use super::addr::ListenAddr;

/// A stream accepted by a [`NetListener`](super::NetListener).
#[derive(Debug)]
pub enum NetStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl NetStream {
    /// Local address of the connection.
    pub fn local_addr(&self) -> io::Result<ListenAddr> {
        match self {
            NetStream::Tcp(s) => s.local_addr().map(ListenAddr::Tcp),
            #[cfg(unix)]
            NetStream::Unix(s) => Ok(unix_addr(s.local_addr()?)),
        }
    }

    /// Remote address of the connection. Unix peers are usually unnamed and
    /// report an empty path.
    pub fn peer_addr(&self) -> io::Result<ListenAddr> {
        match self {
            NetStream::Tcp(s) => s.peer_addr().map(ListenAddr::Tcp),
            #[cfg(unix)]
            NetStream::Unix(s) => Ok(unix_addr(s.peer_addr()?)),
        }
    }
}

#[cfg(unix)]
fn unix_addr(addr: tokio::net::unix::SocketAddr) -> ListenAddr {
    ListenAddr::Unix(addr.as_pathname().map(Into::into).unwrap_or_default())
}

impl AsyncRead for NetStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(unix)]
            NetStream::Unix(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NetStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            NetStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(unix)]
            NetStream::Unix(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Tcp(s) => Pin::new(s).poll_flush(cx),
            #[cfg(unix)]
            NetStream::Unix(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(unix)]
            NetStream::Unix(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}
