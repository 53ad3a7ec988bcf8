//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use multi_listener::{Bind, ListenAddr, Listener};
use tokio_util::sync::CancellationToken;

/// Loopback listeners on ephemeral ports: IPv4 always, IPv6 when the host
/// has it.
pub fn loopback_listeners() -> BTreeMap<&'static str, Vec<&'static str>> {
    let mut listeners = BTreeMap::from([("tcp", vec!["127.0.0.1:0"])]);
    if ipv6_available() {
        listeners.insert("tcp6", vec!["[::1]:0"]);
    }
    listeners
}

pub fn ipv6_available() -> bool {
    std::net::TcpListener::bind("[::1]:0").is_ok()
}

pub fn socket_addrs(addrs: &[ListenAddr]) -> Vec<SocketAddr> {
    addrs.iter().filter_map(ListenAddr::as_socket_addr).collect()
}

/// Binder producing in-memory listeners on the `mock` network.
///
/// Address `fail` refuses to bind, address `close-fails` binds a listener
/// whose `close` always errors. Everything else binds normally.
#[derive(Clone, Default)]
pub struct MockBinder {
    state: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    next_port: AtomicU16,
    open: AtomicUsize,
    closed: Mutex<Vec<ListenAddr>>,
    feeds: Mutex<Vec<(ListenAddr, flume::Sender<u32>)>>,
}

impl MockBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners bound and not yet closed.
    pub fn open_count(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }

    /// Addresses closed so far, in close order.
    pub fn closed(&self) -> Vec<ListenAddr> {
        self.state.closed.lock().unwrap().clone()
    }

    /// Queue connection `id` on the listener bound at `addr`.
    pub fn feed(&self, addr: &ListenAddr, id: u32) {
        let feeds = self.state.feeds.lock().unwrap();
        let (_, tx) = feeds
            .iter()
            .find(|(a, _)| a == addr)
            .expect("no listener at address");
        tx.send(id).unwrap();
    }
}

impl Bind for MockBinder {
    type Listener = MockListener;

    fn bind(
        &self,
        network: &str,
        address: &str,
    ) -> impl Future<Output = io::Result<MockListener>> + Send {
        let res = if network != "mock" {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "unknown network"))
        } else if address == "fail" {
            Err(io::Error::new(io::ErrorKind::AddrInUse, "address in use"))
        } else {
            let port = 10_000 + self.state.next_port.fetch_add(1, Ordering::SeqCst);
            let addr = ListenAddr::Tcp(([127, 0, 0, 1], port).into());
            let (tx, rx) = flume::unbounded();
            self.state.feeds.lock().unwrap().push((addr.clone(), tx));
            self.state.open.fetch_add(1, Ordering::SeqCst);
            Ok(MockListener {
                addr,
                incoming: rx,
                closed: CancellationToken::new(),
                close_fails: address == "close-fails",
                state: Arc::clone(&self.state),
            })
        };
        std::future::ready(res)
    }
}

/// In-memory listener handing out numbered connections.
#[derive(Debug)]
pub struct MockListener {
    addr: ListenAddr,
    incoming: flume::Receiver<u32>,
    closed: CancellationToken,
    close_fails: bool,
    state: Arc<MockState>,
}

impl MockListener {
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "mock listener closed")
}

impl Listener for MockListener {
    type Conn = u32;

    fn accept(&self) -> impl Future<Output = io::Result<u32>> + Send {
        async move {
            tokio::select! {
                biased;
                _ = self.closed.cancelled() => Err(closed_error()),
                id = self.incoming.recv_async() => id.map_err(|_| closed_error()),
            }
        }
    }

    fn close(&self) -> io::Result<()> {
        if self.close_fails {
            return Err(io::Error::new(io::ErrorKind::Other, "close refused"));
        }
        if self.closed.is_cancelled() {
            return Err(closed_error());
        }
        self.closed.cancel();
        self.state.open.fetch_sub(1, Ordering::SeqCst);
        self.state.closed.lock().unwrap().push(self.addr.clone());
        Ok(())
    }

    fn local_addr(&self) -> ListenAddr {
        self.addr.clone()
    }
}
