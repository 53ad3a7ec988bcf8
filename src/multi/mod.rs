//! One listener over many bound addresses.
//!
//! # Data Flow
//! ```text
//! {network → [address]}
//!     → Bind (one child listener per pair)
//!     → registry.rs (fixed set, keyed by reported address)
//!     → fan_in.rs (one task per child)
//!     → rendezvous channel
//!     → MultiListener::accept (races the shutdown signal)
//! ```
//!
//! # Design Decisions
//! - Construction is all or nothing; children bound before a failure are
//!   closed again before the error is returned
//! - `close` fires the shutdown signal before closing children, so accepts
//!   in flight observe `Error::Closed` rather than a child's close error
//! - Dropping the listener closes it as well

mod fan_in;
mod registry;

use futures_util::Stream;
use tokio_util::task::TaskTracker;

use crate::error::{Error, Result};
use crate::lifecycle::Shutdown;
use crate::net::{Bind, CompositeAddr, ListenAddr, Listener, NetBinder, NetListener};

use self::fan_in::Delivery;
use self::registry::Registry;

/// Accepts connections from several child listeners as if they were one.
///
/// ```no_run
/// # async fn run() -> multi_listener::Result<()> {
/// use std::collections::BTreeMap;
/// use multi_listener::MultiListener;
///
/// let listener = MultiListener::bind(BTreeMap::from([
///     ("tcp", vec!["127.0.0.1:8080"]),
///     ("tcp6", vec!["[::1]:8080"]),
/// ]))
/// .await?;
///
/// loop {
///     match listener.accept().await {
///         Ok(stream) => drop(stream),
///         Err(e) if e.is_closed() => break,
///         Err(e) => tracing::warn!(error = %e, "accept failed"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MultiListener<L: Listener = NetListener> {
    registry: Registry<L>,
    /// Held so the channel stays open even with zero children.
    _deliveries_tx: flume::Sender<Delivery<L::Conn>>,
    deliveries: flume::Receiver<Delivery<L::Conn>>,
    shutdown: Shutdown,
    tasks: TaskTracker,
}

impl MultiListener<NetListener> {
    /// Bind every `(network, address)` pair with the tokio [`NetBinder`].
    ///
    /// Accepted networks are `tcp`, `tcp4`, `tcp6` and `unix`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] for the first pair that fails to bind. Children
    /// bound before it are closed first.
    pub async fn bind<I, N, A>(listeners: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self::bind_with(&NetBinder, listeners).await
    }
}

impl<L: Listener> MultiListener<L> {
    /// Bind every `(network, address)` pair with a custom binder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] for the first pair that fails to bind. Children
    /// bound before it are closed first.
    pub async fn bind_with<B, I, N, A>(binder: &B, listeners: I) -> Result<Self>
    where
        B: Bind<Listener = L>,
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let mut bound = Vec::new();

        for (network, addresses) in listeners {
            let network = network.as_ref();
            for address in addresses {
                let address = address.as_ref();
                match binder.bind(network, address).await {
                    Ok(listener) => {
                        tracing::info!(
                            network,
                            address = %listener.local_addr(),
                            "Listener bound"
                        );
                        bound.push(listener);
                    }
                    Err(source) => {
                        release(&bound);
                        return Err(Error::Bind {
                            network: network.to_owned(),
                            address: address.to_owned(),
                            source,
                        });
                    }
                }
            }
        }

        Ok(Self::from_listeners(bound))
    }

    /// Fan in from listeners that are already bound.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn from_listeners(listeners: impl IntoIterator<Item = L>) -> Self {
        let registry = Registry::new(listeners);
        let (tx, rx) = flume::bounded(0);
        let shutdown = Shutdown::new();
        let tasks = TaskTracker::new();

        for (addr, child) in registry.iter() {
            tasks.spawn(fan_in::run(
                child.clone(),
                addr.clone(),
                tx.clone(),
                shutdown.subscribe(),
            ));
        }
        tasks.close();

        tracing::debug!(children = registry.len(), "Multi-listener started");

        Self {
            registry,
            _deliveries_tx: tx,
            deliveries: rx,
            shutdown,
            tasks,
        }
    }

    /// Wait for the next connection from any child.
    ///
    /// # Errors
    ///
    /// - [`Error::Closed`] once the listener has been closed, including for
    ///   calls already waiting when `close` runs.
    /// - [`Error::Accept`] when a child's accept failed. The child keeps
    ///   accepting afterwards.
    pub async fn accept(&self) -> Result<L::Conn> {
        tokio::select! {
            biased;
            _ = self.shutdown.wait() => Err(Error::Closed),
            delivery = self.deliveries.recv_async() => match delivery {
                Ok(Delivery { addr, result }) => {
                    result.map_err(|source| Error::Accept { addr, source })
                }
                Err(_) => Err(Error::Closed),
            },
        }
    }

    /// Close every child and stop accepting.
    ///
    /// Only the first call does any work; it tries every child even when some
    /// fail, and reports all failures together.
    ///
    /// # Errors
    ///
    /// - [`Error::Close`] listing each child that failed to close.
    /// - [`Error::Closed`] on every call after the first.
    pub fn close(&self) -> Result<()> {
        if !self.shutdown.trigger() {
            return Err(Error::Closed);
        }

        let errors = self.registry.close_all();
        tracing::info!(
            children = self.registry.len(),
            failed = errors.len(),
            "Multi-listener closed"
        );
        errors.into_result()
    }

    /// A stream of accept results that ends once the listener is closed.
    pub fn incoming(&self) -> impl Stream<Item = Result<L::Conn>> + '_ {
        futures_util::stream::unfold(self, |listener| async move {
            match listener.accept().await {
                Err(Error::Closed) => None,
                res => Some((res, listener)),
            }
        })
    }

    /// Combined identity of all children.
    pub fn addr(&self) -> CompositeAddr<'_> {
        CompositeAddr::new(self.registry.addrs())
    }

    /// Address of every child, in no particular order.
    pub fn addresses(&self) -> Vec<ListenAddr> {
        self.registry.addrs().to_vec()
    }

    /// The child listener bound to `addr`.
    pub fn child(&self, addr: &ListenAddr) -> Option<&L> {
        self.registry.get(addr)
    }

    /// Number of child listeners.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` when there are no child listeners.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Returns `true` once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Resolve once every fan-in task has exited. Only happens after close.
    pub async fn wait_tasks(&self) {
        self.tasks.wait().await
    }
}

impl<L: Listener> Drop for MultiListener<L> {
    fn drop(&mut self) {
        if self.shutdown.trigger() {
            let errors = self.registry.close_all();
            tracing::debug!(
                children = self.registry.len(),
                failed = errors.len(),
                "Multi-listener dropped"
            );
        }
    }
}

/// Close listeners bound during a construction that failed.
fn release<L: Listener>(bound: &[L]) {
    for listener in bound {
        if let Err(e) = listener.close() {
            tracing::warn!(
                address = %listener.local_addr(),
                error = %e,
                "Failed to release listener after bind error"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Listener fed by a channel, for driving accepts from the test.
    struct Fed {
        addr: ListenAddr,
        incoming: flume::Receiver<io::Result<u32>>,
        closed: AtomicBool,
    }

    fn fed(port: u16) -> (Fed, flume::Sender<io::Result<u32>>) {
        let (tx, rx) = flume::unbounded();
        let listener = Fed {
            addr: ListenAddr::Tcp(([127, 0, 0, 1], port).into()),
            incoming: rx,
            closed: AtomicBool::new(false),
        };
        (listener, tx)
    }

    impl Listener for Fed {
        type Conn = u32;

        fn accept(&self) -> impl Future<Output = io::Result<u32>> + Send {
            async move {
                match self.incoming.recv_async().await {
                    Ok(res) => res,
                    Err(_) => std::future::pending().await,
                }
            }
        }

        fn close(&self) -> io::Result<()> {
            if self.closed.swap(true, Ordering::SeqCst) {
                Err(io::Error::new(io::ErrorKind::NotConnected, "already closed"))
            } else {
                Ok(())
            }
        }

        fn local_addr(&self) -> ListenAddr {
            self.addr.clone()
        }
    }

    #[tokio::test]
    async fn delivers_from_every_child() {
        let (a, a_tx) = fed(1000);
        let (b, b_tx) = fed(2000);
        let listener = MultiListener::from_listeners([a, b]);

        a_tx.send(Ok(1)).unwrap();
        b_tx.send(Ok(2)).unwrap();

        let mut got = vec![
            listener.accept().await.unwrap(),
            listener.accept().await.unwrap(),
        ];
        got.sort();
        assert_eq!(got, vec![1, 2]);
        listener.close().unwrap();
    }

    #[tokio::test]
    async fn accept_error_is_tagged_and_loop_continues() {
        let (a, a_tx) = fed(1000);
        let listener = MultiListener::from_listeners([a]);

        a_tx.send(Err(io::Error::new(io::ErrorKind::Other, "transient"))).unwrap();
        a_tx.send(Ok(7)).unwrap();

        match listener.accept().await {
            Err(Error::Accept { addr, source }) => {
                assert_eq!(addr.to_string(), "127.0.0.1:1000");
                assert_eq!(source.to_string(), "transient");
            }
            other => panic!("expected accept error, got {:?}", other),
        }
        assert_eq!(listener.accept().await.unwrap(), 7);
        listener.close().unwrap();
    }

    #[tokio::test]
    async fn close_is_single_fire() {
        let (a, _a_tx) = fed(1000);
        let listener = MultiListener::from_listeners([a]);

        assert!(listener.close().is_ok());
        assert!(listener.is_closed());
        assert!(matches!(listener.close(), Err(Error::Closed)));
        assert!(matches!(listener.accept().await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn empty_listener_blocks_until_close() {
        let listener = Arc::new(MultiListener::<Fed>::from_listeners([]));
        assert!(listener.is_empty());
        assert_eq!(listener.addr().to_string(), "");

        let pending = {
            let listener = Arc::clone(&listener);
            tokio::spawn(async move { listener.accept().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        listener.close().unwrap();
        let res = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("accept should wake on close")
            .unwrap();
        assert!(matches!(res, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn fan_in_tasks_exit_after_close() {
        let (a, _a_tx) = fed(1000);
        let (b, _b_tx) = fed(2000);
        let listener = MultiListener::from_listeners([a, b]);

        listener.close().unwrap();
        tokio::time::timeout(Duration::from_secs(1), listener.wait_tasks())
            .await
            .expect("fan-in tasks should exit");
    }

    #[tokio::test]
    async fn out_of_band_close_is_reported() {
        let (a, _a_tx) = fed(1000);
        let (b, _b_tx) = fed(2000);
        let listener = MultiListener::from_listeners([a, b]);

        let first = listener.addresses()[0].clone();
        listener.child(&first).unwrap().close().unwrap();

        match listener.close() {
            Err(Error::Close(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.failures()[0].0, first);
            }
            other => panic!("expected close error, got {:?}", other),
        }
        for addr in listener.addresses() {
            assert!(listener.child(&addr).unwrap().closed.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn incoming_ends_on_close() {
        use futures_util::StreamExt;

        let (a, a_tx) = fed(1000);
        let listener = Arc::new(MultiListener::from_listeners([a]));
        a_tx.send(Ok(1)).unwrap();
        a_tx.send(Ok(2)).unwrap();

        let consumer = {
            let listener = Arc::clone(&listener);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut incoming = std::pin::pin!(listener.incoming());
                while let Some(res) = incoming.next().await {
                    seen.push(res.unwrap());
                    if seen.len() == 2 {
                        listener.close().unwrap();
                    }
                }
                seen
            })
        };

        let seen = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("stream should end after close")
            .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }
}
