//! Per-child accept loops feeding the shared delivery channel.
//!
//! # Responsibilities
//! - Accept on one child listener forever
//! - Hand every result, connection or error, to exactly one consumer
//! - Exit as soon as shutdown fires, dropping any undelivered result
//!
//! # Design Decisions
//! - The delivery channel has zero capacity: a result is only taken off the
//!   task by a consumer that is actually waiting in `accept`
//! - Accept errors do not end the loop; a child that keeps failing keeps
//!   delivering errors at the pace consumers take them

use std::io;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::net::{ListenAddr, Listener};

/// One accept result, tagged with the child that produced it.
#[derive(Debug)]
pub(crate) struct Delivery<C> {
    pub(crate) addr: ListenAddr,
    pub(crate) result: io::Result<C>,
}

/// Accept on `child` and deliver results until `shutdown` is cancelled.
pub(crate) async fn run<L: Listener>(
    child: Arc<L>,
    addr: ListenAddr,
    deliveries: flume::Sender<Delivery<L::Conn>>,
    shutdown: CancellationToken,
) {
    tracing::debug!(address = %addr, "Fan-in task started");

    loop {
        let result = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            res = child.accept() => res,
        };

        if let Err(e) = &result {
            tracing::debug!(address = %addr, error = %e, "Accept failed");
        }

        let delivery = Delivery {
            addr: addr.clone(),
            result,
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            sent = deliveries.send_async(delivery) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(address = %addr, "Fan-in task stopped");
}
