//! Links between neighboring philosophers
//!
//! Each ring edge is two independent directional streams of capacity one,
//! one per direction. An [`Endpoint`] bundles the inbound half of one stream
//! with the outbound half of the other, so the philosopher on either side
//! reads forks from its neighbor and writes them back.

use crate::token::Fork;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Capacity of each directional stream
pub const LINK_CAPACITY: usize = 1;

/// One philosopher's view of a ring edge
#[derive(Debug)]
pub struct Endpoint {
    inbound: mpsc::Receiver<Fork>,
    outbound: mpsc::Sender<Fork>,
}

/// Create both ends of a ring edge
pub fn link() -> (Endpoint, Endpoint) {
    let (a_tx, b_rx) = mpsc::channel(LINK_CAPACITY);
    let (b_tx, a_rx) = mpsc::channel(LINK_CAPACITY);

    (
        Endpoint {
            inbound: a_rx,
            outbound: a_tx,
        },
        Endpoint {
            inbound: b_rx,
            outbound: b_tx,
        },
    )
}

impl Endpoint {
    /// Wait for the neighbor to hand over a fork
    ///
    /// Returns `None` once the neighbor's outbound half is gone.
    pub async fn take(&mut self) -> Option<Fork> {
        self.inbound.recv().await
    }

    /// Hand a fork to the neighbor, waiting for room in the stream
    ///
    /// Gives the fork back if the neighbor's inbound half is gone.
    pub async fn give(&self, fork: Fork) -> Result<(), Fork> {
        self.outbound.send(fork).await.map_err(|err| err.0)
    }

    /// Place a fork in flight toward the neighbor without waiting
    pub(crate) fn preload(&self, fork: Fork) -> Result<(), Fork> {
        self.outbound.try_send(fork).map_err(|err| match err {
            TrySendError::Full(fork) | TrySendError::Closed(fork) => fork,
        })
    }
}
