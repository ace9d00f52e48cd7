//! The participant group: one coordinator (rank 0) linked to every worker
//! (ranks `1..group_size`) by a FIFO point-to-point link.
//!
//! Links are either in-process channels, for a worker-task pool inside the
//! coordinator's runtime, or TCP sockets carrying length-delimited JSON
//! frames, for workers running as separate processes.

use std::{io, net::SocketAddr, pin::Pin};

use futures::{channel::mpsc, prelude::*};
use tarpc::{serde_transport::tcp, tokio_serde::formats::Json};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    message::{Assignment, Report, MAX_FRAME_LEN},
    Rank, COORDINATOR,
};

type BoxSink<T> = Pin<Box<dyn Sink<T, Error = io::Error> + Send>>;
type BoxStream<T> = Pin<Box<dyn Stream<Item = io::Result<T>> + Send>>;

/// The coordinator's end of the link to one worker.
pub type WorkerLink = Endpoint<Report, Assignment>;
/// A worker's end of the link to the coordinator.
pub type CoordinatorLink = Endpoint<Assignment, Report>;

/// One end of a link to `peer`: receives `In`, sends `Out`.
pub struct Endpoint<In, Out> {
    peer: Rank,
    tx: BoxSink<Out>,
    rx: BoxStream<In>,
}

impl<In, Out> Endpoint<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    fn from_channel(
        peer: Rank,
        tx: mpsc::UnboundedSender<Out>,
        rx: mpsc::UnboundedReceiver<In>,
    ) -> Self {
        Endpoint {
            peer,
            tx: Box::pin(tx.sink_map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))),
            rx: Box::pin(rx.map(Ok::<In, io::Error>)),
        }
    }

    fn from_duplex<T>(peer: Rank, duplex: T) -> Self
    where
        T: Stream<Item = io::Result<In>> + Sink<Out, Error = io::Error> + Send + 'static,
    {
        let (tx, rx) = duplex.split::<Out>();
        Endpoint {
            peer,
            tx: Box::pin(tx),
            rx: Box::pin(rx),
        }
    }

    pub fn peer(&self) -> Rank {
        self.peer
    }

    /// Hands `msg` to the link. Returns once it is queued or written, never
    /// waits for the peer.
    pub async fn send(&mut self, msg: Out) -> Result<()> {
        let peer = self.peer;
        self.tx
            .send(msg)
            .await
            .map_err(|source| Error::Transport { peer, source })
    }

    /// Blocks until the next message from the peer arrives.
    pub async fn recv(&mut self) -> Result<In> {
        match self.rx.next().await {
            Some(Ok(msg)) => Ok(msg),
            Some(Err(source)) => Err(Error::Transport {
                peer: self.peer,
                source,
            }),
            None => Err(Error::Disconnected { peer: self.peer }),
        }
    }
}

/// Builds an in-process group with `workers` workers. The first vector is the
/// coordinator's side indexed by `rank - 1`, the second the workers' side in
/// the same order.
pub fn local(workers: usize) -> (Vec<WorkerLink>, Vec<CoordinatorLink>) {
    (1..=workers)
        .map(|rank| {
            let (assign_tx, assign_rx) = mpsc::unbounded();
            let (report_tx, report_rx) = mpsc::unbounded();
            (
                Endpoint::from_channel(rank, assign_tx, report_rx),
                Endpoint::from_channel(COORDINATOR, report_tx, assign_rx),
            )
        })
        .unzip()
}

type CoordinatorCodec = Json<Report, Assignment>;

/// Accepts worker connections for the coordinator.
pub struct Listener {
    addr: SocketAddr,
    incoming: Pin<
        Box<tcp::Incoming<Report, Assignment, CoordinatorCodec, fn() -> CoordinatorCodec>>,
    >,
}

pub async fn bind(addr: SocketAddr) -> Result<Listener> {
    let mut incoming = tcp::listen(&addr, CoordinatorCodec::default as fn() -> CoordinatorCodec)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    incoming.config_mut().max_frame_length(MAX_FRAME_LEN);
    let addr = incoming.local_addr();
    info!(%addr, "listening for workers");
    Ok(Listener {
        addr,
        incoming: Box::pin(incoming),
    })
}

impl Listener {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits for exactly `workers` connections. Ranks follow accept order,
    /// starting at 1.
    pub async fn accept_workers(mut self, workers: usize) -> Result<Vec<WorkerLink>> {
        let transports = accept_n(self.addr, &mut self.incoming, workers).await?;
        let links = transports
            .into_iter()
            .enumerate()
            .map(|(i, transport)| {
                debug!(rank = i + 1, peer = ?transport.peer_addr().ok(), "worker connected");
                Endpoint::from_duplex(i + 1, transport)
            })
            .collect();
        info!(workers, "all workers connected");
        Ok(links)
    }
}

/// Takes `n` connections off `incoming`, in order.
async fn accept_n<T, S>(addr: SocketAddr, incoming: &mut S, n: usize) -> Result<Vec<T>>
where
    S: Stream<Item = io::Result<T>> + Unpin,
{
    let mut accepted = Vec::with_capacity(n);
    while accepted.len() < n {
        match incoming.next().await {
            Some(Ok(conn)) => accepted.push(conn),
            // a failed accept only loses that connection attempt
            Some(Err(e)) => warn!(error = %e, "failed to accept worker connection"),
            None => return Err(Error::ListenerClosed { addr }),
        }
    }
    Ok(accepted)
}

pub async fn connect(addr: SocketAddr) -> Result<CoordinatorLink> {
    let mut transport = tcp::connect(addr, Json::<Assignment, Report>::default);
    transport.config_mut().max_frame_length(MAX_FRAME_LEN);
    let transport = transport
        .await
        .map_err(|source| Error::Connect { addr, source })?;
    Ok(Endpoint::from_duplex(COORDINATOR, transport))
}
