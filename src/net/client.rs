//! Streaming transport: a queue drained by a background UDP sender.
//!
//! The input thread only ever enqueues. A Tokio task owns the socket, encodes
//! each event and sends it to the current endpoint. The endpoint is resolved
//! by a separate one-shot task whose outcome comes back on a result channel;
//! until it lands, queued events are dropped and the first drop of each
//! unconfigured stretch is reported.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use bytes::BytesMut;
use log::{debug, error, info, warn};
use tokio::net::{lookup_host, UdpSocket};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};

use super::codec::{NetEvent, BUTTON_LEN};
use crate::error::TransportError;
use crate::input::{OutputSink, PointerEvent};

/// Producer side of the tablet transport. Cheap to clone.
#[derive(Clone, Debug)]
pub struct NetworkClient {
    queue: mpsc::UnboundedSender<NetEvent>,
    endpoint: Arc<watch::Sender<Option<SocketAddr>>>,
    runtime: Handle,
}

impl NetworkClient {
    /// Starts the sender task on `runtime`.
    ///
    /// Returns the client and the receiver of asynchronous transport errors.
    /// The task stops once every clone of the client is dropped.
    pub fn spawn(runtime: &Handle) -> (Self, mpsc::UnboundedReceiver<TransportError>) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (endpoint_tx, endpoint_rx) = watch::channel(None);
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_sender(queue_rx, endpoint_rx, report_tx));

        let client = Self {
            queue: queue_tx,
            endpoint: Arc::new(endpoint_tx),
            runtime: runtime.clone(),
        };
        (client, report_rx)
    }

    /// Queues one event for sending. Never blocks.
    pub fn enqueue(&self, event: NetEvent) -> Result<(), TransportError> {
        self.queue.send(event).map_err(|_| TransportError::Closed)
    }

    /// Resolves `host:port` in the background and switches the sender to it.
    ///
    /// The outcome is delivered on the returned channel. Events queued before
    /// it completes go to the previous endpoint, or are dropped if none.
    pub fn reconfigure(
        &self,
        host: impl Into<String>,
        port: u16,
    ) -> oneshot::Receiver<Result<SocketAddr, TransportError>> {
        let host = host.into();
        let endpoint = Arc::clone(&self.endpoint);
        let (result_tx, result_rx) = oneshot::channel();

        self.runtime.spawn(async move {
            let result = resolve(&host, port).await;
            match &result {
                Ok(addr) => {
                    info!("Tablet endpoint {}:{} resolved to {}", host, port, addr);
                    endpoint.send_replace(Some(*addr));
                }
                Err(e) => error!("Tablet endpoint configuration failed: {}", e),
            }
            if result_tx.send(result).is_err() {
                debug!("Nobody waiting for endpoint configuration result");
            }
        });

        result_rx
    }

    /// Switches the sender to an already known address.
    pub fn set_endpoint(&self, addr: SocketAddr) {
        self.endpoint.send_replace(Some(addr));
    }

    pub fn endpoint(&self) -> Option<SocketAddr> {
        *self.endpoint.borrow()
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let mut addrs = lookup_host((host, port))
        .await
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            source,
        })?;
    addrs
        .next()
        .ok_or_else(|| TransportError::NoAddress(host.to_string()))
}

async fn bind_for(addr: SocketAddr) -> Result<UdpSocket, TransportError> {
    let local = if addr.is_ipv6() {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    };
    UdpSocket::bind(local).await.map_err(TransportError::Bind)
}

fn report(reports: &mpsc::UnboundedSender<TransportError>, err: TransportError) {
    if reports.send(err).is_err() {
        debug!("Transport report receiver dropped");
    }
}

/// Failures already reported. Each is reported once until it clears.
#[derive(Debug, Default)]
struct FailureReports {
    unconfigured: bool,
    bind_failed_for: Option<SocketAddr>,
}

impl FailureReports {
    fn first_unconfigured(&mut self) -> bool {
        !std::mem::replace(&mut self.unconfigured, true)
    }

    fn configured(&mut self) {
        self.unconfigured = false;
    }

    fn first_bind_failure(&mut self, addr: SocketAddr) -> bool {
        self.bind_failed_for.replace(addr) != Some(addr)
    }

    fn bound(&mut self) {
        self.bind_failed_for = None;
    }
}

async fn run_sender(
    mut queue: mpsc::UnboundedReceiver<NetEvent>,
    endpoint: watch::Receiver<Option<SocketAddr>>,
    reports: mpsc::UnboundedSender<TransportError>,
) {
    info!("Tablet sender started");

    let mut socket: Option<UdpSocket> = None;
    let mut failures = FailureReports::default();
    let mut buf = BytesMut::with_capacity(BUTTON_LEN);

    while let Some(event) = queue.recv().await {
        let current = *endpoint.borrow();
        let Some(addr) = current else {
            if failures.first_unconfigured() {
                warn!("Tablet endpoint not configured, dropping events");
                report(&reports, TransportError::NotConfigured);
            }
            continue;
        };
        failures.configured();

        let family_matches = socket
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .is_some_and(|local| local.is_ipv6() == addr.is_ipv6());
        if !family_matches {
            match bind_for(addr).await {
                Ok(bound) => {
                    failures.bound();
                    socket = Some(bound);
                }
                Err(e) => {
                    if failures.first_bind_failure(addr) {
                        error!("{}", e);
                        report(&reports, e);
                    } else {
                        debug!("Still unable to bind for {}: {}", addr, e);
                    }
                    continue;
                }
            }
        }

        buf.clear();
        event.encode(&mut buf);
        if let Some(sock) = socket.as_ref() {
            if let Err(source) = sock.send_to(&buf, addr).await {
                warn!("Failed to send tablet event to {}: {}", addr, source);
                report(&reports, TransportError::Send { addr, source });
            }
        }
    }

    info!("Tablet sender stopped");
}

/// Output sink streaming every event to the tablet transport.
#[derive(Debug, Clone)]
pub struct NetworkSink {
    client: NetworkClient,
}

impl NetworkSink {
    pub fn new(client: NetworkClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &NetworkClient {
        &self.client
    }
}

impl OutputSink for NetworkSink {
    fn deliver(&mut self, events: &[PointerEvent]) {
        for event in events {
            if let Err(e) = self.client.enqueue(NetEvent::from(event)) {
                warn!("Dropping {} tablet events: {}", events.len(), e);
                break;
            }
        }
    }
}
