use super::frame::{Frame, StompCodec, StompItem};
use crate::{
    apis::auth::Token,
    common::{DEFAULT_TIMEOUT, STOMP_PORT},
    config::Environment,
    error::{Error, TransportError},
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    io,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    task::{Context, Poll},
    time::Duration,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, Interval},
};
use tokio_rustls::{
    rustls::{self, crypto::CryptoProvider, pki_types::ServerName, ClientConfig, RootCertStore},
    TlsConnector,
};
use tokio_util::{codec::Framed, sync::CancellationToken};
use uuid::Uuid;

const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(5);

/// Settings of a [`StompSubscriber`].
#[derive(Debug, Clone)]
pub struct StompConfig {
    pub environment: Environment,
    pub username: String,
    pub password: Token,
    /// Sent as `client-id` on `CONNECT`.
    pub client_id: String,
    /// Broker host. Defaults to `mq-<environment>.coreledger.io`.
    pub host: Option<String>,
    pub port: u16,
    /// Heartbeat interval offered to the broker, in both directions.
    /// `Duration::ZERO` disables heartbeats.
    pub heartbeat: Duration,
}

impl StompConfig {
    pub fn new(
        environment: Environment,
        username: impl Into<String>,
        password: impl Into<Token>,
    ) -> Self {
        Self {
            environment,
            username: username.into(),
            password: password.into(),
            client_id: format!("{}-{}", env!("CARGO_PKG_NAME"), Uuid::new_v4()),
            host: None,
            port: STOMP_PORT,
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }

    /// Host the subscriber connects to.
    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| self.environment.message_queue_host())
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

type Routes = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<Frame>>>>;

/// A live connection to the CoreLedger message broker.
///
/// Frames are written by a single background task and incoming `MESSAGE` frames are
/// dispatched to the matching [`Subscription`] by a second one, so the subscriber can be
/// shared between tasks behind an `Arc`.
///
/// There is no automatic reconnection: once the connection drops, every operation fails
/// with [`TransportError::ConnectionClosed`](crate::error::TransportError::ConnectionClosed)
/// and a new subscriber must be connected.
pub struct StompSubscriber {
    outbound: mpsc::UnboundedSender<StompItem>,
    routes: Routes,
    next_id: AtomicU64,
    closed: CancellationToken,
    reader: JoinHandle<()>,
    writer: Option<JoinHandle<()>>,
}

impl StompSubscriber {
    /// Opens a TLS connection to the broker and performs the STOMP handshake.
    #[tracing::instrument(name = "STOMP Connect", skip(config), fields(host = %config.host(), port = config.port))]
    pub async fn connect(config: StompConfig) -> Result<Self, Error> {
        let host = config.host();

        let tcp = tokio::time::timeout(
            DEFAULT_TIMEOUT,
            TcpStream::connect((host.as_str(), config.port)),
        )
        .await
        .map_err(|_| timed_out("connecting to the message broker"))??;

        let server_name =
            ServerName::try_from(host).map_err(|e| TransportError::Tls(e.to_string()))?;
        let tls = TlsConnector::from(Arc::new(tls_config()?))
            .connect(server_name, tcp)
            .await?;

        Self::connect_with_stream(config, tls).await
    }

    /// Performs the STOMP handshake over an already established stream.
    pub async fn connect_with_stream<S>(config: StompConfig, stream: S) -> Result<Self, Error>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let mut framed = Framed::new(stream, StompCodec);
        let heartbeat = config.heartbeat.as_millis();

        let connect = Frame::new("CONNECT")
            .with_header("accept-version", "1.2")
            .with_header("host", config.host())
            .with_header("login", config.username.as_str())
            .with_header("passcode", config.password.expose_secret())
            .with_header("heart-beat", format!("{},{}", heartbeat, heartbeat))
            .with_header("client-id", config.client_id.as_str());
        framed.send(StompItem::Frame(connect)).await?;

        let reply = tokio::time::timeout(DEFAULT_TIMEOUT, next_frame(&mut framed))
            .await
            .map_err(|_| timed_out("waiting for CONNECTED"))??;
        match reply.command.as_str() {
            "CONNECTED" => {}
            "ERROR" => return Err(TransportError::Broker(error_message(&reply)).into()),
            other => {
                return Err(TransportError::Broker(format!(
                    "unexpected {} frame during handshake",
                    other
                ))
                .into())
            }
        }

        let (send_every, receive_within) =
            negotiate_heartbeat(config.heartbeat, reply.header("heart-beat"));
        tracing::info!(
            server = reply.header("server").unwrap_or_default(),
            ?send_every,
            ?receive_within,
            "Connected to the message broker"
        );

        let (sink, stream) = framed.split();
        let (outbound, rx) = mpsc::unbounded_channel();
        let routes = Routes::default();
        let closed = CancellationToken::new();

        let writer = tokio::spawn(write_loop(sink, rx, send_every, closed.clone()));
        let reader = tokio::spawn(read_loop(
            stream,
            receive_within,
            routes.clone(),
            closed.clone(),
        ));

        Ok(Self {
            outbound,
            routes,
            next_id: AtomicU64::new(0),
            closed,
            reader,
            writer: Some(writer),
        })
    }

    /// Subscribes to `/topic/<topic>` with automatic acknowledgement.
    pub fn subscribe(&self, topic: &str) -> Result<Subscription, Error> {
        let id = format!("sub-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let destination = format!("/topic/{}", topic);

        let (tx, rx) = mpsc::unbounded_channel();
        self.routes().insert(id.clone(), tx);

        let frame = Frame::new("SUBSCRIBE")
            .with_header("destination", destination.as_str())
            .with_header("id", id.as_str())
            .with_header("ack", "auto");
        if let Err(e) = self.send(frame) {
            self.routes().remove(&id);
            return Err(e);
        }

        tracing::debug!(id = %id, destination = %destination, "Subscribed");
        Ok(Subscription {
            id,
            destination,
            rx,
        })
    }

    /// Ends a subscription. Messages still buffered in the handle are dropped with it.
    pub fn unsubscribe(&self, subscription: Subscription) -> Result<(), Error> {
        self.routes().remove(&subscription.id);
        self.send(Frame::new("UNSUBSCRIBE").with_header("id", subscription.id.as_str()))
    }

    /// Sends `DISCONNECT` and closes the connection once every queued frame is written.
    pub async fn disconnect(mut self) -> Result<(), Error> {
        let sent = self.send(Frame::new("DISCONNECT"));

        if let Some(writer) = self.writer.take() {
            if tokio::time::timeout(DEFAULT_TIMEOUT, writer).await.is_err() {
                tracing::warn!("Timed out flushing the STOMP connection");
            }
        }
        self.closed.cancel();

        sent
    }

    /// Returns `false` once the connection is gone.
    pub fn is_connected(&self) -> bool {
        !self.closed.is_cancelled()
    }

    /// Completes when the connection is closed, for whatever reason.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    fn send(&self, frame: Frame) -> Result<(), Error> {
        if self.closed.is_cancelled() {
            return Err(TransportError::ConnectionClosed.into());
        }

        self.outbound
            .send(StompItem::Frame(frame))
            .map_err(|_| TransportError::ConnectionClosed.into())
    }

    fn routes(&self) -> std::sync::MutexGuard<'_, HashMap<String, mpsc::UnboundedSender<Frame>>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for StompSubscriber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StompSubscriber")
            .field("connected", &self.is_connected())
            .field("subscriptions", &self.routes().len())
            .finish_non_exhaustive()
    }
}

impl Drop for StompSubscriber {
    fn drop(&mut self) {
        self.closed.cancel();
        self.reader.abort();
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
    }
}

/// Messages delivered to a single subscription.
///
/// The stream ends when the subscriber connection is closed.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    destination: String,
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Waits for the next `MESSAGE` frame.
    pub async fn next_message(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = Frame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        self.rx.poll_recv(cx)
    }
}

fn timed_out(what: &str) -> Error {
    TransportError::Io(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timed out {}", what),
    ))
    .into()
}

fn error_message(frame: &Frame) -> String {
    match frame.header("message") {
        Some(message) => message.to_string(),
        None => frame.body_text().trim().to_string(),
    }
}

async fn next_frame<S>(stream: &mut S) -> Result<Frame, Error>
where
    S: Stream<Item = io::Result<StompItem>> + Unpin,
{
    loop {
        match stream.next().await {
            Some(Ok(StompItem::Heartbeat)) => continue,
            Some(Ok(StompItem::Frame(frame))) => return Ok(frame),
            Some(Err(e)) => return Err(e.into()),
            None => return Err(TransportError::ConnectionClosed.into()),
        }
    }
}

/// Returns how often to send heartbeats and how long the broker may stay silent.
fn negotiate_heartbeat(
    ours: Duration,
    theirs: Option<&str>,
) -> (Option<Duration>, Option<Duration>) {
    let (server_sends, server_wants) = theirs
        .and_then(|value| {
            let (sx, sy) = value.split_once(',')?;
            Some((sx.trim().parse::<u64>().ok()?, sy.trim().parse::<u64>().ok()?))
        })
        .unwrap_or((0, 0));
    let ours = ours.as_millis() as u64;

    let interval = |a: u64, b: u64| {
        if a == 0 || b == 0 {
            None
        } else {
            Some(Duration::from_millis(a.max(b)))
        }
    };

    (
        interval(ours, server_wants),
        interval(ours, server_sends),
    )
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn write_loop<W>(
    mut sink: W,
    mut rx: mpsc::UnboundedReceiver<StompItem>,
    send_every: Option<Duration>,
    closed: CancellationToken,
) where
    W: Sink<StompItem, Error = io::Error> + Unpin,
{
    let mut heartbeat =
        send_every.map(|every| tokio::time::interval_at(Instant::now() + every, every));

    loop {
        let item = tokio::select! {
            biased;
            item = rx.recv() => match item {
                Some(item) => item,
                None => break,
            },
            _ = closed.cancelled() => break,
            _ = tick(&mut heartbeat) => StompItem::Heartbeat,
        };

        let last = matches!(&item, StompItem::Frame(frame) if frame.command == "DISCONNECT");
        if let Err(e) = sink.send(item).await {
            tracing::warn!("Failed writing to the message broker: {}", e);
            break;
        }
        if last {
            break;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!("Error closing the STOMP connection: {}", e);
    }
    closed.cancel();
}

async fn read_loop<R>(
    mut stream: R,
    receive_within: Option<Duration>,
    routes: Routes,
    closed: CancellationToken,
) where
    R: Stream<Item = io::Result<StompItem>> + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = closed.cancelled() => break,
            next = next_item(&mut stream, receive_within) => next,
        };

        match next {
            Ok(Some(StompItem::Heartbeat)) => {}
            Ok(Some(StompItem::Frame(frame))) => match frame.command.as_str() {
                "MESSAGE" => route(&routes, frame),
                "ERROR" => {
                    tracing::error!("Message broker error: {}", error_message(&frame));
                    break;
                }
                other => tracing::debug!("Ignoring {} frame", other),
            },
            Ok(None) => {
                tracing::info!("Message broker closed the connection");
                break;
            }
            Err(e) => {
                tracing::warn!("Message broker connection lost: {}", e);
                break;
            }
        }
    }

    closed.cancel();
    routes.lock().unwrap_or_else(PoisonError::into_inner).clear();
}

async fn next_item<R>(stream: &mut R, within: Option<Duration>) -> io::Result<Option<StompItem>>
where
    R: Stream<Item = io::Result<StompItem>> + Unpin,
{
    match within {
        Some(within) => match tokio::time::timeout(within * 2, stream.next()).await {
            Ok(item) => item.transpose(),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "no heartbeat from the message broker",
            )),
        },
        None => stream.next().await.transpose(),
    }
}

fn route(routes: &Routes, frame: Frame) {
    let mut routes = routes.lock().unwrap_or_else(PoisonError::into_inner);

    let id = match frame.header("subscription") {
        Some(id) => id.to_string(),
        None => {
            tracing::warn!("Dropping MESSAGE without subscription header");
            return;
        }
    };

    match routes.get(&id) {
        Some(tx) => {
            if tx.send(frame).is_err() {
                routes.remove(&id);
            }
        }
        None => tracing::debug!(subscription = %id, "Dropping MESSAGE for unknown subscription"),
    }
}

fn tls_config() -> Result<ClientConfig, Error> {
    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        tracing::warn!("Failed to load a native root certificate: {}", e);
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    tracing::debug!(added, ignored, "Loaded native root certificates");
    if roots.is_empty() {
        return Err(TransportError::Tls("no trusted root certificates found".to_string()).into());
    }

    let provider = CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()));

    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| TransportError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}
