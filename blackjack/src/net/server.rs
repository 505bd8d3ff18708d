//! Connection dispatcher.
//!
//! The dealer listens on an OS-chosen TCP port, advertises it with UDP
//! offers and runs every accepted connection as a [`Session`] on its own
//! thread. Sessions share nothing with each other; a failing session only
//! ends its own connection.

use log::{error, info, warn};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    super::game::entities::ShuffledDecks,
    config::ProtocolConfig,
    discovery::{Broadcaster, BroadcasterHandle},
    errors::Result,
    messages::Offer,
    session::Session,
};

pub const DEFAULT_SERVER_NAME: &str = "Byte the Dealer";

/// How long shutdown waits to connect to the acceptor to wake it up.
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DealerConfig {
    /// Name advertised in offers. Truncated to 32 bytes on the wire.
    pub server_name: String,
    /// Interface to accept connections on. The port is always chosen by
    /// the OS.
    pub bind_ip: IpAddr,
    /// Broadcast address offers are sent to, on the discovery port.
    pub broadcast_addr: Ipv4Addr,
    /// Additional offer targets, e.g. subnet broadcast addresses.
    pub extra_targets: Vec<SocketAddr>,
    /// Seed for reproducible shuffles. Session `n` uses `seed + n`.
    pub seed: Option<u64>,
    pub broadcast: bool,
    pub protocol: ProtocolConfig,
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.into(),
            bind_ip: Ipv4Addr::UNSPECIFIED.into(),
            broadcast_addr: Ipv4Addr::BROADCAST,
            extra_targets: Vec::new(),
            seed: None,
            broadcast: true,
            protocol: ProtocolConfig::default(),
        }
    }
}

impl DealerConfig {
    /// Everywhere offers are sent.
    #[must_use]
    pub fn offer_targets(&self) -> Vec<SocketAddr> {
        let broadcast = SocketAddrV4::new(self.broadcast_addr, self.protocol.discovery_port);
        let mut targets = vec![SocketAddr::from(broadcast)];
        targets.extend(self.extra_targets.iter().copied());
        targets
    }

    /// Deck source for the `id`th session.
    #[must_use]
    pub fn decks_for(&self, id: usize) -> ShuffledDecks {
        match self.seed {
            Some(seed) => ShuffledDecks::seeded(seed.wrapping_add(id as u64)),
            None => ShuffledDecks::new(),
        }
    }
}

/// Streams of running sessions by id, used to close them on shutdown.
/// Each session removes its own entry as it ends.
type OpenSessions = Arc<Mutex<HashMap<usize, TcpStream>>>;

fn lock(open: &OpenSessions) -> MutexGuard<'_, HashMap<usize, TcpStream>> {
    // A panicking session can't leave the map half-updated.
    open.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stops a running dealer from another thread.
#[derive(Clone, Debug)]
pub struct DealerHandle {
    stop: Arc<AtomicBool>,
    open: OpenSessions,
    wake_addr: SocketAddr,
}

impl DealerHandle {
    /// Ask the dealer to stop accepting. `Dealer::run` then closes the
    /// open sessions and returns.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        // Unblock the acceptor; the connection itself is discarded.
        if let Err(error) = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT) {
            warn!("couldn't wake the acceptor at {}: {error}", self.wake_addr);
        }
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Number of sessions whose connection is still open.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        lock(&self.open).len()
    }
}

/// A bound dealer, ready to run.
pub struct Dealer {
    listener: TcpListener,
    config: DealerConfig,
    stop: Arc<AtomicBool>,
    open: OpenSessions,
}

impl Dealer {
    /// Bind the listening socket. This is the only failure that stops
    /// the dealer from starting.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the TCP port can't be bound.
    pub fn bind(config: DealerConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(config.bind_ip, 0))?;
        Ok(Self {
            listener,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            open: OpenSessions::default(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn handle(&self) -> Result<DealerHandle> {
        let addr = self.local_addr()?;
        let wake_ip = match addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => Ipv4Addr::LOCALHOST.into(),
            IpAddr::V6(ip) if ip.is_unspecified() => Ipv6Addr::LOCALHOST.into(),
            ip => ip,
        };
        Ok(DealerHandle {
            stop: self.stop.clone(),
            open: self.open.clone(),
            wake_addr: SocketAddr::new(wake_ip, addr.port()),
        })
    }

    /// Accept connections until shut down, one session thread each.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the broadcast socket can't be set up.
    /// Failed accepts and failed sessions are logged, not returned.
    pub fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!("{} listening on {addr}", self.config.server_name);

        let broadcaster = if self.config.broadcast {
            let offer = Offer {
                tcp_port: addr.port(),
                server_name: self.config.server_name.as_str().into(),
            };
            let broadcaster =
                Broadcaster::new(&self.config.protocol, &offer, self.config.offer_targets())?;
            Some(broadcaster.spawn()?)
        } else {
            None
        };

        let mut threads: Vec<JoinHandle<()>> = Vec::new();
        let mut next_id = 0;
        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::Acquire) {
                break;
            }
            reap(&mut threads);
            match stream {
                Ok(stream) => {
                    let id = next_id;
                    next_id += 1;
                    if let Some(thread) = self.start_session(id, stream) {
                        threads.push(thread);
                    }
                }
                Err(error) => error!("couldn't accept connection: {error}"),
            }
        }

        self.shutdown(broadcaster, threads);
        Ok(())
    }

    fn start_session(&self, id: usize, stream: TcpStream) -> Option<JoinHandle<()>> {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| String::from("unknown peer"), |addr| addr.to_string());
        let closer = match stream.try_clone() {
            Ok(closer) => closer,
            Err(error) => {
                error!("couldn't start session {id} for {peer}: {error}");
                return None;
            }
        };
        lock(&self.open).insert(id, closer);

        let mut session = Session::new(id, stream, &self.config.protocol, self.config.decks_for(id));
        let open = self.open.clone();
        let spawned = thread::Builder::new()
            .name(format!("session-{id}"))
            .spawn(move || {
                // Failures are logged by the session itself.
                let _ = session.run();
                lock(&open).remove(&id);
            });
        match spawned {
            Ok(thread) => {
                info!("session {id} started for {peer}");
                Some(thread)
            }
            Err(error) => {
                error!("couldn't spawn session {id} for {peer}: {error}");
                lock(&self.open).remove(&id);
                None
            }
        }
    }

    /// Stop offers, close every open connection and wait for the session
    /// threads.
    fn shutdown(&self, broadcaster: Option<BroadcasterHandle>, threads: Vec<JoinHandle<()>>) {
        if let Some(broadcaster) = broadcaster {
            broadcaster.stop();
        }
        let open: Vec<TcpStream> = lock(&self.open).drain().map(|(_, stream)| stream).collect();
        info!("shutting down with {} open session(s)", open.len());
        for stream in open {
            let _ = stream.shutdown(Shutdown::Both);
        }
        for thread in threads {
            join(thread);
        }
    }
}

/// Join session threads that already finished.
fn reap(threads: &mut Vec<JoinHandle<()>>) {
    let (finished, running): (Vec<_>, Vec<_>) =
        threads.drain(..).partition(JoinHandle::is_finished);
    for thread in finished {
        join(thread);
    }
    *threads = running;
}

fn join(thread: JoinHandle<()>) {
    if let Err(error) = thread.join() {
        error!("session thread panicked: {error:?}");
    }
}

/// Bind and run a dealer until it is shut down.
///
/// # Errors
///
/// Same as [`Dealer::bind`] and [`Dealer::run`].
pub fn run(config: DealerConfig) -> Result<()> {
    Dealer::bind(config)?.run()
}
