//! UDP offer broadcasting and listening.

use log::{debug, info, warn};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use super::{
    codec::{Codec, WireMessage},
    config::ProtocolConfig,
    errors::{NetworkError, Result},
    messages::Offer,
};

/// Periodically sends the same Offer datagram to a fixed set of targets.
pub struct Broadcaster {
    socket: UdpSocket,
    targets: Vec<SocketAddr>,
    datagram: Vec<u8>,
    interval: Duration,
}

impl Broadcaster {
    /// Bind an ephemeral broadcast-enabled socket. `targets` are usually
    /// the limited broadcast address on the discovery port, plus any
    /// subnet broadcast addresses.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the socket can't be bound or put in
    /// broadcast mode.
    pub fn new(config: &ProtocolConfig, offer: &Offer, targets: Vec<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            targets,
            datagram: config.codec().encode(offer),
            interval: config.offer_interval,
        })
    }

    /// The default target: 255.255.255.255 on the discovery port.
    #[must_use]
    pub fn default_target(config: &ProtocolConfig) -> SocketAddr {
        SocketAddrV4::new(Ipv4Addr::BROADCAST, config.discovery_port).into()
    }

    /// Send one Offer to every target and return how many sends
    /// succeeded. Failed targets are logged and skipped.
    pub fn broadcast_once(&self) -> usize {
        let mut sent = 0;
        for target in &self.targets {
            match self.socket.send_to(&self.datagram, target) {
                Ok(_) => sent += 1,
                Err(error) => warn!("couldn't send offer to {target}: {error}"),
            }
        }
        sent
    }

    /// Broadcast every interval on a background thread until stopped.
    pub fn spawn(self) -> io::Result<BroadcasterHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread = thread::Builder::new()
            .name("offer-broadcaster".into())
            .spawn(move || {
                info!(
                    "broadcasting offers to {} target(s) every {:?}",
                    self.targets.len(),
                    self.interval
                );
                let mut next_tick = Instant::now();
                while !thread_stop.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now >= next_tick {
                        self.broadcast_once();
                        next_tick = now + self.interval;
                    }
                    thread::park_timeout(next_tick.saturating_duration_since(Instant::now()));
                }
                debug!("offer broadcaster stopped");
            })?;
        Ok(BroadcasterHandle { stop, thread })
    }
}

/// Controls a running broadcaster thread.
pub struct BroadcasterHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl BroadcasterHandle {
    /// Stop broadcasting and wait for the thread to exit.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Release);
        self.thread.thread().unpark();
        if self.thread.join().is_err() {
            warn!("offer broadcaster panicked");
        }
    }
}

/// A dealer found through an Offer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiscoveredDealer {
    /// Sender IP combined with the advertised TCP port.
    pub addr: SocketAddr,
    pub name: String,
}

/// Receives Offers on a UDP socket.
pub struct OfferListener {
    socket: UdpSocket,
    codec: Codec,
}

impl OfferListener {
    /// Listen on the discovery port on all interfaces.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the port is taken.
    pub fn bind(config: &ProtocolConfig) -> Result<Self> {
        Self::bind_to(
            SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.discovery_port).into(),
            config,
        )
    }

    pub fn bind_to(addr: SocketAddr, config: &ProtocolConfig) -> Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind(addr)?,
            codec: config.codec(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait for the next valid Offer. Datagrams that don't decode are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::Timeout` if no valid Offer arrives in time,
    /// or another `NetworkError` if the socket fails.
    pub fn next_offer(&self, timeout: Duration) -> Result<DiscoveredDealer> {
        let deadline = Instant::now() + timeout;
        let mut buf = [0; 2 * Offer::SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(NetworkError::Timeout.into());
            }
            self.socket.set_read_timeout(Some(remaining))?;
            let (len, sender) = self.socket.recv_from(&mut buf)?;
            match self.codec.decode::<Offer>(&buf[..len]) {
                Ok(offer) => {
                    let addr = SocketAddr::new(sender.ip(), offer.tcp_port);
                    let name = offer.server_name.to_string();
                    debug!("received offer from {name} at {addr}");
                    return Ok(DiscoveredDealer { addr, name });
                }
                Err(error) => debug!("ignoring datagram from {sender}: {error}"),
            }
        }
    }
}

/// Bind the discovery port and return the first dealer heard from.
///
/// # Errors
///
/// Same as [`OfferListener::bind`] and [`OfferListener::next_offer`].
pub fn listen_for_offer(config: &ProtocolConfig, timeout: Duration) -> Result<DiscoveredDealer> {
    OfferListener::bind(config)?.next_offer(timeout)
}
