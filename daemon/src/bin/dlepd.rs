//! `dlepd`: the DLEP router/radio daemon binary.
//!
//! Wires `dlep-config`'s loaded `DaemonConfig`, an `ExtensionRegistry`
//! carrying the baseline and metrics extensions, and one `dlep_network::Interface`
//! per configured interface together with real `tokio` UDP/TCP sockets. Every
//! protocol decision lives in `Interface`; this binary's job is only to turn
//! socket events into `Interface` method calls and `InterfaceEvent`s back into
//! socket writes, per spec §5's "interface controller never touches a socket
//! itself" resource discipline.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;

use dlep_config::InterfaceConfig;
use dlep_extensions::{base::BaseExtension, metrics::MetricsExtension, ExtensionRegistry};
use dlep_types::layer2::{InMemoryLayer2Store, Layer2Store};

use dlep_network::{Interface, InterfaceEvent};

/// The well-known DLEP discovery multicast group (RFC 8175 §5.1).
const DLEP_MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 117);

#[derive(Parser, Debug)]
#[command(name = "dlepd", about = "DLEP router/radio session daemon")]
struct Cli {
    /// Path to the TOML daemon config file.
    #[arg(short, long, default_value = "dlepd.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dlep_daemon=info,dlep_network=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = dlep_config::load_from_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config))?;

    if config.interfaces.is_empty() {
        tracing::warn!("no interfaces configured, nothing to do");
        return Ok(());
    }

    let registry = Arc::new(build_registry());
    let store: Arc<dyn Layer2Store> = Arc::new(InMemoryLayer2Store::new());

    let mut handles = Vec::new();
    for iface_config in config.interfaces {
        let registry = registry.clone();
        let store = store.clone();
        let name = iface_config.interface.clone();
        handles.push(tokio::spawn(async move {
            if let Err(err) = run_interface(iface_config, registry, store).await {
                tracing::error!(interface = %name, %err, "interface task exited");
            }
        }));
    }

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    tracing::info!("shutdown signal received, stopping interfaces");
    for handle in handles {
        handle.abort();
    }

    Ok(())
}

fn build_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register(Arc::new(BaseExtension));
    registry.register(Arc::new(MetricsExtension));
    registry
}

/// Internal events feeding one interface's single event loop. Every socket
/// and timer in this file is just a producer into this channel — the
/// `Interface` itself is only ever touched from the loop in [`run_interface`],
/// matching spec §5's single-actor-per-interface model.
enum IfaceMsg {
    Udp(SocketAddr, Vec<u8>),
    TcpAccepted(SocketAddr, TcpStream),
    TcpConnected(SocketAddr, TcpStream),
    TcpData(SocketAddr, Vec<u8>),
    TcpClosed(SocketAddr),
    Tick,
}

async fn run_interface(
    config: InterfaceConfig,
    registry: Arc<ExtensionRegistry>,
    store: Arc<dyn Layer2Store>,
) -> Result<()> {
    let name = config.interface.clone();

    let udp_socket = Arc::new(
        UdpSocket::bind(("0.0.0.0", config.discovery_port))
            .await
            .with_context(|| format!("binding discovery socket on {name}"))?,
    );
    udp_socket
        .join_multicast_v4(DLEP_MULTICAST_GROUP, Ipv4Addr::UNSPECIFIED)
        .with_context(|| format!("joining discovery multicast group on {name}"))?;
    let multicast_addr = SocketAddr::new(IpAddr::V4(DLEP_MULTICAST_GROUP), config.discovery_port);
    let local_udp_addr = udp_socket.local_addr()?;

    let tcp_listener = if config.radio {
        Some(
            TcpListener::bind(("0.0.0.0", config.session_port))
                .await
                .with_context(|| format!("binding session listener on {name}"))?,
        )
    } else {
        None
    };

    let mut iface = Interface::new(name.clone(), config.clone(), registry, store, local_udp_addr, Instant::now());
    tracing::info!(interface = %name, role = ?iface.role(), discovery_port = config.discovery_port, "interface started");

    let (tx, mut rx) = mpsc::unbounded_channel::<IfaceMsg>();

    spawn_udp_reader(udp_socket.clone(), tx.clone());
    if let Some(listener) = tcp_listener {
        spawn_tcp_acceptor(listener, tx.clone());
    }
    spawn_ticker(&config, tx.clone());

    let mut writers: HashMap<SocketAddr, mpsc::UnboundedSender<Vec<u8>>> = HashMap::new();
    let mut read_buffers: HashMap<SocketAddr, Vec<u8>> = HashMap::new();

    while let Some(msg) = rx.recv().await {
        let now = Instant::now();
        match msg {
            IfaceMsg::Udp(from, datagram) => match iface.on_udp_datagram(from, &datagram) {
                Ok(events) => apply_events(events, &udp_socket, multicast_addr, &mut writers, &tx).await,
                Err(err) => tracing::debug!(interface = %name, %from, %err, "dropped malformed discovery datagram"),
            },
            IfaceMsg::TcpAccepted(addr, stream) => {
                spawn_tcp_io(addr, stream, tx.clone(), &mut writers);
                if let Some(init) = iface.on_tcp_connected(addr, now) {
                    send_tcp(&writers, addr, init);
                }
            }
            IfaceMsg::TcpConnected(addr, stream) => {
                spawn_tcp_io(addr, stream, tx.clone(), &mut writers);
                if let Some(init) = iface.on_tcp_connected(addr, now) {
                    send_tcp(&writers, addr, init);
                }
            }
            IfaceMsg::TcpData(addr, chunk) => {
                let buf = read_buffers.entry(addr).or_default();
                buf.extend_from_slice(&chunk);
                let (events, consumed) = iface.on_tcp_data(addr, buf, now);
                if consumed > 0 {
                    buf.drain(..consumed);
                }
                apply_events(events, &udp_socket, multicast_addr, &mut writers, &tx).await;
            }
            IfaceMsg::TcpClosed(addr) => {
                tracing::info!(interface = %name, %addr, "tcp session closed");
                writers.remove(&addr);
                read_buffers.remove(&addr);
            }
            IfaceMsg::Tick => {
                let events = iface.tick(now);
                apply_events(events, &udp_socket, multicast_addr, &mut writers, &tx).await;
            }
        }
    }

    Ok(())
}

fn spawn_udp_reader(socket: Arc<UdpSocket>, tx: mpsc::UnboundedSender<IfaceMsg>) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 65536];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    if tx.send(IfaceMsg::Udp(from, buf[..len].to_vec())).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "discovery socket read error");
                    break;
                }
            }
        }
    });
}

fn spawn_tcp_acceptor(listener: TcpListener, tx: mpsc::UnboundedSender<IfaceMsg>) {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    if tx.send(IfaceMsg::TcpAccepted(addr, stream)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "session listener accept error");
                    break;
                }
            }
        }
    });
}

/// Drive `Interface::tick` at the finer of the discovery and heartbeat
/// intervals, so neither timer drifts more than one tick late.
fn spawn_ticker(config: &InterfaceConfig, tx: mpsc::UnboundedSender<IfaceMsg>) {
    let period = config
        .session
        .discovery_interval()
        .min(config.session.heartbeat_interval())
        .max(Duration::from_millis(100));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if tx.send(IfaceMsg::Tick).is_err() {
                break;
            }
        }
    });
}

/// Spawn a `ConnectTcp` dial attempt; on success its stream re-enters the
/// event loop as `TcpConnected`, exactly like an accepted inbound connection.
fn spawn_tcp_connect(addr: SocketAddr, tx: mpsc::UnboundedSender<IfaceMsg>) {
    tokio::spawn(async move {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                let _ = tx.send(IfaceMsg::TcpConnected(addr, stream));
            }
            Err(err) => tracing::warn!(%addr, %err, "failed to open dlep session"),
        }
    });
}

/// Split a newly-live TCP connection into a reader task feeding `TcpData`/
/// `TcpClosed` back into the event loop and a writer task draining a
/// per-session channel, and register that channel in `writers`.
fn spawn_tcp_io(
    addr: SocketAddr,
    stream: TcpStream,
    tx: mpsc::UnboundedSender<IfaceMsg>,
    writers: &mut HashMap<SocketAddr, mpsc::UnboundedSender<Vec<u8>>>,
) {
    let (mut read_half, mut write_half) = stream.into_split();
    let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    writers.insert(addr, write_tx);

    let reader_tx = tx.clone();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 65536];
        loop {
            match read_half.read(&mut buf).await {
                Ok(0) => {
                    let _ = reader_tx.send(IfaceMsg::TcpClosed(addr));
                    break;
                }
                Ok(n) => {
                    if reader_tx.send(IfaceMsg::TcpData(addr, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%addr, %err, "tcp read error");
                    let _ = reader_tx.send(IfaceMsg::TcpClosed(addr));
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(bytes) = write_rx.recv().await {
            if let Err(err) = write_half.write_all(&bytes).await {
                tracing::warn!(%addr, %err, "tcp write error");
                break;
            }
        }
    });
}

async fn apply_events(
    events: Vec<InterfaceEvent>,
    udp_socket: &UdpSocket,
    multicast_addr: SocketAddr,
    writers: &mut HashMap<SocketAddr, mpsc::UnboundedSender<Vec<u8>>>,
    tx: &mpsc::UnboundedSender<IfaceMsg>,
) {
    for event in events {
        match event {
            InterfaceEvent::UnicastReply { to, datagram } => {
                if let Err(err) = udp_socket.send_to(&datagram, to).await {
                    tracing::warn!(%to, %err, "failed to send discovery reply");
                }
            }
            InterfaceEvent::Multicast(datagram) => {
                if let Err(err) = udp_socket.send_to(&datagram, multicast_addr).await {
                    tracing::warn!(%err, "failed to send discovery beacon");
                }
            }
            InterfaceEvent::ConnectTcp { addr } => spawn_tcp_connect(addr, tx.clone()),
            InterfaceEvent::TcpSend { addr, bytes } => send_tcp(writers, addr, bytes),
            InterfaceEvent::CloseTcp { addr, reason } => {
                tracing::info!(%addr, ?reason, "closing dlep session");
                writers.remove(&addr);
            }
        }
    }
}

fn send_tcp(writers: &HashMap<SocketAddr, mpsc::UnboundedSender<Vec<u8>>>, addr: SocketAddr, bytes: Vec<u8>) {
    match writers.get(&addr) {
        Some(writer) => {
            let _ = writer.send(bytes);
        }
        None => tracing::warn!(%addr, "no live tcp writer for session, dropping outbound signal"),
    }
}
