use std::net::SocketAddr;

use shared_protocol::{Receiver, Sender, TransportError};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::lookup_host;

use crate::config::Config;
use crate::errors::OcsError;

/// Downlink sender aimed at the ground station, plus the uplink listener socket.
pub async fn connect(cfg: &Config) -> Result<(Sender, Receiver), OcsError> {
    let tx = Sender::to(&cfg.downlink_addr()).await?;
    let rx = bind_reusable(&cfg.uplink_addr()).await?;
    Ok((tx, rx))
}

/// Bind with SO_REUSEADDR so a restarted simulator can rebind immediately.
pub async fn bind_reusable(addr: &str) -> Result<Receiver, OcsError> {
    let addr: SocketAddr = lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| TransportError::Unresolved(addr.to_string()))?;

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    Ok(Receiver::from_std(socket.into())?)
}
