//! Connectionless datagram transport used by both ends of the link.
//!
//! Sends are a single best-effort attempt. Receives are bounded by a timeout
//! and report "nothing this cycle" as `None`, so polling loops can interleave
//! status output and shutdown checks with blocking reads.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{UdpSocket, lookup_host};
use tracing::debug;

/// Largest datagram we bother reading; frames are 40 bytes at most.
pub const RECV_BUF_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error("socket setup: {0}")]
    Io(#[from] io::Error),
}

async fn resolve(addr: &str) -> Result<SocketAddr, TransportError> {
    lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| TransportError::Unresolved(addr.to_string()))
}

/// Fire-and-forget sender bound to an ephemeral port, aimed at one destination.
#[derive(Debug)]
pub struct Sender {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl Sender {
    pub async fn to(dest: &str) -> Result<Self, TransportError> {
        let dest = resolve(dest).await?;
        let local = if dest.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        Ok(Self { socket, dest })
    }

    pub fn destination(&self) -> SocketAddr {
        self.dest
    }

    pub async fn send(&self, bytes: &[u8]) -> io::Result<usize> {
        self.socket.send_to(bytes, self.dest).await
    }
}

#[derive(Debug)]
pub struct Receiver {
    socket: UdpSocket,
}

impl Receiver {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let addr = resolve(addr).await?;
        Ok(Self {
            socket: UdpSocket::bind(addr).await?,
        })
    }

    /// Adopt a socket configured elsewhere (e.g. with address reuse enabled).
    pub fn from_std(socket: std::net::UdpSocket) -> Result<Self, TransportError> {
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket: UdpSocket::from_std(socket)?,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait up to `timeout` for one datagram.
    ///
    /// Socket errors are treated like a timeout: logged at debug level and
    /// reported as no data.
    pub async fn recv(&self, timeout: Duration) -> Option<(Vec<u8>, SocketAddr)> {
        let mut buf = [0u8; RECV_BUF_LEN];
        match tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((n, from))) => Some((buf[..n].to_vec(), from)),
            Ok(Err(e)) => {
                debug!(?e, "recv error");
                None
            }
            Err(_elapsed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_then_receive_on_loopback() {
        let rx = Receiver::bind("127.0.0.1:0").await.unwrap();
        let dest = rx.local_addr().unwrap().to_string();
        let tx = Sender::to(&dest).await.unwrap();
        assert_eq!(tx.destination().to_string(), dest);

        tx.send(b"\xAA\x55hello").await.unwrap();
        let (bytes, _from) = rx.recv(Duration::from_secs(2)).await.expect("datagram");
        assert_eq!(bytes, b"\xAA\x55hello");
    }

    #[tokio::test]
    async fn recv_times_out_with_none() {
        let rx = Receiver::bind("127.0.0.1:0").await.unwrap();
        assert!(rx.recv(Duration::from_millis(50)).await.is_none());
    }

    #[tokio::test]
    async fn adopts_std_socket() {
        let std_sock = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let rx = Receiver::from_std(std_sock).unwrap();
        let tx = Sender::to(&rx.local_addr().unwrap().to_string()).await.unwrap();
        tx.send(&[1, 2, 3]).await.unwrap();
        let (bytes, _) = rx.recv(Duration::from_secs(2)).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unresolvable_host_is_an_error() {
        assert!(Sender::to("not an address").await.is_err());
    }
}
