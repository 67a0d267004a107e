use std::{
    fmt::Display,
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};

use socket2::{Domain, Protocol, Type};

use crate::config::ServerConfig;

/// The listening socket. Owned by whoever serves on it and closed when dropped.
#[derive(Debug)]
pub struct Listener {
    inner: tokio::net::TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Binds and listens on `config.addr`. Must be called inside a tokio runtime.
    ///
    /// An IPv6 address is bound dual-stack. If the IPv6 wildcard cannot be bound
    /// for any reason other than the port being taken, binds `0.0.0.0` instead.
    pub fn bind(config: &ServerConfig) -> io::Result<Self> {
        let addr = config.addr;
        let socket = match bind_socket(addr, config.backlog) {
            Err(err) if is_ipv6_wildcard(addr) && err.kind() != io::ErrorKind::AddrInUse => {
                let fallback = SocketAddr::from((Ipv4Addr::UNSPECIFIED, addr.port()));
                tracing::debug!(error = %err, addr = %fallback, "IPv6 unavailable, binding IPv4");
                bind_socket(fallback, config.backlog)?
            }
            result => result?,
        };

        let inner = tokio::net::TcpListener::from_std(socket.into())?;
        let local_addr = inner.local_addr()?;
        Ok(Self { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn accept(&self) -> io::Result<(tokio::net::TcpStream, SocketAddr)> {
        self.inner.accept().await
    }
}

fn bind_socket(addr: SocketAddr, backlog: i32) -> io::Result<socket2::Socket> {
    let socket = socket2::Socket::new(
        Domain::for_address(addr),
        Type::STREAM,
        Some(Protocol::TCP),
    )?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(socket)
}

fn is_ipv6_wildcard(addr: SocketAddr) -> bool {
    addr.ip() == Ipv6Addr::UNSPECIFIED
}

impl Display for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.local_addr.fmt(f)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        tracing::debug!(addr = %self, "Closing listener");
    }
}
