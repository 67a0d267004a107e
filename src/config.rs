use std::{
    net::{Ipv6Addr, SocketAddr},
    time::Duration,
};

pub const DEFAULT_PORT: u16 = 3333;
/// Kernel accept backlog.
pub const DEFAULT_BACKLOG: i32 = 511;
pub const DEFAULT_HEADER_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Compiled-in server settings. Nothing here is read from the environment.
///
/// The default address is the IPv6 wildcard, bound dual-stack so IPv4 clients
/// reach it too. `net::Listener::bind` drops to `0.0.0.0` on hosts without IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub backlog: i32,
    pub header_read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv6Addr::UNSPECIFIED, DEFAULT_PORT)),
            backlog: DEFAULT_BACKLOG,
            header_read_timeout: DEFAULT_HEADER_READ_TIMEOUT,
        }
    }
}

impl ServerConfig {
    #[cfg(test)]
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listens_on_all_interfaces_port_3333() {
        let config = ServerConfig::default();
        assert!(config.addr.ip().is_unspecified());
        assert!(config.addr.is_ipv6());
        assert_eq!(config.addr.port(), 3333);
        assert_eq!(config.backlog, DEFAULT_BACKLOG);
    }

    #[test]
    fn with_addr_keeps_other_defaults() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = ServerConfig::default().with_addr(addr);
        assert_eq!(config.addr, addr);
        assert_eq!(config.header_read_timeout, DEFAULT_HEADER_READ_TIMEOUT);
    }
}
