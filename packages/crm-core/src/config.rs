//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: IpAddr,
    /// TCP port to listen on
    pub port: u16,
    /// Directory served for paths outside the customer API
    pub static_dir: PathBuf,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            static_dir: PathBuf::from("./static"),
            request_timeout_ms: 5000, // 5 seconds default
        }
    }
}

impl ServerConfig {
    /// Returns the socket address the server binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
