//! Server configuration

use std::net::SocketAddr;
use tracing::warn;

/// Default listen address
pub const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3030);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(DEFAULT_ADDR),
        }
    }
}

impl ServerConfig {
    /// Read `FLOORPLAN_SERVER_ADDR`, keeping the default when unset or invalid.
    pub fn from_env() -> Self {
        Self::from_addr(std::env::var("FLOORPLAN_SERVER_ADDR").ok().as_deref())
    }

    fn from_addr(addr: Option<&str>) -> Self {
        match addr.map(str::parse) {
            Some(Ok(addr)) => Self { addr },
            Some(Err(e)) => {
                warn!("Ignoring invalid FLOORPLAN_SERVER_ADDR: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }
}
