use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use primitives::config::Environment;
use serde::Deserialize;
use slog::{error, info};

/// an error used when deserializing a [`EnvConfig`] instance from environment variables
/// see [`EnvConfig::from_env()`]
pub use envy::Error as EnvError;

use crate::{router, Application};

pub const DEFAULT_PORT: u16 = 8005;
pub const DEFAULT_IP_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));

#[derive(Debug, Deserialize, Clone)]
pub struct EnvConfig {
    /// Defaults to `Development`: [`Environment::default()`]
    #[serde(default)]
    pub env: Environment,
    /// The port on which the gateway will be accessible.
    #[serde(default = "default_port")]
    /// Defaults to `8005`: [`DEFAULT_PORT`]
    pub port: u16,
    /// The address on which the gateway will be accessible.
    /// `0.0.0.0` can be used for Docker.
    /// `127.0.0.1` can be used for locally running servers.
    #[serde(default = "default_ip_addr")]
    /// Defaults to `0.0.0.0`: [`DEFAULT_IP_ADDR`]
    pub ip_addr: IpAddr,
}

impl EnvConfig {
    /// Deserialize the [`EnvConfig`] from Environment variables.
    pub fn from_env() -> Result<Self, EnvError> {
        envy::from_env()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip_addr, self.port)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_ip_addr() -> IpAddr {
    DEFAULT_IP_ADDR
}

impl Application {
    /// Starts the `axum` server.
    pub async fn run(self, socket_addr: SocketAddr) {
        let logger = self.logger.clone();
        info!(&logger, "Listening on socket address: {}!", socket_addr);

        let router = router(Arc::new(self));
        let server = axum::Server::bind(&socket_addr).serve(router.into_make_service());

        if let Err(e) = server.await {
            error!(&logger, "server error: {}", e; "main" => "run");
        }
    }
}
