use crate::Result;
use std::fmt::{Display, Formatter};
use testcontainers::{ContainerAsync, Image};

/// Host and port a container port is reachable on from the test process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub(crate) async fn mapped<I: Image>(
        container: &ContainerAsync<I>,
        internal_port: u16,
    ) -> Result<Self> {
        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(internal_port).await?;
        // some clients resolve localhost to ::1 first, which docker may not forward
        let host = if host == "localhost" {
            "127.0.0.1".to_string()
        } else {
            host
        };
        Ok(Self { host, port })
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
