use crate::{Endpoint, Result};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const REDIS_PORT: u16 = 6379;
const DEFAULT_IMAGE_TAG: &str = "8.6.0";

/// A standalone Redis server that lives as long as this value.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn new() -> Result<Self> {
        Self::with_image_tag(DEFAULT_IMAGE_TAG).await
    }

    pub async fn with_image_tag(tag: &str) -> Result<Self> {
        let container = GenericImage::new("redis", tag)
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;
        Ok(Self { container })
    }

    pub async fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::mapped(&self.container, REDIS_PORT).await
    }

    pub async fn redis_url(&self) -> Result<String> {
        Ok(format!("redis://{}", self.endpoint().await?))
    }

    /// Stops the container, simulating a Redis outage for live clients.
    pub async fn stop(&self) -> Result<()> {
        Ok(self.container.stop().await?)
    }
}
