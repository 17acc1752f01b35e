use crate::{Endpoint, Result};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Database and credentials the MySQL container is created with.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = "linkpulse".to_string(), setter(into))]
    database: String,
    #[builder(default = "linkpulse".to_string(), setter(into))]
    username: String,
    #[builder(default = "linkpulse".to_string(), setter(into))]
    password: String,
}

/// A MySQL server that lives as long as this value.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::mapped(&self.container, MYSQL_PORT).await
    }

    /// A `mysql://` URL sqlx can connect with.
    ///
    /// The server may still be finishing its init scripts when this returns,
    /// so callers should retry the first connection.
    pub async fn database_url(&self) -> Result<String> {
        let endpoint = self.endpoint().await?;
        Ok(format!(
            "mysql://{}:{}@{}/{}",
            self.config.username, self.config.password, endpoint, self.config.database
        ))
    }
}
