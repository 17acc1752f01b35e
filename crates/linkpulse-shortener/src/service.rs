use crate::error::{Result, ShortenerError};
use crate::generator::Generator;
use linkpulse_core::{
    Alias, AliasStore, Clock, NewShortLink, OwnerId, ShortLink, StorageError, SystemClock, Topic,
};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Number of generated aliases tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Input to [`ShortenerService::create`].
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub owner: OwnerId,
    pub destination_url: String,
    /// Caller-chosen alias. When absent one is generated.
    pub alias: Option<Alias>,
    pub topic: Option<Topic>,
}

/// Creates short links.
///
/// Alias uniqueness is enforced by the store's atomic insert, never by a
/// prior existence check. An explicit alias that is already taken fails
/// with [`ShortenerError::AliasConflict`]; a generated alias that collides
/// is replaced by a fresh candidate up to `max_attempts` times.
pub struct ShortenerService<S: ?Sized, G> {
    store: Arc<S>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl<S: ?Sized, G> Clone for ShortenerService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            max_attempts: self.max_attempts,
        }
    }
}

impl<S, G> ShortenerService<S, G>
where
    S: AliasStore + ?Sized,
    G: Generator,
{
    pub fn new(store: Arc<S>, generator: G) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the generated-alias retry budget. At least one attempt is made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Validates the destination and persists a new link.
    pub async fn create(&self, params: CreateParams) -> Result<ShortLink> {
        let destination_url = validate_destination(&params.destination_url)?;
        let topic = params.topic.unwrap_or_default();

        if let Some(alias) = params.alias {
            let link = self
                .store
                .insert(self.new_link(&params.owner, &destination_url, alias, topic))
                .await?;
            debug!(alias = %link.alias, owner = %link.owner, "Created short link with custom alias");
            return Ok(link);
        }

        for attempt in 1..=self.max_attempts {
            let alias = self.generator.generate();
            match self
                .store
                .insert(self.new_link(&params.owner, &destination_url, alias, topic))
                .await
            {
                Ok(link) => {
                    debug!(alias = %link.alias, owner = %link.owner, attempt, "Created short link");
                    return Ok(link);
                }
                Err(StorageError::Conflict(alias)) => {
                    debug!(alias = %alias, attempt, "Generated alias already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = self.max_attempts, "Alias generation exhausted");
        Err(ShortenerError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    fn new_link(
        &self,
        owner: &OwnerId,
        destination_url: &str,
        alias: Alias,
        topic: Topic,
    ) -> NewShortLink {
        NewShortLink {
            owner: owner.clone(),
            destination_url: destination_url.to_string(),
            alias,
            topic,
            created_at: self.clock.now(),
        }
    }
}

/// Accepts absolute http(s) URLs with a host and returns them trimmed.
fn validate_destination(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShortenerError::InvalidUrl("URL cannot be empty".to_string()));
    }
    // the url parser drops these silently, but they cannot go out in a Location header
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must not contain whitespace or control characters: {trimmed:?}"
        )));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ShortenerError::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must have a host: {trimmed}"
        )));
    }

    Ok(trimmed.to_string())
}
