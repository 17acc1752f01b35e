use linkpulse_analytics::{AggregationEngine, EventRecorder};
use linkpulse_core::{AliasStore, DestinationCache, EventLog};
use linkpulse_resolver::{ResolverService, ResolverSettings};
use linkpulse_shortener::{RandomAliasGenerator, ShortenerService, DEFAULT_MAX_ATTEMPTS};
use std::sync::Arc;
use typed_builder::TypedBuilder;

pub type Shortener = ShortenerService<dyn AliasStore, RandomAliasGenerator>;
pub type Resolver = ResolverService<dyn AliasStore, dyn DestinationCache, dyn EventLog>;
pub type Analytics = AggregationEngine<dyn AliasStore, dyn EventLog>;

/// Settings the gateway hands to the services it builds.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    /// Public prefix that short URLs are built under.
    #[builder(setter(into))]
    pub base_url: String,
    #[builder(default = RandomAliasGenerator::DEFAULT_LENGTH)]
    pub alias_length: usize,
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    #[builder(default)]
    pub resolver: ResolverSettings,
}

#[derive(Clone)]
pub struct AppState {
    pub shortener: Shortener,
    pub resolver: Resolver,
    pub analytics: Analytics,
    pub base_url: Arc<str>,
}

impl AppState {
    /// Wires the services around already-initialized backends.
    pub fn new(
        store: Arc<dyn AliasStore>,
        events: Arc<dyn EventLog>,
        cache: Arc<dyn DestinationCache>,
        config: GatewayConfig,
    ) -> Self {
        let shortener = ShortenerService::new(
            Arc::clone(&store),
            RandomAliasGenerator::new(config.alias_length),
        )
        .with_max_attempts(config.max_attempts);
        let resolver = ResolverService::new(
            Arc::clone(&store),
            cache,
            EventRecorder::new(Arc::clone(&events)),
            config.resolver,
        );
        let analytics = AggregationEngine::new(store, events, config.base_url.as_str());

        Self {
            shortener,
            resolver,
            analytics,
            base_url: Arc::from(config.base_url),
        }
    }
}
