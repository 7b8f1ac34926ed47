//! The admin client: cached reads and notifying mutations over one backend.
//!
//! Resource-specific operations live in [`products`](crate::products),
//! [`reviews`](crate::reviews) and [`orders`](crate::orders).

use std::future::Future;
use std::sync::Arc;

use printables_core::product::ProductType;
use printables_events::{Notification, NotificationBus};

use crate::cache::{CacheTag, QueryCache};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::ApiClient;

/// Side effects attached to a mutation: which tags it outdates and which
/// banners it raises.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MutationEffects {
    pub name: &'static str,
    pub invalidates: &'static [CacheTag],
    pub success: Option<&'static str>,
    pub failure: Option<&'static str>,
}

pub struct AdminClient {
    api: ApiClient,
    cache: QueryCache,
    bus: Arc<NotificationBus>,
    product_type: ProductType,
}

impl AdminClient {
    pub fn new(config: &ClientConfig, bus: Arc<NotificationBus>) -> Result<Self, ClientError> {
        let api = ApiClient::new(config)?;
        Ok(Self::with_api(api, config.product_type, bus))
    }

    pub fn with_api(api: ApiClient, product_type: ProductType, bus: Arc<NotificationBus>) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
            bus,
            product_type,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Storefront section this client manages.
    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Run a mutation. On success the affected tags are invalidated and the
    /// success banner is published; on failure the cache is left untouched
    /// and the failure banner is published. No retries.
    pub(crate) async fn mutate<T, Fut>(
        &self,
        effects: MutationEffects,
        operation: Fut,
    ) -> Result<T, ClientError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        match operation.await {
            Ok(value) => {
                self.cache.invalidate(effects.invalidates).await;
                if let Some(message) = effects.success {
                    self.bus.publish(Notification::success(message));
                }
                tracing::info!(mutation = effects.name, "Mutation succeeded");
                Ok(value)
            }
            Err(e) => {
                if let Some(message) = effects.failure {
                    self.bus.publish(Notification::error(message));
                }
                tracing::error!(mutation = effects.name, error = %e, "Mutation failed");
                Err(e)
            }
        }
    }
}
