use crate::config::{FailFastConfig, FailFastConfigBuilder};
use crate::FailFast;
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that applies fail-fast gating to an inner service.
///
/// # Examples
///
/// ```
/// use tower::{ServiceBuilder, service_fn};
/// use tower_resilience_failfast::FailFastLayer;
///
/// let layer = FailFastLayer::builder()
///     .failure_threshold(5)
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) }));
/// ```
#[derive(Clone)]
pub struct FailFastLayer<Req, Res, Err> {
    config: Arc<FailFastConfig<Req, Res, Err>>,
}

impl<Req, Res, Err> FailFastLayer<Req, Res, Err> {
    pub(crate) fn new(config: impl Into<Arc<FailFastConfig<Req, Res, Err>>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Creates a new builder for configuring a fail-fast layer.
    pub fn builder() -> FailFastConfigBuilder<Req, Res, Err> {
        FailFastConfigBuilder::new()
    }
}

impl<S, Req, Res, Err> Layer<S> for FailFastLayer<Req, Res, Err>
where
    S: tower::Service<Req, Response = Res, Error = Err>,
{
    type Service = FailFast<S, Req, Res, Err>;

    fn layer(&self, service: S) -> Self::Service {
        FailFast::new(service, Arc::clone(&self.config))
    }
}
