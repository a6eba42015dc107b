use crate::config::{FeatureToggleConfig, FeatureToggleConfigBuilder};
use crate::FeatureToggle;
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that gates an inner service behind a runtime feature flag.
///
/// # Examples
///
/// ```
/// use tower::{ServiceBuilder, service_fn};
/// use tower_resilience_featuretoggle::FeatureToggleLayer;
///
/// let layer = FeatureToggleLayer::<String>::builder()
///     .enabled(true)
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) }));
/// ```
#[derive(Clone)]
pub struct FeatureToggleLayer<Req> {
    config: Arc<FeatureToggleConfig<Req>>,
}

impl<Req> FeatureToggleLayer<Req> {
    pub(crate) fn new(config: impl Into<Arc<FeatureToggleConfig<Req>>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Creates a new builder for configuring a feature-toggle layer.
    pub fn builder() -> FeatureToggleConfigBuilder<Req> {
        FeatureToggleConfigBuilder::new()
    }
}

impl<S, Req> Layer<S> for FeatureToggleLayer<Req>
where
    S: tower::Service<Req>,
{
    type Service = FeatureToggle<S, Req>;

    fn layer(&self, service: S) -> Self::Service {
        FeatureToggle::new(service, Arc::clone(&self.config))
    }
}
