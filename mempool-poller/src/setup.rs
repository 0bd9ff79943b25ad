//! Bringing a monitor up: validate the endpoint, bootstrap, start polling.

use std::sync::Arc;
use std::time::Duration;

use mempool_client::{BaseUrl, MempoolApi, MempoolClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde_json::Value;
use tracing::info;

use crate::poller::{Poller, PollerBuilder, PollerHandle, DEFAULT_INTERVAL};
use crate::{Output, SetupError};

/// Settings for [`setup`].
#[derive(Debug)]
pub struct Settings {
    /// API base URL; normalized before use.
    pub base_url: String,
    /// Time between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    pub outputs: Vec<Output>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            outputs: Vec::new(),
        }
    }
}

/// A validated, bootstrapped and running poller.
#[derive(Debug)]
pub struct Monitor {
    base_url: BaseUrl,
    poller: Poller,
    handle: PollerHandle,
}

impl Monitor {
    /// Bring up a monitor over an existing API implementation.
    ///
    /// The endpoint is probed with a backend-info request, then the first
    /// cycle runs. Either failure aborts setup; background polling only
    /// starts once a snapshot has been published.
    pub async fn start(
        base_url: BaseUrl,
        api: Arc<dyn MempoolApi>,
        configure: impl FnOnce(PollerBuilder) -> PollerBuilder,
    ) -> Result<Self, SetupError> {
        validate(&base_url, api.as_ref()).await?;

        let poller = configure(Poller::builder(api)).build();
        poller.bootstrap().await.map_err(SetupError::Bootstrap)?;
        let handle = poller.start();

        info!(endpoint = %base_url, interval = ?poller.interval(), "monitor started");
        Ok(Self {
            base_url,
            poller,
            handle,
        })
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Stable identifier derived from the endpoint hostname.
    pub fn unique_id(&self) -> &str {
        self.base_url.unique_id()
    }

    /// Stop background polling. The last snapshot stays readable.
    pub fn stop(self) -> Poller {
        self.handle.stop();
        self.poller
    }
}

/// Check that `api` answers the backend-info probe.
pub async fn validate(base_url: &BaseUrl, api: &dyn MempoolApi) -> Result<Value, SetupError> {
    api.backend_info()
        .await
        .map_err(|source| SetupError::Validation {
            url: base_url.to_string(),
            source,
        })
}

/// Validate `settings.base_url`, build an HTTP client and start a monitor.
///
/// # Example
///
/// ```rust,no_run
/// use mempool_poller::{setup, SensorKey, Settings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let monitor = setup(Settings {
///         base_url: "https://mempool.space/".into(),
///         ..Default::default()
///     })
///     .await?;
///
///     let price = monitor.poller().sensor(SensorKey::BtcPrice);
///     println!("{} USD", price.value().map(|v| v.to_string()).unwrap_or_default());
///     Ok(())
/// }
/// ```
pub async fn setup(settings: Settings) -> Result<Monitor, SetupError> {
    let base_url = BaseUrl::parse(&settings.base_url)?;
    let client = MempoolClient::builder()
        .base_url(base_url.clone())
        .timeout(settings.timeout)
        .build()
        .map_err(SetupError::Client)?;

    let Settings {
        interval, outputs, ..
    } = settings;

    Monitor::start(base_url, Arc::new(client), move |builder| {
        outputs
            .into_iter()
            .fold(builder.interval(interval), PollerBuilder::output)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_fails_before_any_request() {
        let err = setup(Settings {
            base_url: "not a url".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SetupError::InvalidUrl(_)), "{err:?}");
    }

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, "https://mempool.space");
        assert_eq!(settings.interval, Duration::from_secs(300));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.outputs.is_empty());
    }
}
