//! Dependency initialization and wiring for the demo.

use std::sync::Arc;
use std::time::Duration;

use document_store_repository::opensearch::IndexConfig;
use document_store_repository::{DocumentStoreFacade, OpenSearchClient};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, Settings};
use crate::DemoError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The facade, backed by a connected OpenSearch client.
    pub facade: DocumentStoreFacade,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(DemoError)` - If initialization fails (only in fail-fast mode)
    pub async fn new(settings: Settings) -> Result<Self, DemoError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index = %settings.index_config.index,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            max_batch_size = ?settings.facade_config.max_batch_size,
            "Initializing dependencies"
        );

        let client = Self::connect_to_opensearch(
            &settings.opensearch_url,
            settings.index_config,
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        let facade = DocumentStoreFacade::with_config(Arc::new(client), settings.facade_config);

        Ok(Self { facade })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchClient, DemoError> {
        loop {
            match Self::try_connect_opensearch(url, index_config.clone()).await {
                Ok(client) => return Ok(client),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(DemoError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch.
    ///
    /// The index check doubles as the connectivity probe: it is the first
    /// request sent, and it creates the student index when it is missing.
    async fn try_connect_opensearch(
        url: &str,
        index_config: IndexConfig,
    ) -> Result<OpenSearchClient, DemoError> {
        let client = OpenSearchClient::new(url, index_config).map_err(|e| {
            DemoError::config(format!("Failed to create OpenSearch client: {}", e))
        })?;

        client
            .ensure_index_exists()
            .await
            .map_err(|e| DemoError::config(format!("Failed to ensure index exists: {}", e)))?;

        Ok(client)
    }
}
