//! Instance metadata lookup used to resolve the local region.
//!
//! When no region override is configured the provisioner asks the
//! instance-metadata endpoint of the host it runs on. The lookup sits behind
//! a trait so tests can script it.

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const IMDS_ENDPOINT: &str = "http://169.254.169.254/opc/v1";
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(METADATA_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Errors raised while querying the metadata service.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MetadataError {
    /// Raised when the metadata endpoint could not be reached.
    #[error("metadata service request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
    /// Raised when the metadata endpoint answered with an error status.
    #[error("metadata service answered with status {status}")]
    Status {
        /// HTTP status returned by the endpoint.
        status: u16,
    },
    /// Raised when the instance document could not be decoded.
    #[error("metadata response could not be decoded: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Future returned by metadata lookups.
pub type MetadataFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MetadataError>> + Send + 'a>>;

/// Source of instance-local metadata.
pub trait InstanceMetadata: Send + Sync {
    /// Short region name of the instance this process runs on.
    fn region(&self) -> MetadataFuture<'_, String>;
}

#[derive(Deserialize)]
struct InstanceDocument {
    region: String,
}

/// Metadata source backed by the on-host instance-metadata endpoint.
#[derive(Clone, Debug)]
pub struct ImdsClient {
    endpoint: String,
}

impl ImdsClient {
    /// Creates a client against the standard link-local endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: IMDS_ENDPOINT.to_owned(),
        }
    }

    /// Creates a client against a custom endpoint.
    ///
    /// This is primarily used by tests to point the lookup at a local server.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for ImdsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceMetadata for ImdsClient {
    fn region(&self) -> MetadataFuture<'_, String> {
        Box::pin(async move {
            let url = format!("{}/instance/", self.endpoint);
            let response =
                HTTP_CLIENT
                    .get(&url)
                    .send()
                    .await
                    .map_err(|err| MetadataError::Transport {
                        message: err.to_string(),
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(MetadataError::Status {
                    status: status.as_u16(),
                });
            }

            let document: InstanceDocument =
                response.json().await.map_err(|err| MetadataError::Decode {
                    message: err.to_string(),
                })?;
            Ok(document.region)
        })
    }
}
