//! Error types for the provisioning lifecycle.

use thiserror::Error;

use crate::client::{ClientError, VolumeLifecycleState};
use crate::metadata::MetadataError;
use crate::request::RequestError;

/// Errors surfaced by provisioning and teardown operations.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ProvisionError {
    /// Raised when the request fails validation; no API call was made.
    #[error("invalid volume request: {0}")]
    Request(#[from] RequestError),
    /// Raised when an API call fails at the transport or service level.
    #[error("storage client error: {0}")]
    Client(#[from] ClientError),
    /// Raised when the provider reports a terminal failure state for the
    /// volume. Compensating deletion has already been attempted.
    #[error("volume {volume_id} entered lifecycle state {state}")]
    VolumeFailed {
        /// Identifier of the failed volume.
        volume_id: String,
        /// Terminal state the provider reported.
        state: VolumeLifecycleState,
    },
    /// Raised when the volume stayed in a non-terminal state past the
    /// deadline. Compensating deletion has already been attempted.
    #[error("timed out after {waited_secs}s waiting for volume {volume_id} to become available")]
    WaitTimeout {
        /// Identifier of the volume that never became available.
        volume_id: String,
        /// Deadline that was exceeded, in seconds.
        waited_secs: u64,
    },
    /// Raised when the region for descriptor labels could not be resolved
    /// after the volume became available. The volume is left in place.
    #[error("failed to resolve region for volume labels: {0}")]
    Region(#[source] MetadataError),
    /// Raised at teardown when a descriptor carries no volume identifier,
    /// meaning it was not produced by this provisioner.
    #[error("descriptor {name} is missing the volume identifier annotation")]
    MissingVolumeAnnotation {
        /// Name of the descriptor handed to teardown.
        name: String,
    },
}
