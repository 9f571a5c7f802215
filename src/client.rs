//! Typed boundary to the OCI Block Storage API.
//!
//! The provisioner never talks HTTP itself; it drives an implementation of
//! [`StorageClient`] supplied by the embedding process. The trait mirrors the
//! three volume operations the lifecycle needs (create, get, delete) plus the
//! identity context and per-call deadline every operation is bounded by.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deadline applied to a single API call when the client does not override it.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

const NOT_FOUND_STATUS: u16 = 404;
const NOT_FOUND_CODE: &str = "NotAuthorizedOrNotFound";

/// Lifecycle states reported by the Block Storage service for a volume.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeLifecycleState {
    /// The volume is being prepared and is not yet usable.
    Provisioning,
    /// The volume is being restored from a backup.
    Restoring,
    /// The volume is ready for attachment.
    Available,
    /// The volume is being torn down.
    Terminating,
    /// The volume has been torn down.
    Terminated,
    /// The volume hit an unrecoverable provider-side fault.
    Faulty,
    /// A state this crate does not know about; treated as non-terminal.
    #[serde(other)]
    Unknown,
}

impl VolumeLifecycleState {
    /// Returns the wire spelling of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Restoring => "RESTORING",
            Self::Available => "AVAILABLE",
            Self::Terminating => "TERMINATING",
            Self::Terminated => "TERMINATED",
            Self::Faulty => "FAULTY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for VolumeLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for volume creation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolumeDetails {
    /// Availability domain the volume is placed in.
    pub availability_domain: String,
    /// Compartment that owns the volume.
    pub compartment_id: String,
    /// Human-readable name shown in the provider console.
    pub display_name: String,
    /// Requested size in MiB allocation units.
    #[serde(rename = "sizeInMBs")]
    pub size_in_mbs: u64,
    /// When set, the volume is restored from this backup instead of being
    /// created blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_backup_id: Option<String>,
}

/// Volume representation returned by create and get calls.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSummary {
    /// Provider-assigned volume identifier (OCID).
    pub id: String,
    /// Availability domain the volume lives in.
    pub availability_domain: String,
    /// Current lifecycle state.
    pub lifecycle_state: VolumeLifecycleState,
    /// Size granted by the provider, in MiB.
    #[serde(rename = "sizeInMBs")]
    pub size_in_mbs: u64,
}

/// Errors surfaced by [`StorageClient`] implementations.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ClientError {
    /// Raised when a call produced no service response at all.
    #[error("transport failure during {operation}: {message}")]
    Transport {
        /// Name of the API operation that failed.
        operation: String,
        /// Description of the transport-level failure.
        message: String,
    },
    /// Raised when the service answered with an error status.
    #[error("{operation} rejected with status {status}: {message}")]
    Service {
        /// Name of the API operation that failed.
        operation: String,
        /// HTTP status returned by the service.
        status: u16,
        /// Provider error code, when one was supplied.
        code: Option<String>,
        /// Message returned by the service.
        message: String,
    },
}

impl ClientError {
    /// Builds the error used when a call exceeds its per-call deadline.
    #[must_use]
    pub fn timed_out(operation: &str, deadline: Duration) -> Self {
        Self::Transport {
            operation: operation.to_owned(),
            message: format!("no response within {}s", deadline.as_secs()),
        }
    }

    /// Reports whether the error means the volume does not exist.
    ///
    /// The service reports missing volumes and permission failures with the
    /// same `NotAuthorizedOrNotFound` code; both end deletion retries.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Service { status, code, .. } => {
                *status == NOT_FOUND_STATUS || code.as_deref() == Some(NOT_FOUND_CODE)
            }
            Self::Transport { .. } => false,
        }
    }
}

/// Future returned by client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Minimal interface to the Block Storage API consumed by the provisioner.
///
/// Implementations are expected to be cheap to share: the provisioner keeps
/// one client per configuration and issues concurrent operations against it.
pub trait StorageClient: Send + Sync {
    /// Compartment volumes are created in.
    fn compartment_id(&self) -> &str;

    /// Tenancy the compartment belongs to.
    fn tenancy_id(&self) -> &str;

    /// Deadline applied to each individual API call.
    fn call_timeout(&self) -> Duration {
        DEFAULT_CALL_TIMEOUT
    }

    /// Creates a volume and returns its initial representation.
    fn create_volume<'a>(
        &'a self,
        details: &'a CreateVolumeDetails,
    ) -> ClientFuture<'a, VolumeSummary>;

    /// Fetches the current representation of a volume.
    fn get_volume<'a>(&'a self, volume_id: &'a str) -> ClientFuture<'a, VolumeSummary>;

    /// Deletes a volume.
    fn delete_volume<'a>(&'a self, volume_id: &'a str) -> ClientFuture<'a, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_details_serialise_with_wire_names() {
        let details = CreateVolumeDetails {
            availability_domain: String::from("PHX-AD-1"),
            compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
            display_name: String::from("ocibv-data"),
            size_in_mbs: 51200,
            source_backup_id: None,
        };
        let json = serde_json::to_string(&details).unwrap_or_else(|err| panic!("serialise: {err}"));
        assert!(json.contains(r#""availabilityDomain":"PHX-AD-1""#));
        assert!(json.contains(r#""sizeInMBs":51200"#));
        assert!(!json.contains("sourceBackupId"));
    }

    #[test]
    fn create_details_serialise_backup_clause_when_present() {
        let details = CreateVolumeDetails {
            availability_domain: String::from("PHX-AD-1"),
            compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
            display_name: String::from("ocibv-data"),
            size_in_mbs: 51200,
            source_backup_id: Some(String::from("ocid1.volumebackup.oc1..bbbb")),
        };
        let json = serde_json::to_string(&details).unwrap_or_else(|err| panic!("serialise: {err}"));
        assert!(json.contains(r#""sourceBackupId":"ocid1.volumebackup.oc1..bbbb""#));
    }

    #[test]
    fn volume_summary_deserialises_known_state() {
        let volume: VolumeSummary = serde_json::from_str(
            r#"{"id":"ocid1.volume.oc1..cccc","availabilityDomain":"PHX-AD-1","lifecycleState":"AVAILABLE","sizeInMBs":51200}"#,
        )
        .unwrap_or_else(|err| panic!("deserialise: {err}"));
        assert_eq!(volume.lifecycle_state, VolumeLifecycleState::Available);
    }

    #[test]
    fn volume_summary_deserialises_unknown_state_to_fallback() {
        let volume: VolumeSummary = serde_json::from_str(
            r#"{"id":"ocid1.volume.oc1..cccc","availabilityDomain":"PHX-AD-1","lifecycleState":"HIBERNATING","sizeInMBs":51200}"#,
        )
        .unwrap_or_else(|err| panic!("deserialise: {err}"));
        assert_eq!(volume.lifecycle_state, VolumeLifecycleState::Unknown);
    }

    #[test]
    fn not_found_recognised_by_status_and_code() {
        let by_status = ClientError::Service {
            operation: String::from("DeleteVolume"),
            status: 404,
            code: None,
            message: String::from("no such volume"),
        };
        let by_code = ClientError::Service {
            operation: String::from("DeleteVolume"),
            status: 400,
            code: Some(String::from("NotAuthorizedOrNotFound")),
            message: String::from("resource gone"),
        };
        let other = ClientError::Service {
            operation: String::from("DeleteVolume"),
            status: 500,
            code: Some(String::from("InternalError")),
            message: String::from("boom"),
        };
        assert!(by_status.is_not_found());
        assert!(by_code.is_not_found());
        assert!(!other.is_not_found());
    }

    #[test]
    fn transport_errors_are_never_not_found() {
        let error = ClientError::timed_out("GetVolume", Duration::from_secs(30));
        assert!(!error.is_not_found());
        assert_eq!(
            error.to_string(),
            "transport failure during GetVolume: no response within 30s"
        );
    }
}
