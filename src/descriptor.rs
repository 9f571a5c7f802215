//! Descriptor handed back to the orchestrator after provisioning.

use std::collections::HashMap;

use crate::request::{AccessMode, ReclaimPolicy};

/// Annotation under which the provider volume identifier is stored.
pub const VOLUME_ID_ANNOTATION: &str = "ociVolumeID";
/// Well-known label carrying the provider region.
pub const REGION_LABEL: &str = "failure-domain.beta.kubernetes.io/region";
/// Well-known label carrying the availability domain.
pub const ZONE_LABEL: &str = "failure-domain.beta.kubernetes.io/zone";

/// A provisioned volume as reported back to the orchestrator.
///
/// Descriptors are only constructed once the provider reports the volume
/// `AVAILABLE`; the identifier stored under [`VOLUME_ID_ANNOTATION`] is what
/// teardown later uses to find the volume again.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeDescriptor {
    /// Orchestrator-facing object name; the provider volume identifier.
    pub name: String,
    /// Annotations carrying provisioner-private metadata.
    pub annotations: HashMap<String, String>,
    /// Topology labels (region and availability domain).
    pub labels: HashMap<String, String>,
    /// Capacity granted, in bytes, after any minimum-size rounding.
    pub capacity_bytes: u64,
    /// Access modes carried over from the request.
    pub access_modes: Vec<AccessMode>,
    /// Reclaim policy carried over from the request.
    pub reclaim_policy: ReclaimPolicy,
    /// Filesystem the volume should be formatted with on first mount.
    pub fs_type: String,
    /// Mount options carried over from the request.
    pub mount_options: Vec<String>,
}

impl VolumeDescriptor {
    /// Provider volume identifier recorded at provisioning time, if present.
    #[must_use]
    pub fn volume_id(&self) -> Option<&str> {
        self.annotations
            .get(VOLUME_ID_ANNOTATION)
            .map(String::as_str)
    }
}
