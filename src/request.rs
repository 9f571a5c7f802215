//! Volume request model consumed by the provisioner.
//!
//! Requests carry the typed fields the lifecycle needs directly plus the
//! orchestrator's opaque parameter and annotation maps, from which the
//! recognised options (`fsType`, `volumeRoundingUpEnabled`, the backup
//! source) are resolved on demand.

use std::collections::HashMap;

use thiserror::Error;

/// Storage-class parameter selecting the filesystem type.
pub const FS_TYPE_PARAM: &str = "fsType";
/// Storage-class parameter overriding the global rounding policy.
pub const VOLUME_ROUNDING_PARAM: &str = "volumeRoundingUpEnabled";
/// Annotation naming a backup to restore the new volume from.
pub const BACKUP_SOURCE_ANNOTATION: &str = "volume.beta.kubernetes.io/oci-volume-source";

const DEFAULT_FS_TYPE: &str = "ext4";

/// Access modes an orchestrator may request for a volume.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessMode {
    /// Mounted read-write by a single node. The only supported mode.
    ReadWriteOnce,
    /// Mounted read-only by many nodes.
    ReadOnlyMany,
    /// Mounted read-write by many nodes.
    ReadWriteMany,
}

impl AccessMode {
    /// Returns the orchestrator-facing spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the volume once the orchestrator releases it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReclaimPolicy {
    /// The volume is deleted on release.
    #[default]
    Delete,
    /// The volume is kept for manual reclamation.
    Retain,
}

/// Parameters required to provision a volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeRequest {
    /// Logical name of the claim; used to derive the display name.
    pub name: String,
    /// Requested capacity in bytes, when the orchestrator supplied one.
    pub capacity_bytes: Option<u64>,
    /// Access modes requested by the orchestrator.
    pub access_modes: Vec<AccessMode>,
    /// Storage-class parameters, passed through opaquely.
    pub parameters: HashMap<String, String>,
    /// Claim annotations, passed through opaquely.
    pub annotations: HashMap<String, String>,
    /// Mount options copied verbatim onto the resulting descriptor.
    pub mount_options: Vec<String>,
    /// Reclaim policy copied onto the resulting descriptor.
    pub reclaim_policy: ReclaimPolicy,
}

impl VolumeRequest {
    /// Starts a builder for a [`VolumeRequest`].
    #[must_use]
    pub fn builder() -> VolumeRequestBuilder {
        VolumeRequestBuilder::new()
    }

    /// Validates the request fields that gate any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingField`] when the name or access-mode
    /// set is empty and [`RequestError::UnsupportedAccessMode`] when any mode
    /// other than `ReadWriteOnce` is present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.name.is_empty() {
            return Err(RequestError::MissingField("name"));
        }
        if self.access_modes.is_empty() {
            return Err(RequestError::MissingField("access_modes"));
        }
        for mode in &self.access_modes {
            if *mode != AccessMode::ReadWriteOnce {
                return Err(RequestError::UnsupportedAccessMode {
                    mode: mode.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Extracts the requested capacity.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingCapacity`] when the capacity is absent
    /// or zero.
    pub fn requested_capacity(&self) -> Result<u64, RequestError> {
        match self.capacity_bytes {
            Some(bytes) if bytes > 0 => Ok(bytes),
            _ => Err(RequestError::MissingCapacity),
        }
    }

    /// Filesystem type for the volume, defaulting to `ext4`.
    #[must_use]
    pub fn fs_type(&self) -> &str {
        self.parameters
            .get(FS_TYPE_PARAM)
            .map_or(DEFAULT_FS_TYPE, String::as_str)
    }

    /// Whether this request participates in minimum-size rounding.
    ///
    /// Defaults to `true`; only an explicit, well-formed `false` in the
    /// storage-class parameters opts the request out.
    #[must_use]
    pub fn rounding_enabled(&self) -> bool {
        self.parameters
            .get(VOLUME_ROUNDING_PARAM)
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(true)
    }

    /// Backup to restore from, when the claim is annotated with one.
    #[must_use]
    pub fn backup_id(&self) -> Option<&str> {
        self.annotations
            .get(BACKUP_SOURCE_ANNOTATION)
            .map(String::as_str)
    }
}

/// Builder for [`VolumeRequest`] that defers trimming and validation to
/// construction.
#[derive(Clone, Debug, Default)]
pub struct VolumeRequestBuilder {
    name: String,
    capacity_bytes: Option<u64>,
    access_modes: Vec<AccessMode>,
    parameters: HashMap<String, String>,
    annotations: HashMap<String, String>,
    mount_options: Vec<String>,
    reclaim_policy: ReclaimPolicy,
}

impl VolumeRequestBuilder {
    /// Creates an empty builder; fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logical name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the requested capacity in bytes.
    #[must_use]
    pub const fn capacity_bytes(mut self, value: u64) -> Self {
        self.capacity_bytes = Some(value);
        self
    }

    /// Appends an access mode.
    #[must_use]
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_modes.push(mode);
        self
    }

    /// Inserts a storage-class parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Inserts a claim annotation.
    #[must_use]
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Sets the mount options.
    #[must_use]
    pub fn mount_options(mut self, options: Vec<String>) -> Self {
        self.mount_options = options;
        self
    }

    /// Sets the reclaim policy.
    #[must_use]
    pub const fn reclaim_policy(mut self, policy: ReclaimPolicy) -> Self {
        self.reclaim_policy = policy;
        self
    }

    /// Builds and validates the [`VolumeRequest`], trimming the name.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when validation fails.
    pub fn build(self) -> Result<VolumeRequest, RequestError> {
        let request = VolumeRequest {
            name: self.name.trim().to_owned(),
            capacity_bytes: self.capacity_bytes,
            access_modes: self.access_modes,
            parameters: self.parameters,
            annotations: self.annotations,
            mount_options: self.mount_options,
            reclaim_policy: self.reclaim_policy,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Errors raised while validating a volume request.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RequestError {
    /// Raised when a required field is missing or empty.
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),
    /// Raised when the request asks for anything but single-writer access.
    #[error("invalid access mode {mode}; only ReadWriteOnce is supported")]
    UnsupportedAccessMode {
        /// The offending mode.
        mode: String,
    },
    /// Raised when the request carries no usable capacity.
    #[error("volume request does not specify a positive storage capacity")]
    MissingCapacity,
}
