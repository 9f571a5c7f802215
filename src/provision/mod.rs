//! Volume provisioning lifecycle against the Block Storage API.
//!
//! [`BlockProvisioner`] drives the full create path: validate the request,
//! normalise the size, issue creation, poll until the provider reports the
//! volume available, and compensate with a best-effort delete when it never
//! does. Teardown lives in the same type so both directions share the client
//! and its per-call deadline handling.

mod delete;
mod error;
mod poll;

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::timeout;

use crate::client::{ClientError, ClientFuture, CreateVolumeDetails, StorageClient};
use crate::config::ProvisionerConfig;
use crate::descriptor::{REGION_LABEL, VOLUME_ID_ANNOTATION, VolumeDescriptor, ZONE_LABEL};
use crate::metadata::InstanceMetadata;
use crate::request::VolumeRequest;
use crate::size;

pub use error::ProvisionError;
pub use poll::PollOutcome;

/// Fixed delay between availability polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

const DISPLAY_NAME_PREFIX: &str = "ocibv-";

/// Provisions and deletes block volumes on behalf of a cluster orchestrator.
///
/// The provisioner holds only read-only configuration plus shared client
/// handles, so a single instance can serve concurrent operations for distinct
/// volumes. Every suspension point is a tokio future; dropping a returned
/// future (for example under a caller-side deadline) aborts the in-flight
/// call and the poll loop with it.
#[derive(Clone, Debug)]
pub struct BlockProvisioner<C, M> {
    client: C,
    metadata: M,
    region_override: Option<String>,
    volume_rounding_enabled: bool,
    min_volume_size_bytes: u64,
    provision_timeout: Duration,
    poll_interval: Duration,
}

impl<C, M> BlockProvisioner<C, M>
where
    C: StorageClient,
    M: InstanceMetadata,
{
    /// Creates a provisioner from configuration and shared collaborators.
    #[must_use]
    pub fn new(client: C, metadata: M, config: &ProvisionerConfig) -> Self {
        debug!(
            "block provisioner initialised for compartment {} in tenancy {}",
            client.compartment_id(),
            client.tenancy_id()
        );
        Self {
            client,
            metadata,
            region_override: config.region.clone(),
            volume_rounding_enabled: config.volume_rounding_enabled,
            min_volume_size_bytes: config.min_volume_size_bytes,
            provision_timeout: config.provision_timeout(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Overrides the availability poll interval.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the overall provisioning deadline.
    ///
    /// This is primarily used by tests to keep timeout scenarios fast.
    #[must_use]
    pub const fn with_provision_timeout(mut self, deadline: Duration) -> Self {
        self.provision_timeout = deadline;
        self
    }

    /// Provisions a volume in the given availability domain.
    ///
    /// On success the returned descriptor carries the provider volume
    /// identifier, the granted capacity (after any minimum-size rounding),
    /// and region/zone labels. When the volume reaches a terminal failure
    /// state or the deadline passes, exactly one best-effort delete is issued
    /// for it and the original failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Request`] when validation fails (before any
    /// API call), [`ProvisionError::Client`] when a call fails,
    /// [`ProvisionError::VolumeFailed`] or [`ProvisionError::WaitTimeout`]
    /// when the volume never becomes available, and
    /// [`ProvisionError::Region`] when the region lookup fails after the
    /// volume is already usable.
    pub async fn provision(
        &self,
        request: &VolumeRequest,
        availability_domain: &str,
    ) -> Result<VolumeDescriptor, ProvisionError> {
        request.validate()?;
        let requested = request.requested_capacity()?;

        let effective = size::apply_minimum_floor(
            requested,
            self.min_volume_size_bytes,
            self.volume_rounding_enabled,
            request.rounding_enabled(),
        );
        if effective.rounded {
            warn!(
                "requested capacity {requested} is below the minimum of {} bytes; rounding up",
                self.min_volume_size_bytes
            );
        }
        let size_in_mbs = size::allocation_units(effective.bytes, size::MIB);

        info!(
            "provisioning volume {DISPLAY_NAME_PREFIX}{} in {availability_domain} ({size_in_mbs} MiB)",
            request.name
        );

        let details = CreateVolumeDetails {
            availability_domain: availability_domain.to_owned(),
            compartment_id: self.client.compartment_id().to_owned(),
            display_name: format!("{DISPLAY_NAME_PREFIX}{}", request.name),
            size_in_mbs,
            source_backup_id: request.backup_id().map(str::to_owned),
        };
        if let Some(backup_id) = request.backup_id() {
            info!("creating volume from backup {backup_id}");
        }

        let volume = self
            .bounded_call("CreateVolume", self.client.create_volume(&details))
            .await?;

        info!("waiting for volume {} to become available", volume.id);
        if let Err(wait_error) = self.wait_for_available(&volume.id).await {
            self.cleanup_failed_volume(&volume.id).await;
            return Err(wait_error);
        }

        let region = self.resolve_region().await?;
        Ok(Self::build_descriptor(
            request,
            &volume.id,
            effective.bytes,
            &region,
            availability_domain,
        ))
    }

    /// Runs a client call under the client's per-call deadline.
    pub(crate) async fn bounded_call<T>(
        &self,
        operation: &str,
        call: ClientFuture<'_, T>,
    ) -> Result<T, ClientError> {
        let deadline = self.client.call_timeout();
        match timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::timed_out(operation, deadline)),
        }
    }

    /// Best-effort removal of a volume that never became usable.
    ///
    /// The outcome is logged, never returned: the provisioning failure that
    /// led here remains the reported error.
    async fn cleanup_failed_volume(&self, volume_id: &str) {
        match self
            .bounded_call("DeleteVolume", self.client.delete_volume(volume_id))
            .await
        {
            Ok(()) => info!("deleted volume {volume_id} after failed provisioning"),
            Err(cleanup_error) => warn!(
                "failed to delete volume {volume_id} after failed provisioning: {cleanup_error}"
            ),
        }
    }

    /// Resolves the region label, preferring the configured override.
    ///
    /// A lookup failure here leaves the already-available volume in place:
    /// deleting a healthy volume over a label is worse than handing the
    /// orphan to external reconciliation.
    async fn resolve_region(&self) -> Result<String, ProvisionError> {
        if let Some(region) = &self.region_override {
            return Ok(region.clone());
        }
        self.metadata.region().await.map_err(ProvisionError::Region)
    }

    fn build_descriptor(
        request: &VolumeRequest,
        volume_id: &str,
        capacity_bytes: u64,
        region: &str,
        availability_domain: &str,
    ) -> VolumeDescriptor {
        let mut annotations = HashMap::new();
        annotations.insert(VOLUME_ID_ANNOTATION.to_owned(), volume_id.to_owned());

        let mut labels = HashMap::new();
        labels.insert(REGION_LABEL.to_owned(), region.to_owned());
        labels.insert(ZONE_LABEL.to_owned(), availability_domain.to_owned());

        VolumeDescriptor {
            name: volume_id.to_owned(),
            annotations,
            labels,
            capacity_bytes,
            access_modes: request.access_modes.clone(),
            reclaim_policy: request.reclaim_policy,
            fs_type: request.fs_type().to_owned(),
            mount_options: request.mount_options.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
