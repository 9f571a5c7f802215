//! Volume teardown with idempotent not-found handling.

use log::info;

use crate::client::StorageClient;
use crate::descriptor::VolumeDescriptor;
use crate::metadata::InstanceMetadata;

use super::{BlockProvisioner, ProvisionError};

impl<C, M> BlockProvisioner<C, M>
where
    C: StorageClient,
    M: InstanceMetadata,
{
    /// Deletes the volume a descriptor points at.
    ///
    /// Deletion is idempotent: a not-found answer means the desired end state
    /// already holds and counts as success. No retries happen here; callers
    /// re-invoke on transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingVolumeAnnotation`] when the
    /// descriptor carries no volume identifier and
    /// [`ProvisionError::Client`] for any deletion failure other than
    /// not-found.
    pub async fn delete(&self, descriptor: &VolumeDescriptor) -> Result<(), ProvisionError> {
        let volume_id =
            descriptor
                .volume_id()
                .ok_or_else(|| ProvisionError::MissingVolumeAnnotation {
                    name: descriptor.name.clone(),
                })?;

        info!("deleting volume {volume_id}");
        match self
            .bounded_call("DeleteVolume", self.client.delete_volume(volume_id))
            .await
        {
            Ok(()) => Ok(()),
            Err(delete_error) if delete_error.is_not_found() => {
                info!("volume {volume_id} is already gone; nothing to delete");
                Ok(())
            }
            Err(delete_error) => Err(ProvisionError::Client(delete_error)),
        }
    }
}
