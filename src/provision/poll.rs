//! Availability polling for newly created volumes.

use std::time::Instant;

use log::debug;
use tokio::time::sleep;

use crate::client::{StorageClient, VolumeLifecycleState};
use crate::metadata::InstanceMetadata;

use super::{BlockProvisioner, ProvisionError};

/// Classification of a single availability check.
///
/// Derived fresh from every status query; never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// The volume is still converging; poll again after the interval.
    Pending,
    /// The volume is available for use.
    Ready,
    /// The volume reached a state it will never leave.
    Failed(VolumeLifecycleState),
}

impl PollOutcome {
    /// Classifies a provider-reported lifecycle state.
    ///
    /// Unknown states count as pending: the provider adds states over time
    /// and a conservative re-poll is always safe under the overall deadline.
    #[must_use]
    pub const fn classify(state: VolumeLifecycleState) -> Self {
        match state {
            VolumeLifecycleState::Available => Self::Ready,
            VolumeLifecycleState::Faulty
            | VolumeLifecycleState::Terminated
            | VolumeLifecycleState::Terminating => Self::Failed(state),
            VolumeLifecycleState::Provisioning
            | VolumeLifecycleState::Restoring
            | VolumeLifecycleState::Unknown => Self::Pending,
        }
    }
}

impl<C, M> BlockProvisioner<C, M>
where
    C: StorageClient,
    M: InstanceMetadata,
{
    /// Polls the volume until it is available, fails, or the deadline passes.
    ///
    /// The first status query is issued immediately after creation; only
    /// provider-reported lifecycle states are re-polled. A transport error on
    /// a status query aborts the loop at once, and the faulty, terminated,
    /// and terminating states never self-heal, so they end the loop on first
    /// sight.
    pub(crate) async fn wait_for_available(&self, volume_id: &str) -> Result<(), ProvisionError> {
        let deadline = Instant::now() + self.provision_timeout;
        loop {
            let volume = self
                .bounded_call("GetVolume", self.client.get_volume(volume_id))
                .await?;
            debug!(
                "volume {volume_id} reported lifecycle state {}",
                volume.lifecycle_state
            );

            match PollOutcome::classify(volume.lifecycle_state) {
                PollOutcome::Ready => return Ok(()),
                PollOutcome::Failed(state) => {
                    return Err(ProvisionError::VolumeFailed {
                        volume_id: volume_id.to_owned(),
                        state,
                    });
                }
                PollOutcome::Pending => {}
            }

            if Instant::now() >= deadline {
                return Err(ProvisionError::WaitTimeout {
                    volume_id: volume_id.to_owned(),
                    waited_secs: self.provision_timeout.as_secs(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
