//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::client::{
    ClientError, ClientFuture, CreateVolumeDetails, StorageClient, VolumeLifecycleState,
    VolumeSummary,
};
use crate::metadata::{InstanceMetadata, MetadataError, MetadataFuture};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One scripted answer to a status query.
#[derive(Clone, Debug)]
enum GetScript {
    State(VolumeLifecycleState),
    Error(ClientError),
    /// Never resolves; simulates a hung call for per-call deadline tests.
    Hang,
}

/// Scripted storage client that answers calls from pre-seeded FIFO queues.
///
/// Used to drive deterministic lifecycle outcomes without a real API. Every
/// call is recorded so tests can assert on the exact payloads and ordering
/// the provisioner produced.
#[derive(Clone, Debug)]
pub struct ScriptedClient {
    compartment_id: String,
    tenancy_id: String,
    call_timeout: Duration,
    create_responses: Arc<Mutex<VecDeque<Result<String, ClientError>>>>,
    get_responses: Arc<Mutex<VecDeque<GetScript>>>,
    steady_state: Arc<Mutex<Option<VolumeLifecycleState>>>,
    delete_responses: Arc<Mutex<VecDeque<Result<(), ClientError>>>>,
    created: Arc<Mutex<Vec<CreateVolumeDetails>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    /// Creates a client with placeholder identity and no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
            tenancy_id: String::from("ocid1.tenancy.oc1..dddd"),
            call_timeout: crate::client::DEFAULT_CALL_TIMEOUT,
            create_responses: Arc::default(),
            get_responses: Arc::default(),
            steady_state: Arc::default(),
            delete_responses: Arc::default(),
            created: Arc::default(),
            deleted: Arc::default(),
        }
    }

    /// Overrides the per-call deadline reported by the client.
    #[must_use]
    pub const fn with_call_timeout(mut self, deadline: Duration) -> Self {
        self.call_timeout = deadline;
        self
    }

    /// Queues a successful creation returning the given volume identifier.
    pub fn push_create_ok(&self, volume_id: impl Into<String>) {
        lock(&self.create_responses).push_back(Ok(volume_id.into()));
    }

    /// Queues a failed creation.
    pub fn push_create_error(&self, error: ClientError) {
        lock(&self.create_responses).push_back(Err(error));
    }

    /// Queues one status answer reporting the given lifecycle state.
    pub fn push_get_state(&self, state: VolumeLifecycleState) {
        lock(&self.get_responses).push_back(GetScript::State(state));
    }

    /// Queues one failing status answer.
    pub fn push_get_error(&self, error: ClientError) {
        lock(&self.get_responses).push_back(GetScript::Error(error));
    }

    /// Queues one status answer that never arrives.
    pub fn push_get_hang(&self) {
        lock(&self.get_responses).push_back(GetScript::Hang);
    }

    /// State reported forever once the scripted answers run out.
    pub fn set_steady_state(&self, state: VolumeLifecycleState) {
        *lock(&self.steady_state) = Some(state);
    }

    /// Queues a failed deletion. Deletions succeed when nothing is queued.
    pub fn push_delete_error(&self, error: ClientError) {
        lock(&self.delete_responses).push_back(Err(error));
    }

    /// Returns every creation payload received so far.
    #[must_use]
    pub fn created(&self) -> Vec<CreateVolumeDetails> {
        lock(&self.created).clone()
    }

    /// Returns every volume identifier a deletion was issued for.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }

    fn next_get(&self, volume_id: &str) -> Result<GetScript, ClientError> {
        let scripted = lock(&self.get_responses).pop_front();
        if let Some(entry) = scripted {
            return Ok(entry);
        }
        let steady = *lock(&self.steady_state);
        steady.map_or_else(
            || {
                Err(ClientError::Transport {
                    operation: String::from("GetVolume"),
                    message: format!("no scripted response available for {volume_id}"),
                })
            },
            |state| Ok(GetScript::State(state)),
        )
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageClient for ScriptedClient {
    fn compartment_id(&self) -> &str {
        &self.compartment_id
    }

    fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    fn create_volume<'a>(
        &'a self,
        details: &'a CreateVolumeDetails,
    ) -> ClientFuture<'a, VolumeSummary> {
        Box::pin(async move {
            lock(&self.created).push(details.clone());
            let response = lock(&self.create_responses).pop_front().unwrap_or_else(|| {
                Err(ClientError::Transport {
                    operation: String::from("CreateVolume"),
                    message: String::from("no scripted response available"),
                })
            });
            response.map(|volume_id| VolumeSummary {
                id: volume_id,
                availability_domain: details.availability_domain.clone(),
                lifecycle_state: VolumeLifecycleState::Provisioning,
                size_in_mbs: details.size_in_mbs,
            })
        })
    }

    fn get_volume<'a>(&'a self, volume_id: &'a str) -> ClientFuture<'a, VolumeSummary> {
        Box::pin(async move {
            match self.next_get(volume_id)? {
                GetScript::State(state) => Ok(VolumeSummary {
                    id: volume_id.to_owned(),
                    availability_domain: String::from("PHX-AD-1"),
                    lifecycle_state: state,
                    size_in_mbs: 51200,
                }),
                GetScript::Error(error) => Err(error),
                GetScript::Hang => {
                    std::future::pending::<()>().await;
                    Err(ClientError::Transport {
                        operation: String::from("GetVolume"),
                        message: String::from("unreachable"),
                    })
                }
            }
        })
    }

    fn delete_volume<'a>(&'a self, volume_id: &'a str) -> ClientFuture<'a, ()> {
        Box::pin(async move {
            lock(&self.deleted).push(volume_id.to_owned());
            lock(&self.delete_responses).pop_front().unwrap_or(Ok(()))
        })
    }
}

/// Metadata double that returns a fixed answer and counts lookups.
#[derive(Clone, Debug)]
pub struct StaticMetadata {
    response: Result<String, MetadataError>,
    lookups: Arc<Mutex<usize>>,
}

impl StaticMetadata {
    /// Creates a double that reports the given region.
    #[must_use]
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            response: Ok(region.into()),
            lookups: Arc::default(),
        }
    }

    /// Creates a double whose lookups fail with the given error.
    #[must_use]
    pub fn failing(error: MetadataError) -> Self {
        Self {
            response: Err(error),
            lookups: Arc::default(),
        }
    }

    /// Number of lookups issued against this double.
    #[must_use]
    pub fn lookups(&self) -> usize {
        *lock(&self.lookups)
    }
}

impl InstanceMetadata for StaticMetadata {
    fn region(&self) -> MetadataFuture<'_, String> {
        Box::pin(async move {
            *lock(&self.lookups) += 1;
            self.response.clone()
        })
    }
}
