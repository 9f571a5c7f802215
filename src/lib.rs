//! Block volume provisioning for cluster orchestrators.
//!
//! The crate translates an abstract "give me N GiB of durable storage"
//! request into OCI Block Storage API calls and turns that API's
//! asynchronous lifecycle into a synchronous outcome: create → poll until
//! available under a deadline → compensating delete when the volume never
//! becomes usable, plus idempotent deletion at teardown. The SDK client
//! itself stays behind the [`client::StorageClient`] trait supplied by the
//! embedding process.

pub mod client;
pub mod config;
pub mod descriptor;
pub mod metadata;
pub mod provision;
pub mod request;
pub mod size;
pub mod test_support;

pub use client::{
    ClientError, CreateVolumeDetails, StorageClient, VolumeLifecycleState, VolumeSummary,
};
pub use config::{ConfigError, ProvisionerConfig};
pub use descriptor::VolumeDescriptor;
pub use metadata::{ImdsClient, InstanceMetadata, MetadataError};
pub use provision::{BlockProvisioner, PollOutcome, ProvisionError};
pub use request::{AccessMode, ReclaimPolicy, RequestError, VolumeRequest, VolumeRequestBuilder};
