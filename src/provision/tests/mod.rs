//! Unit tests for the provisioning lifecycle.


use std::time::Duration;

use crate::config::ProvisionerConfig;
use crate::provision::BlockProvisioner;
use crate::request::{AccessMode, VolumeRequest};
use crate::test_support::{ScriptedClient, StaticMetadata};

const GIB: u64 = 1024 * 1024 * 1024;
const VOLUME_ID: &str = "ocid1.volume.oc1..cccc";

fn test_config() -> ProvisionerConfig {
    ProvisionerConfig {
        compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
        tenancy_id: String::from("ocid1.tenancy.oc1..dddd"),
        region: None,
        min_volume_size_bytes: 50 * GIB,
        volume_rounding_enabled: true,
        provision_timeout_secs: 300,
    }
}

/// Provisioner wired to scripted doubles with a fast poll interval.
fn fast_provisioner(
    client: &ScriptedClient,
    metadata: &StaticMetadata,
) -> BlockProvisioner<ScriptedClient, StaticMetadata> {
    BlockProvisioner::new(client.clone(), metadata.clone(), &test_config())
        .with_poll_interval(Duration::from_millis(1))
}

fn request_for(capacity_bytes: u64) -> VolumeRequest {
    VolumeRequest::builder()
        .name("data")
        .capacity_bytes(capacity_bytes)
        .access_mode(AccessMode::ReadWriteOnce)
        .build()
        .unwrap_or_else(|err| panic!("request should be valid: {err}"))
}
