//! Teardown scenarios, including the idempotent not-found path.

#[path = "common/test_constants.rs"]
mod test_constants;

use std::collections::HashMap;
use std::time::Duration;

use oci_block_provisioner::descriptor::VOLUME_ID_ANNOTATION;
use oci_block_provisioner::test_support::{ScriptedClient, StaticMetadata};
use oci_block_provisioner::{
    AccessMode, BlockProvisioner, ClientError, ProvisionError, ProvisionerConfig, ReclaimPolicy,
    VolumeDescriptor,
};

use test_constants::VOLUME_ID;

fn provisioner(client: &ScriptedClient) -> BlockProvisioner<ScriptedClient, StaticMetadata> {
    let config = ProvisionerConfig {
        compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
        tenancy_id: String::from("ocid1.tenancy.oc1..dddd"),
        ..ProvisionerConfig::default()
    };
    BlockProvisioner::new(
        client.clone(),
        StaticMetadata::with_region("phx"),
        &config,
    )
    .with_poll_interval(Duration::from_millis(1))
}

fn descriptor() -> VolumeDescriptor {
    let mut annotations = HashMap::new();
    annotations.insert(VOLUME_ID_ANNOTATION.to_owned(), VOLUME_ID.to_owned());
    VolumeDescriptor {
        name: VOLUME_ID.to_owned(),
        annotations,
        labels: HashMap::new(),
        capacity_bytes: 1024,
        access_modes: vec![AccessMode::ReadWriteOnce],
        reclaim_policy: ReclaimPolicy::Delete,
        fs_type: String::from("ext4"),
        mount_options: Vec::new(),
    }
}

#[tokio::test]
async fn deleting_an_absent_volume_is_a_success() {
    let client = ScriptedClient::new();
    client.push_delete_error(ClientError::Service {
        operation: String::from("DeleteVolume"),
        status: 404,
        code: None,
        message: String::from("no such volume"),
    });

    let result = provisioner(&client).delete(&descriptor()).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn delete_failures_other_than_not_found_surface() {
    let client = ScriptedClient::new();
    client.push_delete_error(ClientError::Transport {
        operation: String::from("DeleteVolume"),
        message: String::from("connection reset"),
    });

    let result = provisioner(&client).delete(&descriptor()).await;
    assert!(
        matches!(result, Err(ProvisionError::Client(_))),
        "unexpected delete outcome: {result:?}"
    );
}

#[tokio::test]
async fn foreign_descriptors_are_rejected_before_any_call() {
    let client = ScriptedClient::new();
    let foreign = VolumeDescriptor {
        annotations: HashMap::new(),
        name: String::from("adopted-volume"),
        ..descriptor()
    };

    let result = provisioner(&client).delete(&foreign).await;
    assert_eq!(
        result,
        Err(ProvisionError::MissingVolumeAnnotation {
            name: String::from("adopted-volume"),
        })
    );
    assert!(client.deleted().is_empty());
}
