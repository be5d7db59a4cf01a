//! BDD step definitions for image lifecycle behaviour.

use autoscale_images::test_support::CloudCall;
use autoscale_images::{
    CascadePolicy, CreateOptions, IMAGE_NAME_PREFIX, Image, ImageError, RemoteOperation,
};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{LifecycleContext, id_list, mappings};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("an image \"{image_id}\" backed by snapshots \"{snapshots}\"")]
fn image_with_snapshots(lifecycle_context: &LifecycleContext, image_id: String, snapshots: String) {
    let block_devices = mappings(&id_list(&snapshots));
    lifecycle_context
        .cloud
        .register_image(&image_id, &block_devices);
    let image = Image::new(image_id, block_devices)
        .unwrap_or_else(|err| panic!("image should build: {err}"));
    lifecycle_context.image.replace(Some(image));
}

#[given("an image \"{image_id}\" with no snapshots")]
fn image_without_snapshots(lifecycle_context: &LifecycleContext, image_id: String) {
    lifecycle_context.cloud.register_image(&image_id, &[]);
    let image =
        Image::with_id(image_id).unwrap_or_else(|err| panic!("image should build: {err}"));
    lifecycle_context.image.replace(Some(image));
}

#[given("the provider rejects deleting snapshot \"{snapshot_id}\"")]
fn provider_rejects_snapshot(lifecycle_context: &LifecycleContext, snapshot_id: String) {
    lifecycle_context
        .cloud
        .fail(RemoteOperation::DeleteSnapshot, &snapshot_id);
}

#[given(
    "the instance \"{instance_id}\" will be captured as image \"{image_id}\" with no block devices"
)]
fn instance_captures_to(lifecycle_context: &LifecycleContext, instance_id: String, image_id: String) {
    lifecycle_context.cloud.expect_created_image(&image_id, &[]);
    lifecycle_context.source_instance.replace(Some(instance_id));
}

#[when("I delete the image")]
fn delete_image(lifecycle_context: &LifecycleContext) {
    let image = lifecycle_context.take_image();
    let outcome = image.delete(&lifecycle_context.cloud);
    lifecycle_context.delete_outcome.replace(Some(outcome));
}

#[when("I delete the image stopping at the first failure")]
fn delete_image_aborting(lifecycle_context: &LifecycleContext) {
    let image = lifecycle_context.take_image();
    let outcome =
        image.delete_with_policy(&lifecycle_context.cloud, CascadePolicy::AbortOnFirstFailure);
    lifecycle_context.delete_outcome.replace(Some(outcome));
}

#[when("I tag the image with deploy group \"{group}\"")]
fn tag_deploy_group(lifecycle_context: &LifecycleContext, group: String) {
    lifecycle_context
        .with_image(|image| image.tag_deploy_group(&lifecycle_context.cloud, &group))
        .unwrap_or_else(|err| panic!("tag should succeed: {err}"));
}

#[when("I read the deploy group")]
fn read_deploy_group(lifecycle_context: &LifecycleContext) {
    let group = lifecycle_context
        .with_image(|image| image.deploy_group(&lifecycle_context.cloud))
        .unwrap_or_else(|err| panic!("read should succeed: {err}"));
    lifecycle_context.deploy_group.replace(Some(group));
}

#[when("I create an image from instance \"{instance_id}\"")]
fn create_image(lifecycle_context: &LifecycleContext, instance_id: String) {
    let image = Image::create(&lifecycle_context.cloud, &instance_id, &CreateOptions::new())
        .unwrap_or_else(|err| panic!("create should succeed: {err}"));
    lifecycle_context.image.replace(Some(image));
}

#[when("I create an image for deploy group \"{group}\" from instance \"{instance_id}\"")]
fn create_image_in_group(lifecycle_context: &LifecycleContext, group: String, instance_id: String) {
    let options = CreateOptions::new().deploy_group(group);
    let image = Image::create(&lifecycle_context.cloud, &instance_id, &options)
        .unwrap_or_else(|err| panic!("create should succeed: {err}"));
    lifecycle_context.image.replace(Some(image));
}

#[then("the delete succeeds")]
fn delete_succeeds(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    match lifecycle_context.delete_outcome.borrow().as_ref() {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) => Err(StepError::Assertion(format!(
            "expected delete to succeed, got: {err}"
        ))),
        None => Err(StepError::Assertion(String::from("missing delete outcome"))),
    }
}

#[then("the delete reports snapshot \"{snapshot_id}\" left behind")]
fn delete_reports_orphan(
    lifecycle_context: &LifecycleContext,
    snapshot_id: String,
) -> Result<(), StepError> {
    let outcome = lifecycle_context.delete_outcome.borrow();
    let Some(Err(err)) = outcome.as_ref() else {
        return Err(StepError::Assertion(String::from(
            "expected delete to fail",
        )));
    };
    if !matches!(err, ImageError::PartialCascadeFailure { .. }) {
        return Err(StepError::Assertion(format!(
            "expected partial cascade failure, got: {err}"
        )));
    }
    if err.orphaned_snapshot_ids() == [snapshot_id.as_str()] {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {snapshot_id} left behind, got {:?}",
            err.orphaned_snapshot_ids()
        )))
    }
}

#[then("the provider saw deletes in order \"{resources}\"")]
fn deletes_in_order(
    lifecycle_context: &LifecycleContext,
    resources: String,
) -> Result<(), StepError> {
    let deleted = lifecycle_context
        .cloud
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            CloudCall::DeleteSnapshot(id) | CloudCall::DeleteImage(id) => Some(id),
            _ => None,
        })
        .collect::<Vec<_>>();
    let expected = id_list(&resources);
    if deleted == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected deletes {expected:?}, got {deleted:?}"
        )))
    }
}

#[then("the image \"{image_id}\" no longer exists")]
fn image_gone(lifecycle_context: &LifecycleContext, image_id: String) -> Result<(), StepError> {
    if lifecycle_context.cloud.has_image(&image_id) {
        return Err(StepError::Assertion(format!("{image_id} still exists")));
    }
    Ok(())
}

#[then("the image \"{image_id}\" still exists")]
fn image_kept(lifecycle_context: &LifecycleContext, image_id: String) -> Result<(), StepError> {
    if lifecycle_context.cloud.has_image(&image_id) {
        return Ok(());
    }
    Err(StepError::Assertion(format!("{image_id} was deleted")))
}

#[then("the deploy group is \"{group}\"")]
fn deploy_group_is(lifecycle_context: &LifecycleContext, group: String) -> Result<(), StepError> {
    let observed = lifecycle_context.deploy_group.borrow().clone();
    if observed == Some(Some(group.clone())) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected deploy group {group}, got {observed:?}"
        )))
    }
}

#[then("no deploy group is reported")]
fn no_deploy_group(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    let observed = lifecycle_context.deploy_group.borrow().clone();
    if observed == Some(None) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no deploy group, got {observed:?}"
        )))
    }
}

#[then("the created image is \"{image_id}\" with no snapshots")]
fn created_image_is(
    lifecycle_context: &LifecycleContext,
    image_id: String,
) -> Result<(), StepError> {
    lifecycle_context.with_image(|image| {
        if image.id() != image_id {
            return Err(StepError::Assertion(format!(
                "expected image {image_id}, got {}",
                image.id()
            )));
        }
        if !image.snapshots().is_empty() {
            return Err(StepError::Assertion(format!(
                "expected no snapshots, got {:?}",
                image.snapshots()
            )));
        }
        Ok(())
    })
}

#[then("the image was captured from that instance under an autoscale timestamp name")]
fn image_captured_from_instance(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    let expected_instance = lifecycle_context
        .source_instance
        .borrow()
        .clone()
        .ok_or_else(|| StepError::Assertion(String::from("missing source instance")))?;
    let (instance_id, name) = lifecycle_context
        .cloud
        .calls()
        .into_iter()
        .find_map(|call| match call {
            CloudCall::CreateImage {
                instance_id, name, ..
            } => Some((instance_id, name)),
            _ => None,
        })
        .ok_or_else(|| StepError::Assertion(String::from("missing create call")))?;
    if instance_id != expected_instance {
        return Err(StepError::Assertion(format!(
            "expected capture of {expected_instance}, got {instance_id}"
        )));
    }
    let is_timestamped = name
        .strip_prefix(IMAGE_NAME_PREFIX)
        .is_some_and(|secs| !secs.is_empty() && secs.chars().all(|c| c.is_ascii_digit()));
    if is_timestamped {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("unexpected image name {name}")))
    }
}
