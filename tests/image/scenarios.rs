//! BDD scenarios for the image lifecycle.

use rstest_bdd_macros::scenario;

use super::test_helpers::{LifecycleContext, lifecycle_context};

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Delete removes every snapshot before the image"
)]
fn scenario_cascade_delete(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Best-effort delete reports the snapshot left behind"
)]
fn scenario_best_effort_delete(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Abort policy keeps the image when a snapshot cannot be deleted"
)]
fn scenario_abort_delete(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Deploy group tag is read back"
)]
fn scenario_deploy_group_round_trip(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Untagged image has no deploy group"
)]
fn scenario_deploy_group_absent(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Capture an instance with no block devices"
)]
fn scenario_capture_without_devices(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}

#[scenario(
    path = "tests/features/image_lifecycle.feature",
    name = "Capture an instance straight into a deploy group"
)]
fn scenario_capture_into_group(lifecycle_context: LifecycleContext) {
    let _ = lifecycle_context;
}
