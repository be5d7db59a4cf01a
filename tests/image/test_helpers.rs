//! Shared fixtures and helpers for image lifecycle BDD scenarios.

use std::cell::RefCell;

use autoscale_images::test_support::RecordingCloud;
use autoscale_images::{BlockDeviceMapping, Image, ImageError};
use rstest::fixture;

#[derive(Debug)]
pub struct LifecycleContext {
    pub cloud: RecordingCloud,
    pub source_instance: RefCell<Option<String>>,
    pub image: RefCell<Option<Image>>,
    pub delete_outcome: RefCell<Option<Result<(), ImageError>>>,
    pub deploy_group: RefCell<Option<Option<String>>>,
}

impl LifecycleContext {
    pub fn take_image(&self) -> Image {
        self.image
            .borrow_mut()
            .take()
            .unwrap_or_else(|| panic!("test setup requires an image"))
    }

    pub fn with_image<T>(&self, f: impl FnOnce(&Image) -> T) -> T {
        let image = self.image.borrow();
        let Some(current) = image.as_ref() else {
            panic!("test setup requires an image");
        };
        f(current)
    }
}

#[fixture]
pub fn lifecycle_context() -> LifecycleContext {
    LifecycleContext {
        cloud: RecordingCloud::new(),
        source_instance: RefCell::new(None),
        image: RefCell::new(None),
        delete_outcome: RefCell::new(None),
        deploy_group: RefCell::new(None),
    }
}

/// Splits a comma separated list from a step argument.
pub fn id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn mappings(snapshot_ids: &[String]) -> Vec<BlockDeviceMapping> {
    snapshot_ids
        .iter()
        .map(|id| BlockDeviceMapping::with_snapshot(id.as_str()))
        .collect()
}
