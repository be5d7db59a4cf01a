//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ffi::OsString;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::gateway::{BlockDeviceMapping, ImageDescription, ImageGateway};
use crate::image::{Clock, RemoteOperation};
use crate::runner::{CommandOutput, CommandRunner, RunnerError};
use crate::tags::TagStore;

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Returns the argument following `flag`, if present.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        self.args
            .iter()
            .position(|arg| arg.to_string_lossy() == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(|value| value.to_string_lossy().into_owned())
    }

    /// Returns `true` when `arg` appears verbatim.
    #[must_use]
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|value| value.to_string_lossy() == arg)
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Pushes a successful exit status with empty output.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32, stderr: impl Into<String>) {
        self.push_output(Some(code), "", stderr);
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| RunnerError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// One call observed by [`RecordingCloud`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CloudCall {
    /// `create_image` call.
    CreateImage {
        /// Source instance.
        instance_id: String,
        /// Requested image name.
        name: String,
        /// Forwarded no-reboot flag.
        no_reboot: bool,
    },
    /// `describe_image` call.
    DescribeImage(String),
    /// `delete_image` call.
    DeleteImage(String),
    /// `delete_snapshot` call.
    DeleteSnapshot(String),
    /// `write_tag` call.
    WriteTag {
        /// Tagged resource.
        resource_id: String,
        /// Tag key.
        key: String,
        /// Tag value.
        value: String,
    },
    /// `read_tags` call.
    ReadTags(String),
}

/// Failure returned by [`RecordingCloud`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CloudFault {
    /// Failure injected by the test.
    #[error("injected {operation} failure for {resource_id}")]
    Injected {
        /// Failing primitive.
        operation: RemoteOperation,
        /// Targeted resource.
        resource_id: String,
    },
    /// The resource does not exist in the fake.
    #[error("{resource_id} does not exist")]
    NotFound {
        /// Missing resource.
        resource_id: String,
    },
}

#[derive(Debug, Default)]
struct CloudState {
    calls: Vec<CloudCall>,
    pending_images: VecDeque<String>,
    images: BTreeMap<String, Vec<BlockDeviceMapping>>,
    snapshots: BTreeSet<String>,
    tags: BTreeMap<String, BTreeMap<String, String>>,
    faults: BTreeSet<(RemoteOperation, String)>,
}

/// In-memory provider that records every call and keeps just enough state
/// for lifecycle tests: registered images, their snapshots, and tags.
#[derive(Clone, Debug, Default)]
pub struct RecordingCloud {
    state: Rc<RefCell<CloudState>>,
}

impl RecordingCloud {
    /// Creates an empty cloud.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an existing image with the given mappings.
    pub fn register_image(&self, image_id: &str, mappings: &[BlockDeviceMapping]) {
        let mut state = self.state.borrow_mut();
        for snapshot_id in mappings.iter().filter_map(BlockDeviceMapping::snapshot_id) {
            state.snapshots.insert(snapshot_id.to_owned());
        }
        state.images.insert(image_id.to_owned(), mappings.to_vec());
    }

    /// Makes the next `create_image` call return `image_id`, which then
    /// describes with `mappings`.
    pub fn expect_created_image(&self, image_id: &str, mappings: &[BlockDeviceMapping]) {
        self.register_image(image_id, mappings);
        self.state
            .borrow_mut()
            .pending_images
            .push_back(image_id.to_owned());
    }

    /// Makes every `operation` call against `resource_id` fail.
    pub fn fail(&self, operation: RemoteOperation, resource_id: &str) {
        self.state
            .borrow_mut()
            .faults
            .insert((operation, resource_id.to_owned()));
    }

    /// Sets a tag directly, bypassing the call log.
    pub fn seed_tag(&self, resource_id: &str, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .tags
            .entry(resource_id.to_owned())
            .or_default()
            .insert(key.to_owned(), value.to_owned());
    }

    /// Returns every call recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<CloudCall> {
        self.state.borrow().calls.clone()
    }

    /// Returns `true` when the image is still registered.
    #[must_use]
    pub fn has_image(&self, image_id: &str) -> bool {
        self.state.borrow().images.contains_key(image_id)
    }

    /// Returns `true` when the snapshot still exists.
    #[must_use]
    pub fn has_snapshot(&self, snapshot_id: &str) -> bool {
        self.state.borrow().snapshots.contains(snapshot_id)
    }

    fn record(
        &self,
        call: CloudCall,
        operation: RemoteOperation,
        resource_id: &str,
    ) -> Result<(), CloudFault> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state
            .faults
            .contains(&(operation, resource_id.to_owned()))
        {
            return Err(CloudFault::Injected {
                operation,
                resource_id: resource_id.to_owned(),
            });
        }
        Ok(())
    }
}

impl ImageGateway for RecordingCloud {
    type Error = CloudFault;

    fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        no_reboot: bool,
    ) -> Result<String, CloudFault> {
        self.record(
            CloudCall::CreateImage {
                instance_id: instance_id.to_owned(),
                name: name.to_owned(),
                no_reboot,
            },
            RemoteOperation::CreateImage,
            instance_id,
        )?;
        self.state
            .borrow_mut()
            .pending_images
            .pop_front()
            .ok_or_else(|| CloudFault::NotFound {
                resource_id: instance_id.to_owned(),
            })
    }

    fn describe_image(&self, image_id: &str) -> Result<ImageDescription, CloudFault> {
        self.record(
            CloudCall::DescribeImage(image_id.to_owned()),
            RemoteOperation::DescribeImage,
            image_id,
        )?;
        self.state
            .borrow()
            .images
            .get(image_id)
            .map(|mappings| ImageDescription {
                id: image_id.to_owned(),
                block_device_mappings: mappings.clone(),
            })
            .ok_or_else(|| CloudFault::NotFound {
                resource_id: image_id.to_owned(),
            })
    }

    fn delete_image(&self, image_id: &str) -> Result<(), CloudFault> {
        self.record(
            CloudCall::DeleteImage(image_id.to_owned()),
            RemoteOperation::DeleteImage,
            image_id,
        )?;
        let mut state = self.state.borrow_mut();
        state.tags.remove(image_id);
        state
            .images
            .remove(image_id)
            .map(|_| ())
            .ok_or_else(|| CloudFault::NotFound {
                resource_id: image_id.to_owned(),
            })
    }

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), CloudFault> {
        self.record(
            CloudCall::DeleteSnapshot(snapshot_id.to_owned()),
            RemoteOperation::DeleteSnapshot,
            snapshot_id,
        )?;
        if self.state.borrow_mut().snapshots.remove(snapshot_id) {
            Ok(())
        } else {
            Err(CloudFault::NotFound {
                resource_id: snapshot_id.to_owned(),
            })
        }
    }
}

impl TagStore for RecordingCloud {
    type Error = CloudFault;

    fn write_tag(&self, resource_id: &str, key: &str, value: &str) -> Result<(), CloudFault> {
        self.record(
            CloudCall::WriteTag {
                resource_id: resource_id.to_owned(),
                key: key.to_owned(),
                value: value.to_owned(),
            },
            RemoteOperation::WriteTag,
            resource_id,
        )?;
        self.seed_tag(resource_id, key, value);
        Ok(())
    }

    fn read_tags(&self, resource_id: &str) -> Result<BTreeMap<String, String>, CloudFault> {
        self.record(
            CloudCall::ReadTags(resource_id.to_owned()),
            RemoteOperation::ReadTags,
            resource_id,
        )?;
        Ok(self
            .state
            .borrow()
            .tags
            .get(resource_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at `seconds` after the Unix epoch.
    #[must_use]
    pub fn at_unix(seconds: i64) -> Self {
        Self(DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Produces a payload matching `aws ec2 create-image --output json`.
#[must_use]
pub fn json_create_image(image_id: &str) -> String {
    format!("{{\"ImageId\":\"{image_id}\"}}")
}

/// Produces a payload matching `aws ec2 describe-images --output json` for
/// one image whose block devices are backed by `snapshot_ids`.
#[must_use]
pub fn json_describe_image(image_id: &str, snapshot_ids: &[&str]) -> String {
    let mappings = snapshot_ids
        .iter()
        .enumerate()
        .map(|(index, snapshot_id)| {
            format!(
                "{{\"DeviceName\":\"/dev/xvd{}\",\"Ebs\":{{\"DeleteOnTermination\":true,\"SnapshotId\":\"{snapshot_id}\",\"VolumeSize\":8,\"VolumeType\":\"gp3\"}}}}",
                device_letter(index)
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{{\"Images\":[{{\"ImageId\":\"{image_id}\",\"Name\":\"autoscale-1\",\"State\":\"available\",\"BlockDeviceMappings\":[{mappings}]}}]}}"
    )
}

/// Produces a payload matching `aws ec2 describe-tags --output json`.
#[must_use]
pub fn json_describe_tags(resource_id: &str, tags: &[(&str, &str)]) -> String {
    let items = tags
        .iter()
        .map(|(key, value)| {
            format!(
                "{{\"Key\":\"{key}\",\"ResourceId\":\"{resource_id}\",\"ResourceType\":\"image\",\"Value\":\"{value}\"}}"
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{{\"Tags\":[{items}]}}")
}

fn device_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|offset| b'a'.checked_add(offset))
        .map_or('z', char::from)
}
