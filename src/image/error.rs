//! Error types for the image lifecycle.

use std::fmt;

use thiserror::Error;

/// Remote primitive that failed, used to label [`ImageError`] values.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RemoteOperation {
    /// Capturing an instance into an image.
    CreateImage,
    /// Reading an image record.
    DescribeImage,
    /// Deleting an image.
    DeleteImage,
    /// Deleting a snapshot.
    DeleteSnapshot,
    /// Writing a tag.
    WriteTag,
    /// Listing tags.
    ReadTags,
}

impl RemoteOperation {
    /// Stable kebab-case name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateImage => "create-image",
            Self::DescribeImage => "describe-image",
            Self::DeleteImage => "delete-image",
            Self::DeleteSnapshot => "delete-snapshot",
            Self::WriteTag => "write-tag",
            Self::ReadTags => "read-tags",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot that could not be deleted during a cascade.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotFailure {
    /// Snapshot left behind.
    pub snapshot_id: String,
    /// Failure reported for the delete.
    pub message: String,
}

/// What happened to the image itself during a cascade that lost snapshots.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageRemoval {
    /// The image delete succeeded.
    Deleted,
    /// The image delete was issued and failed.
    Failed {
        /// Failure reported for the delete.
        message: String,
    },
    /// The cascade stopped before the image delete was issued.
    NotAttempted,
}

impl fmt::Display for ImageRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::Failed { message } => write!(f, "delete failed: {message}"),
            Self::NotAttempted => f.write_str("not attempted"),
        }
    }
}

/// Errors raised by [`crate::Image`] and [`crate::Snapshot`] operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ImageError {
    /// Raised locally for malformed arguments; no remote call was made.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Argument that was rejected.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Raised when a remote call fails or answers with an unexpected shape.
    #[error("{operation} failed for {resource_id}: {message}")]
    RemoteOperationFailed {
        /// Primitive that failed.
        operation: RemoteOperation,
        /// Resource the call targeted.
        resource_id: String,
        /// Provider message.
        message: String,
    },
    /// Raised when snapshot deletes failed during a cascade delete.
    #[error(
        "cascade delete of image {image_id} left {count} snapshot(s) behind ({ids}); image {image}",
        count = .failed_snapshots.len(),
        ids = joined_ids(.failed_snapshots)
    )]
    PartialCascadeFailure {
        /// Image being deleted.
        image_id: String,
        /// Every snapshot delete that failed, in cascade order.
        failed_snapshots: Vec<SnapshotFailure>,
        /// Outcome of the image delete.
        image: ImageRemoval,
    },
}

impl ImageError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn remote(
        operation: RemoteOperation,
        resource_id: &str,
        err: &impl fmt::Display,
    ) -> Self {
        Self::RemoteOperationFailed {
            operation,
            resource_id: resource_id.to_owned(),
            message: err.to_string(),
        }
    }

    /// Snapshot ids a failed cascade left behind; empty for other errors.
    #[must_use]
    pub fn orphaned_snapshot_ids(&self) -> Vec<&str> {
        match self {
            Self::PartialCascadeFailure {
                failed_snapshots, ..
            } => failed_snapshots
                .iter()
                .map(|failure| failure.snapshot_id.as_str())
                .collect(),
            Self::InvalidInput { .. } | Self::RemoteOperationFailed { .. } => Vec::new(),
        }
    }
}

fn joined_ids(failures: &[SnapshotFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.snapshot_id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
