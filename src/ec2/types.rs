//! JSON shapes emitted by `aws ec2 ... --output json`.

use serde::{Deserialize, Serialize};

use crate::gateway::{BlockDeviceMapping, EbsVolume, ImageDescription};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct CreateImageOutput {
    pub(super) image_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DescribeImagesOutput {
    #[serde(default)]
    pub(super) images: Vec<AwsImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct AwsImage {
    pub(super) image_id: String,
    #[serde(default)]
    pub(super) block_device_mappings: Vec<AwsBlockDeviceMapping>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct AwsBlockDeviceMapping {
    pub(super) device_name: Option<String>,
    pub(super) ebs: Option<AwsEbs>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct AwsEbs {
    pub(super) snapshot_id: Option<String>,
}

impl From<AwsImage> for ImageDescription {
    fn from(value: AwsImage) -> Self {
        // Instance-store devices have no Ebs block and no snapshot to own.
        let block_device_mappings = value
            .block_device_mappings
            .into_iter()
            .filter_map(|mapping| {
                mapping.ebs.map(|ebs| BlockDeviceMapping {
                    device_name: mapping.device_name,
                    ebs: Some(EbsVolume {
                        snapshot_id: ebs.snapshot_id,
                    }),
                })
            })
            .collect();
        Self {
            id: value.image_id,
            block_device_mappings,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DescribeTagsOutput {
    #[serde(default)]
    pub(super) tags: Vec<AwsTag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct AwsTag {
    pub(super) key: String,
    #[serde(default)]
    pub(super) value: String,
    pub(super) resource_id: Option<String>,
}

/// Element of the JSON list accepted by `create-tags --tags`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct TagSpec<'a> {
    pub(super) key: &'a str,
    pub(super) value: &'a str,
}

/// Element of the JSON list accepted by `describe-tags --filters`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct FilterSpec<'a> {
    pub(super) name: &'a str,
    pub(super) values: [&'a str; 1],
}
