use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attributes::AttributeMap;

/// Requester details attached under `metadata.device_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
}

/// Auxiliary block stored under `properties.metadata`.
///
/// Every section is optional; a block with no sections is never attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<BTreeMap<String, AttributeMap>>,
}

impl MetadataBlock {
    pub fn is_empty(&self) -> bool {
        self.device_info.is_none() && self.context.is_none() && self.related.is_none()
    }
}
