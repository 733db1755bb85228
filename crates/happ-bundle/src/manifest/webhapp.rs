//! Web hApp manifest: a UI archive plus one bundled hApp.

use super::Extra;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHappManifest {
    pub manifest_version: String,
    pub name: String,
    pub ui: ResourceRef,
    pub happ_manifest: ResourceRef,
    #[serde(flatten, default)]
    pub extra: Extra,
}

/// Manifest-side pointer into the resource table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub bundled: String,
    #[serde(flatten, default)]
    pub extra: Extra,
}

impl ResourceRef {
    pub fn new(bundled: impl Into<String>) -> Self {
        Self {
            bundled: bundled.into(),
            extra: Extra::new(),
        }
    }
}
