//! DNA manifest: integrity + coordinator zome lists.

use super::{Extra, Nullable, OriginTime};
use bytes::Bytes;
use rmpv::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaManifest {
    pub manifest_version: String,
    pub name: String,
    pub integrity: IntegrityManifest,
    pub coordinator: CoordinatorManifest,
    /// Unknown top-level keys, preserved on roundtrip.
    #[serde(flatten, default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityManifest {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub network_seed: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub properties: Nullable<Value>,
    pub origin_time: OriginTime,
    pub zomes: Vec<ZomeManifest>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorManifest {
    pub zomes: Vec<ZomeManifest>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

/// One zome entry. `bundled` points into the resource table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZomeManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub hash: Nullable<Bytes>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub dylib: Nullable<Value>,
    pub bundled: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub dependencies: Nullable<Vec<ZomeDependency>>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

impl ZomeManifest {
    /// Dependency names, empty when none are declared.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .get()
            .into_iter()
            .flatten()
            .map(|dep| dep.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZomeDependency {
    pub name: String,
    #[serde(flatten, default)]
    pub extra: Extra,
}

impl From<&str> for ZomeDependency {
    fn from(name: &str) -> Self {
        name.to_string().into()
    }
}

impl From<String> for ZomeDependency {
    fn from(name: String) -> Self {
        Self {
            name,
            extra: Extra::new(),
        }
    }
}

impl DnaManifest {
    pub fn integrity_zome_names(&self) -> Vec<String> {
        self.integrity
            .zomes
            .iter()
            .map(|zome| zome.name.clone())
            .collect()
    }

    /// First coordinator dependency that names no integrity zome, as
    /// `(zome, dependency)`.
    pub fn find_unknown_dependency(&self) -> Option<(&str, &str)> {
        self.coordinator.zomes.iter().find_map(|zome| {
            zome.dependency_names()
                .find(|dep| !self.integrity.zomes.iter().any(|z| z.name == *dep))
                .map(|dep| (zome.name.as_str(), dep))
        })
    }
}
