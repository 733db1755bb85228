//! Manifest model: a closed set of manifest kinds derived from shape.
//!
//! A raw manifest value is classified once, by which keys are present:
//!
//! | keys                          | kind      |
//! |-------------------------------|-----------|
//! | `integrity` + `coordinator`   | `dna`     |
//! | `roles`                       | `happ`    |
//! | `ui` + `happ_manifest`        | `webhapp` |
//!
//! Anything else (including a value matching more than one row) is
//! rejected. Only `manifest_version: "1"` is recognized.

pub mod dna;
pub mod happ;
pub mod webhapp;

pub use dna::{CoordinatorManifest, DnaManifest, IntegrityManifest, ZomeDependency, ZomeManifest};
pub use happ::{CellProvisioning, DnaModifiers, HappManifest, RoleDnaManifest, RoleManifest};
pub use webhapp::{ResourceRef, WebHappManifest};

use crate::codec;
use crate::error::{BundleError, BundleResult};
use indexmap::IndexMap;
use rmpv::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The only manifest version this crate reads or writes.
pub const MANIFEST_VERSION: &str = "1";

/// Unrecognized manifest keys carried through a roundtrip.
pub type Extra = IndexMap<String, Value>;

/// Bundle kind, derived from manifest shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
    Dna,
    Happ,
    #[serde(rename = "webhapp")]
    WebHapp,
}

impl BundleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Happ => "happ",
            Self::WebHapp => "webhapp",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dna" => Ok(Self::Dna),
            "happ" => Ok(Self::Happ),
            "webhapp" => Ok(Self::WebHapp),
            other => Err(format!("unknown bundle kind '{}'", other)),
        }
    }
}

/// Origin time: integer microseconds or a textual timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginTime {
    Micros(i64),
    Text(String),
}

impl From<i64> for OriginTime {
    fn from(micros: i64) -> Self {
        Self::Micros(micros)
    }
}

impl From<&str> for OriginTime {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<String> for OriginTime {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Optional manifest field that remembers an explicit `nil`.
///
/// Use with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`
/// so absent keys stay absent and `nil` keys are written back as `nil`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nullable<T> {
    Absent,
    Nil,
    Set(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The value, if one is set.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Absent | Self::Nil => None,
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Set)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Absent | Self::Nil => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Nil, Self::Set))
    }
}

/// A typed manifest of exactly one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    Dna(DnaManifest),
    Happ(HappManifest),
    WebHapp(WebHappManifest),
}

impl Manifest {
    /// Interpret a raw structured manifest: version, then kind, then fields.
    pub fn from_value(value: &Value) -> BundleResult<Self> {
        derive_version(value)?;
        let kind = derive_kind(value)?;

        let invalid = |e: BundleError| match e {
            BundleError::CorruptPayload { reason } => {
                BundleError::corrupt(format!("invalid {} manifest: {}", kind, reason))
            }
            other => other,
        };
        let manifest = match kind {
            BundleKind::Dna => Self::Dna(codec::from_value(value).map_err(invalid)?),
            BundleKind::Happ => Self::Happ(codec::from_value(value).map_err(invalid)?),
            BundleKind::WebHapp => Self::WebHapp(codec::from_value(value).map_err(invalid)?),
        };
        Ok(manifest)
    }

    /// Canonical structured form, including preserved unknown keys.
    pub fn to_value(&self) -> BundleResult<Value> {
        codec::to_value(self)
    }

    pub fn kind(&self) -> BundleKind {
        match self {
            Self::Dna(_) => BundleKind::Dna,
            Self::Happ(_) => BundleKind::Happ,
            Self::WebHapp(_) => BundleKind::WebHapp,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Dna(m) => &m.name,
            Self::Happ(m) => &m.name,
            Self::WebHapp(m) => &m.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Self::Dna(m) => &m.manifest_version,
            Self::Happ(m) => &m.manifest_version,
            Self::WebHapp(m) => &m.manifest_version,
        }
    }

    pub fn as_dna(&self) -> Option<&DnaManifest> {
        match self {
            Self::Dna(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_happ(&self) -> Option<&HappManifest> {
        match self {
            Self::Happ(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_webhapp(&self) -> Option<&WebHappManifest> {
        match self {
            Self::WebHapp(m) => Some(m),
            _ => None,
        }
    }
}

/// Classify a raw manifest value by its top-level keys.
pub fn derive_kind(value: &Value) -> BundleResult<BundleKind> {
    let keys = top_level_keys(value);
    let has = |key: &str| keys.iter().any(|k| k == key);

    let mut matched = Vec::with_capacity(1);
    if has("integrity") && has("coordinator") {
        matched.push(BundleKind::Dna);
    }
    if has("roles") {
        matched.push(BundleKind::Happ);
    }
    if has("ui") && has("happ_manifest") {
        matched.push(BundleKind::WebHapp);
    }

    match matched.as_slice() {
        [kind] => Ok(*kind),
        _ => Err(BundleError::UnknownManifestKind { keys }),
    }
}

/// Require an explicit `manifest_version: "1"`.
pub fn derive_version(value: &Value) -> BundleResult<&'static str> {
    let found = map_get(value, "manifest_version");
    match found {
        Some(v) if v.as_str() == Some(MANIFEST_VERSION) => Ok(MANIFEST_VERSION),
        Some(v) => Err(BundleError::UnsupportedManifestVersion {
            found: Some(v.as_str().map(String::from).unwrap_or_else(|| v.to_string())),
        }),
        None => Err(BundleError::UnsupportedManifestVersion { found: None }),
    }
}

fn top_level_keys(value: &Value) -> Vec<String> {
    value
        .as_map()
        .map(|entries| {
            entries
                .iter()
                .map(|(k, _)| k.as_str().map(String::from).unwrap_or_else(|| k.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn map_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_map()?
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}
