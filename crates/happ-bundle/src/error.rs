//! Error types for bundle decoding, construction and access.

use std::fmt;

use crate::manifest::BundleKind;

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Manifest section that owns a `bundled` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOwner {
    /// Integrity zome of a dna manifest.
    Integrity,
    /// Coordinator zome of a dna manifest.
    Coordinator,
    /// Role dna of a happ manifest.
    Dna,
    /// Happ bundle of a webhapp manifest.
    Happ,
    /// UI archive of a webhapp manifest.
    Ui,
}

impl ResourceOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integrity => "integrity",
            Self::Coordinator => "coordinator",
            Self::Dna => "dna",
            Self::Happ => "happ",
            Self::Ui => "ui",
        }
    }
}

impl fmt::Display for ResourceOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while decoding, building or inspecting a bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// Decompression or MessagePack decoding failed.
    #[error("corrupt bundle payload: {reason}")]
    CorruptPayload { reason: String },

    /// `manifest_version` is absent or not "1".
    #[error("unsupported manifest version: {}", found.as_deref().unwrap_or("<missing>"))]
    UnsupportedManifestVersion { found: Option<String> },

    /// Manifest shape matches none (or more than one) of the known kinds.
    #[error("unknown manifest kind with keys: [{}]", keys.join(", "))]
    UnknownManifestKind { keys: Vec<String> },

    /// Caller asked for one kind, the bytes contain another.
    #[error("bundle contents do not match expected kind '{expected}'; found '{found}'")]
    KindMismatch {
        expected: BundleKind,
        found: BundleKind,
    },

    /// A coordinator zome depends on an integrity zome that does not exist.
    #[error(
        "zome '{zome}' depends on unknown integrity zome '{dependency}'; available: [{}]",
        available.join(", ")
    )]
    UnknownDependency {
        zome: String,
        dependency: String,
        available: Vec<String>,
    },

    /// A `bundled` path has no entry in the resource table.
    #[error("missing {owner} resource{} at path '{path}'", name.as_ref().map(|n| format!(" for '{}'", n)).unwrap_or_default())]
    MissingResource {
        owner: ResourceOwner,
        name: Option<String>,
        path: String,
    },

    /// Accessor invoked on a bundle of the wrong kind.
    #[error("wrong bundle kind '{found}'; only '{expected}' bundles support {operation}()")]
    WrongKind {
        operation: &'static str,
        expected: BundleKind,
        found: BundleKind,
    },

    /// Two builder entries would share the same resource path.
    #[error("duplicate {section} name '{name}'")]
    DuplicateName { section: &'static str, name: String },

    /// A decode limit was exceeded.
    #[error("{limit}: exceeded limit of {max}")]
    LimitExceeded { limit: &'static str, max: u64 },
}

impl BundleError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptPayload {
            reason: reason.into(),
        }
    }

    /// Returns true if the input bytes were unusable.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptPayload { .. })
    }

    /// Returns true if a manifest reference could not be resolved.
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, Self::MissingResource { .. })
    }

    /// Returns true if an accessor was used against the wrong kind.
    /// The bundle itself is still usable.
    pub fn is_wrong_kind(&self) -> bool {
        matches!(self, Self::WrongKind { .. })
    }
}

impl From<rmp_serde::decode::Error> for BundleError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::corrupt(format!("msgpack decode: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_resource_message_names_owner_and_path() {
        let err = BundleError::MissingResource {
            owner: ResourceOwner::Coordinator,
            name: Some("z2".into()),
            path: "z2.wasm".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing coordinator resource for 'z2' at path 'z2.wasm'"
        );

        let err = BundleError::MissingResource {
            owner: ResourceOwner::Ui,
            name: None,
            path: "ui.zip".into(),
        };
        assert_eq!(err.to_string(), "missing ui resource at path 'ui.zip'");
    }

    #[test]
    fn test_unknown_kind_lists_keys() {
        let err = BundleError::UnknownManifestKind {
            keys: vec!["name".into(), "zomes".into()],
        };
        assert!(err.to_string().contains("[name, zomes]"));
    }

    #[test]
    fn test_version_message_for_absent_field() {
        let err = BundleError::UnsupportedManifestVersion { found: None };
        assert!(err.to_string().contains("<missing>"));
    }
}
