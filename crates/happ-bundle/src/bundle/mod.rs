//! Bundle: one manifest plus its resource table.
//!
//! Every construction path (bytes, structured pair, builders) ends in
//! the same place: derive the typed manifest, check the expected kind,
//! run validation, hand back an immutable `Bundle`.
//!
//! Accessors that descend into nested bundles (`dnas`, `happ`) decode
//! fresh child bundles from resource bytes on each call.
//!
//! # Example
//!
//! ```no_run
//! use happ_bundle::{Bundle, BundleKind};
//!
//! let bytes = std::fs::read("app.webhapp").unwrap();
//! let webhapp = Bundle::from_bytes(&bytes, Some(BundleKind::WebHapp)).unwrap();
//!
//! let ui = webhapp.ui().unwrap();
//! let happ = webhapp.happ().unwrap();
//! for dna in happ.dnas().unwrap() {
//!     println!("{} ({} zomes)", dna, dna.zomes().unwrap().len());
//! }
//! println!("ui: {} bytes", ui.len());
//! ```

mod build;
mod validate;

pub use build::{
    DnaInput, HappInput, RoleDnaInput, RoleInput, WebHappInput, ZomeInput, HAPP_RESOURCE_PATH,
    UI_RESOURCE_PATH,
};

use crate::codec::{self, Unpacked};
use crate::error::{BundleError, BundleResult, ResourceOwner};
use crate::limits::DecodeLimits;
use crate::manifest::{BundleKind, DnaManifest, HappManifest, Manifest, WebHappManifest, ZomeManifest};
use crate::resources::ResourceMap;
use bytes::Bytes;
use rmpv::Value;
use std::fmt;
use tracing::{debug, trace};
use validate::require;

/// A validated, immutable bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    manifest: Manifest,
    resources: ResourceMap,
    limits: DecodeLimits,
}

/// A zome entry with its resolved wasm bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Zome {
    pub manifest: ZomeManifest,
    pub bytes: Bytes,
}

impl Zome {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }
}

/// Zomes of a dna bundle, in manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zomes {
    pub integrity: Vec<Zome>,
    pub coordinator: Vec<Zome>,
}

impl Zomes {
    /// Find a zome by name in either list (integrity first).
    pub fn get(&self, name: &str) -> Option<&Zome> {
        self.integrity
            .iter()
            .chain(&self.coordinator)
            .find(|zome| zome.name() == name)
    }

    pub fn len(&self) -> usize {
        self.integrity.len() + self.coordinator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Bundle {
    /// Decode packed bundle bytes, optionally asserting the kind.
    pub fn from_bytes(bytes: &[u8], expected: Option<BundleKind>) -> BundleResult<Self> {
        Self::from_bytes_with_limits(bytes, expected, DecodeLimits::default())
    }

    /// Decode packed bundle bytes with explicit decode limits.
    ///
    /// Child bundles returned by `dnas()` and `happ()` use the same limits.
    pub fn from_bytes_with_limits(
        bytes: &[u8],
        expected: Option<BundleKind>,
        limits: DecodeLimits,
    ) -> BundleResult<Self> {
        let Unpacked {
            manifest,
            resources,
        } = codec::unpack_with_limits(bytes, &limits)?;
        Self::assemble(Manifest::from_value(&manifest)?, resources, expected, limits)
    }

    /// Build from an already-decoded structured manifest and resource table.
    pub fn from_parts(
        manifest: &Value,
        resources: ResourceMap,
        expected: Option<BundleKind>,
    ) -> BundleResult<Self> {
        Self::assemble(
            Manifest::from_value(manifest)?,
            resources,
            expected,
            DecodeLimits::default(),
        )
    }

    pub(crate) fn assemble(
        manifest: Manifest,
        resources: ResourceMap,
        expected: Option<BundleKind>,
        limits: DecodeLimits,
    ) -> BundleResult<Self> {
        let found = manifest.kind();
        if let Some(expected) = expected {
            if expected != found {
                return Err(BundleError::KindMismatch { expected, found });
            }
        }

        validate::validate(&manifest, &resources)?;

        debug!(
            kind = %found,
            name = manifest.name(),
            resources = resources.len(),
            "validated bundle"
        );
        Ok(Self {
            manifest,
            resources,
            limits,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Manifest as a structured value (the form written on pack).
    pub fn manifest_value(&self) -> BundleResult<Value> {
        self.manifest.to_value()
    }

    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.names()
    }

    pub fn kind(&self) -> BundleKind {
        self.manifest.kind()
    }

    pub fn name(&self) -> &str {
        self.manifest.name()
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Integrity and coordinator zomes with their wasm bytes. Dna only.
    pub fn zomes(&self) -> BundleResult<Zomes> {
        let dna = self.dna_manifest("zomes")?;
        Ok(Zomes {
            integrity: self.resolve_zomes(&dna.integrity.zomes, ResourceOwner::Integrity)?,
            coordinator: self.resolve_zomes(&dna.coordinator.zomes, ResourceOwner::Coordinator)?,
        })
    }

    /// One dna bundle per role, in role order. Happ only.
    pub fn dnas(&self) -> BundleResult<Vec<Bundle>> {
        let happ = self.happ_manifest("dnas")?;
        happ.roles
            .iter()
            .map(|role| {
                let bytes = require(
                    &self.resources,
                    ResourceOwner::Dna,
                    Some(&role.name),
                    &role.dna.bundled,
                )?;
                trace!(role = %role.name, path = %role.dna.bundled, "decoding role dna");
                Bundle::from_bytes_with_limits(bytes, Some(BundleKind::Dna), self.limits)
            })
            .collect()
    }

    /// The nested happ bundle. Webhapp only.
    pub fn happ(&self) -> BundleResult<Bundle> {
        let webhapp = self.webhapp_manifest("happ")?;
        let path = &webhapp.happ_manifest.bundled;
        let bytes = require(&self.resources, ResourceOwner::Happ, None, path)?;
        trace!(path = %path, "decoding nested happ");
        Bundle::from_bytes_with_limits(bytes, Some(BundleKind::Happ), self.limits)
    }

    /// Raw UI archive bytes. Webhapp only.
    pub fn ui(&self) -> BundleResult<Bytes> {
        let webhapp = self.webhapp_manifest("ui")?;
        require(&self.resources, ResourceOwner::Ui, None, &webhapp.ui.bundled).cloned()
    }

    /// Serialize back to compressed bundle bytes.
    pub fn pack(&self) -> BundleResult<Vec<u8>> {
        codec::pack(&self.manifest.to_value()?, &self.resources)
    }

    fn resolve_zomes(&self, zomes: &[ZomeManifest], owner: ResourceOwner) -> BundleResult<Vec<Zome>> {
        zomes
            .iter()
            .map(|zome| {
                let bytes = require(&self.resources, owner, Some(&zome.name), &zome.bundled)?;
                Ok(Zome {
                    manifest: zome.clone(),
                    bytes: bytes.clone(),
                })
            })
            .collect()
    }

    fn wrong_kind(&self, operation: &'static str, expected: BundleKind) -> BundleError {
        BundleError::WrongKind {
            operation,
            expected,
            found: self.kind(),
        }
    }

    fn dna_manifest(&self, operation: &'static str) -> BundleResult<&DnaManifest> {
        self.manifest
            .as_dna()
            .ok_or_else(|| self.wrong_kind(operation, BundleKind::Dna))
    }

    fn happ_manifest(&self, operation: &'static str) -> BundleResult<&HappManifest> {
        self.manifest
            .as_happ()
            .ok_or_else(|| self.wrong_kind(operation, BundleKind::Happ))
    }

    fn webhapp_manifest(&self, operation: &'static str) -> BundleResult<&WebHappManifest> {
        self.manifest
            .as_webhapp()
            .ok_or_else(|| self.wrong_kind(operation, BundleKind::WebHapp))
    }
}

/// Structural equality: manifest and resource contents.
impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        self.manifest == other.manifest && self.resources == other.resources
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bundle [{}] {{ {} }}",
            self.name(),
            self.resources.names().join(", ")
        )
    }
}
