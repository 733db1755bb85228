//! Codec and validation engine for nested application bundles.
//!
//! A bundle is `gzip(msgpack({manifest, resources}))`. The manifest is one
//! of three kinds, derived from its shape:
//!
//! - `dna`: integrity + coordinator zomes, each pointing at a wasm resource
//! - `happ`: roles, each pointing at a packed `dna` bundle
//! - `webhapp`: a UI archive plus a packed `happ` bundle
//!
//! Construction always validates that every `bundled` path the manifest
//! needs is present. Nested bundles are decoded lazily by the accessors
//! ([`Bundle::dnas`], [`Bundle::happ`]).
//!
//! # Example
//!
//! ```
//! use happ_bundle::{Bundle, BundleKind, DnaInput, HappInput, RoleInput, ZomeInput};
//!
//! let dna = Bundle::create_dna(
//!     DnaInput::new("my-dna", "2023-01-01T00:00:00Z")
//!         .with_integrity(ZomeInput::new("z1", vec![0u8; 16]))
//!         .with_coordinator(ZomeInput::new("z2", vec![1u8; 16]).with_dependency("z1")),
//! )
//! .unwrap();
//!
//! let happ = Bundle::create_happ(
//!     HappInput::new("my-happ").with_role(RoleInput::new("main", dna.pack().unwrap())),
//! )
//! .unwrap();
//!
//! let decoded = Bundle::from_bytes(&happ.pack().unwrap(), Some(BundleKind::Happ)).unwrap();
//! assert_eq!(decoded.dnas().unwrap()[0], dna);
//! ```

pub mod bundle;
pub mod codec;
pub mod error;
pub mod limits;
pub mod manifest;
pub mod resources;

// Convenience re-exports
pub use bundle::{
    Bundle, DnaInput, HappInput, RoleDnaInput, RoleInput, WebHappInput, Zome, ZomeInput, Zomes,
    HAPP_RESOURCE_PATH, UI_RESOURCE_PATH,
};
pub use codec::{pack, unpack, unpack_with_limits, Unpacked};
pub use error::{BundleError, BundleResult, ResourceOwner};
pub use limits::{DecodeLimits, DecodeLimitsOverrides};
pub use manifest::{
    derive_kind, derive_version, BundleKind, CellProvisioning, DnaManifest, DnaModifiers,
    HappManifest, Manifest, Nullable, OriginTime, ResourceRef, WebHappManifest, ZomeDependency,
    ZomeManifest, MANIFEST_VERSION,
};
pub use resources::ResourceMap;

// Re-export for callers building structured manifests and payloads
pub use bytes::Bytes;
pub use rmpv::Value;
