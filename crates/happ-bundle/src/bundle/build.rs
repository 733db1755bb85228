//! Constructive builders: in-memory descriptions -> validated bundles.
//!
//! Each builder moves caller-supplied payloads into a fresh resource table
//! under a canonical path and leaves a `bundled` pointer in the manifest:
//!
//! - dna: `<zome-name>.wasm`
//! - happ: `<role-name>.dna`
//! - webhapp: `ui.zip` and `bundled.happ`
//!
//! Builders always stamp `manifest_version: "1"`.

use super::Bundle;
use crate::error::{BundleError, BundleResult};
use crate::limits::DecodeLimits;
use crate::manifest::{
    BundleKind, CellProvisioning, CoordinatorManifest, DnaManifest, DnaModifiers, Extra,
    HappManifest, IntegrityManifest, Manifest, Nullable, OriginTime, ResourceRef,
    RoleDnaManifest, RoleManifest, WebHappManifest, ZomeDependency, ZomeManifest,
    MANIFEST_VERSION,
};
use crate::resources::ResourceMap;
use bytes::Bytes;
use rmpv::Value;

/// Resource path of the UI archive inside a webhapp.
pub const UI_RESOURCE_PATH: &str = "ui.zip";
/// Resource path of the happ bundle inside a webhapp.
pub const HAPP_RESOURCE_PATH: &str = "bundled.happ";

const DNA_FIELDS: &[&str] = &["manifest_version", "name", "integrity", "coordinator"];
const HAPP_FIELDS: &[&str] = &["manifest_version", "name", "description", "roles"];
const WEBHAPP_FIELDS: &[&str] = &["manifest_version", "name", "ui", "happ_manifest"];

/// A zome to place in a dna bundle.
#[derive(Debug, Clone)]
pub struct ZomeInput {
    pub name: String,
    pub bytes: Bytes,
    pub hash: Option<Bytes>,
    pub dylib: Option<Value>,
    pub dependencies: Vec<ZomeDependency>,
}

impl ZomeInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            hash: None,
            dylib: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_hash(mut self, hash: impl Into<Bytes>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_dylib(mut self, dylib: Value) -> Self {
        self.dylib = Some(dylib);
        self
    }

    /// Accepts a bare name or a `ZomeDependency`.
    pub fn with_dependency(mut self, dependency: impl Into<ZomeDependency>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

/// Description of a dna bundle.
#[derive(Debug, Clone)]
pub struct DnaInput {
    pub name: String,
    pub network_seed: Option<String>,
    pub properties: Option<Value>,
    pub origin_time: OriginTime,
    pub integrity: Vec<ZomeInput>,
    pub coordinator: Vec<ZomeInput>,
    pub extra: Extra,
}

impl DnaInput {
    pub fn new(name: impl Into<String>, origin_time: impl Into<OriginTime>) -> Self {
        Self {
            name: name.into(),
            network_seed: None,
            properties: None,
            origin_time: origin_time.into(),
            integrity: Vec::new(),
            coordinator: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn with_network_seed(mut self, seed: impl Into<String>) -> Self {
        self.network_seed = Some(seed.into());
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_integrity(mut self, zome: ZomeInput) -> Self {
        self.integrity.push(zome);
        self
    }

    pub fn with_coordinator(mut self, zome: ZomeInput) -> Self {
        self.coordinator.push(zome);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// The dna half of a role: packed dna bytes plus instantiation settings.
#[derive(Debug, Clone)]
pub struct RoleDnaInput {
    pub bytes: Bytes,
    pub modifiers: Option<DnaModifiers>,
    pub installed_hash: Option<String>,
    pub clone_limit: Option<u32>,
}

impl From<Vec<u8>> for RoleDnaInput {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<Bytes> for RoleDnaInput {
    fn from(bytes: Bytes) -> Self {
        Self {
            bytes,
            modifiers: None,
            installed_hash: None,
            clone_limit: None,
        }
    }
}

/// A role to place in a happ bundle.
#[derive(Debug, Clone)]
pub struct RoleInput {
    pub name: String,
    pub provisioning: Option<CellProvisioning>,
    pub dna: RoleDnaInput,
}

impl RoleInput {
    pub fn new(name: impl Into<String>, dna: impl Into<RoleDnaInput>) -> Self {
        Self {
            name: name.into(),
            provisioning: None,
            dna: dna.into(),
        }
    }

    pub fn with_provisioning(mut self, provisioning: CellProvisioning) -> Self {
        self.provisioning = Some(provisioning);
        self
    }

    pub fn with_modifiers(mut self, modifiers: DnaModifiers) -> Self {
        self.dna.modifiers = Some(modifiers);
        self
    }

    pub fn with_installed_hash(mut self, hash: impl Into<String>) -> Self {
        self.dna.installed_hash = Some(hash.into());
        self
    }

    pub fn with_clone_limit(mut self, clone_limit: u32) -> Self {
        self.dna.clone_limit = Some(clone_limit);
        self
    }
}

/// Description of a happ bundle.
#[derive(Debug, Clone)]
pub struct HappInput {
    pub name: String,
    pub description: Option<String>,
    pub roles: Vec<RoleInput>,
    pub extra: Extra,
}

impl HappInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            roles: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_role(mut self, role: RoleInput) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Description of a webhapp bundle.
#[derive(Debug, Clone)]
pub struct WebHappInput {
    pub name: String,
    pub ui: Bytes,
    pub happ_manifest: Bytes,
    pub extra: Extra,
}

impl WebHappInput {
    pub fn new(
        name: impl Into<String>,
        ui: impl Into<Bytes>,
        happ_manifest: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            ui: ui.into(),
            happ_manifest: happ_manifest.into(),
            extra: Extra::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Bundle {
    /// Assemble a dna bundle from zome payloads.
    ///
    /// Coordinator dependencies are checked against the integrity zome
    /// names before anything is assembled.
    pub fn create_dna(input: DnaInput) -> BundleResult<Self> {
        let DnaInput {
            name,
            network_seed,
            properties,
            origin_time,
            integrity,
            coordinator,
            extra,
        } = input;
        check_extra(&extra, DNA_FIELDS)?;

        let available: Vec<String> = integrity.iter().map(|z| z.name.clone()).collect();
        for zome in &coordinator {
            if let Some(dep) = zome
                .dependencies
                .iter()
                .find(|dep| !available.contains(&dep.name))
            {
                return Err(BundleError::UnknownDependency {
                    zome: zome.name.clone(),
                    dependency: dep.name.clone(),
                    available,
                });
            }
        }

        let mut resources = ResourceMap::new();
        let integrity_zomes = integrity
            .into_iter()
            .map(|zome| place_zome(zome, "integrity zome", &mut resources))
            .collect::<BundleResult<Vec<_>>>()?;
        let coordinator_zomes = coordinator
            .into_iter()
            .map(|zome| place_zome(zome, "coordinator zome", &mut resources))
            .collect::<BundleResult<Vec<_>>>()?;

        let manifest = Manifest::Dna(DnaManifest {
            manifest_version: MANIFEST_VERSION.into(),
            name,
            integrity: IntegrityManifest {
                network_seed: network_seed.into(),
                properties: properties.into(),
                origin_time,
                zomes: integrity_zomes,
                extra: Extra::new(),
            },
            coordinator: CoordinatorManifest {
                zomes: coordinator_zomes,
                extra: Extra::new(),
            },
            extra,
        });
        check_table(&resources)?;
        Self::assemble(
            manifest,
            resources,
            Some(BundleKind::Dna),
            DecodeLimits::default(),
        )
    }

    /// Assemble a happ bundle from packed dna payloads.
    ///
    /// Absent role settings default to `create` provisioning, empty
    /// modifiers and a clone limit of 0.
    pub fn create_happ(input: HappInput) -> BundleResult<Self> {
        let HappInput {
            name,
            description,
            roles,
            extra,
        } = input;
        check_extra(&extra, HAPP_FIELDS)?;

        let mut resources = ResourceMap::new();
        let mut role_manifests = Vec::with_capacity(roles.len());
        for role in roles {
            let path = format!("{}.{}", role.name, BundleKind::Dna.extension());
            if resources.insert(path.clone(), role.dna.bytes).is_some() {
                return Err(BundleError::DuplicateName {
                    section: "role",
                    name: role.name,
                });
            }
            role_manifests.push(RoleManifest {
                name: role.name,
                provisioning: Nullable::Set(role.provisioning.unwrap_or_default()),
                dna: RoleDnaManifest {
                    bundled: path,
                    modifiers: Nullable::Set(role.dna.modifiers.unwrap_or_default()),
                    installed_hash: role.dna.installed_hash.into(),
                    clone_limit: Nullable::Set(role.dna.clone_limit.unwrap_or(0)),
                    extra: Extra::new(),
                },
                extra: Extra::new(),
            });
        }

        let manifest = Manifest::Happ(HappManifest {
            manifest_version: MANIFEST_VERSION.into(),
            name,
            description: description.into(),
            roles: role_manifests,
            extra,
        });
        check_table(&resources)?;
        Self::assemble(
            manifest,
            resources,
            Some(BundleKind::Happ),
            DecodeLimits::default(),
        )
    }

    /// Assemble a webhapp bundle from a UI archive and a packed happ.
    pub fn create_webhapp(input: WebHappInput) -> BundleResult<Self> {
        let WebHappInput {
            name,
            ui,
            happ_manifest,
            extra,
        } = input;
        check_extra(&extra, WEBHAPP_FIELDS)?;

        let mut resources = ResourceMap::new();
        resources.insert(UI_RESOURCE_PATH.to_string(), ui);
        resources.insert(HAPP_RESOURCE_PATH.to_string(), happ_manifest);

        let manifest = Manifest::WebHapp(WebHappManifest {
            manifest_version: MANIFEST_VERSION.into(),
            name,
            ui: ResourceRef::new(UI_RESOURCE_PATH),
            happ_manifest: ResourceRef::new(HAPP_RESOURCE_PATH),
            extra,
        });
        check_table(&resources)?;
        Self::assemble(
            manifest,
            resources,
            Some(BundleKind::WebHapp),
            DecodeLimits::default(),
        )
    }
}

fn place_zome(
    zome: ZomeInput,
    section: &'static str,
    resources: &mut ResourceMap,
) -> BundleResult<ZomeManifest> {
    let path = format!("{}.wasm", zome.name);
    if resources.insert(path.clone(), zome.bytes).is_some() {
        return Err(BundleError::DuplicateName {
            section,
            name: zome.name,
        });
    }
    Ok(ZomeManifest {
        name: zome.name,
        hash: zome.hash.into(),
        dylib: zome.dylib.into(),
        bundled: path,
        dependencies: (!zome.dependencies.is_empty())
            .then_some(zome.dependencies)
            .into(),
        extra: Extra::new(),
    })
}

/// Builder output must pass the decoder's table checks at default limits.
fn check_table(resources: &ResourceMap) -> BundleResult<()> {
    let limits = DecodeLimits::default();
    limits.check_resource_count(resources.len())?;
    for path in resources.names() {
        limits.check_path(path)?;
    }
    limits.check_decoded_len(resources.total_bytes() as u64)
}

/// Extra keys are flattened next to the known fields and must not shadow them.
fn check_extra(extra: &Extra, reserved: &[&str]) -> BundleResult<()> {
    match extra.keys().find(|key| reserved.contains(&key.as_str())) {
        Some(key) => Err(BundleError::DuplicateName {
            section: "manifest field",
            name: key.clone(),
        }),
        None => Ok(()),
    }
}
