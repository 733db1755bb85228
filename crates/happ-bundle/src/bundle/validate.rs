//! Structural validation run once at the end of every construction path.
//!
//! Confirms that each `bundled` path the manifest requires is present in
//! the resource table. Nested bundle bytes are not decoded here; that
//! happens lazily in the recursive accessors.

use crate::error::{BundleError, BundleResult, ResourceOwner};
use crate::manifest::{DnaManifest, HappManifest, Manifest, WebHappManifest};
use crate::resources::ResourceMap;

pub(crate) fn validate(manifest: &Manifest, resources: &ResourceMap) -> BundleResult<()> {
    match manifest {
        Manifest::Dna(dna) => validate_dna(dna, resources),
        Manifest::Happ(happ) => validate_happ(happ, resources),
        Manifest::WebHapp(webhapp) => validate_webhapp(webhapp, resources),
    }
}

fn validate_dna(dna: &DnaManifest, resources: &ResourceMap) -> BundleResult<()> {
    for zome in &dna.integrity.zomes {
        require(resources, ResourceOwner::Integrity, Some(&zome.name), &zome.bundled)?;
    }
    for zome in &dna.coordinator.zomes {
        require(resources, ResourceOwner::Coordinator, Some(&zome.name), &zome.bundled)?;
    }

    if let Some((zome, dependency)) = dna.find_unknown_dependency() {
        return Err(BundleError::UnknownDependency {
            zome: zome.to_string(),
            dependency: dependency.to_string(),
            available: dna.integrity_zome_names(),
        });
    }
    Ok(())
}

fn validate_happ(happ: &HappManifest, resources: &ResourceMap) -> BundleResult<()> {
    for role in &happ.roles {
        require(resources, ResourceOwner::Dna, Some(&role.name), &role.dna.bundled)?;
    }
    Ok(())
}

fn validate_webhapp(webhapp: &WebHappManifest, resources: &ResourceMap) -> BundleResult<()> {
    require(resources, ResourceOwner::Happ, None, &webhapp.happ_manifest.bundled)?;
    require(resources, ResourceOwner::Ui, None, &webhapp.ui.bundled)?;
    Ok(())
}

/// Resolve a `bundled` path, or report who wanted it.
pub(crate) fn require<'a>(
    resources: &'a ResourceMap,
    owner: ResourceOwner,
    name: Option<&str>,
    path: &str,
) -> BundleResult<&'a bytes::Bytes> {
    resources
        .get(path)
        .ok_or_else(|| BundleError::MissingResource {
            owner,
            name: name.map(String::from),
            path: path.to_string(),
        })
}
