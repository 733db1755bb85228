//! Compile-test for the crate root: ensures public API symbols are re-exported.
//!
//! Prevents regressions when refactoring module structure.

#[test]
fn public_api_smoke_crate_root() {
    use happ_bundle::{
        derive_kind, derive_version, pack, unpack, unpack_with_limits, Bundle, BundleError,
        BundleKind, BundleResult, Bytes, CellProvisioning, DecodeLimits, DecodeLimitsOverrides,
        DnaInput, DnaManifest, DnaModifiers, HappInput, HappManifest, Manifest, Nullable,
        OriginTime, ResourceMap, ResourceOwner, ResourceRef, RoleDnaInput, RoleInput, Unpacked,
        Value, WebHappInput, WebHappManifest, Zome, ZomeDependency, ZomeInput, ZomeManifest,
        Zomes, HAPP_RESOURCE_PATH, MANIFEST_VERSION, UI_RESOURCE_PATH,
    };

    let _ = DecodeLimits::default().apply(DecodeLimitsOverrides::default());
    assert_eq!(MANIFEST_VERSION, "1");
    assert_eq!(UI_RESOURCE_PATH, "ui.zip");
    assert_eq!(HAPP_RESOURCE_PATH, "bundled.happ");

    // Type-check: functions exist and have expected signatures
    let _ = pack as fn(&Value, &ResourceMap) -> BundleResult<Vec<u8>>;
    let _ = unpack as fn(&[u8]) -> BundleResult<Unpacked>;
    let _ = unpack_with_limits as fn(&[u8], &DecodeLimits) -> BundleResult<Unpacked>;
    let _ = Bundle::from_bytes as fn(&[u8], Option<BundleKind>) -> BundleResult<Bundle>;
    let _ = Bundle::create_dna as fn(DnaInput) -> BundleResult<Bundle>;
    let _ = Bundle::create_happ as fn(HappInput) -> BundleResult<Bundle>;
    let _ = Bundle::create_webhapp as fn(WebHappInput) -> BundleResult<Bundle>;
    let _ = derive_kind as fn(&Value) -> BundleResult<BundleKind>;
    let _ = derive_version as fn(&Value) -> BundleResult<&'static str>;

    // Symbols exist; no runtime needed
    let _ = std::mem::size_of::<Manifest>();
    let _ = std::mem::size_of::<DnaManifest>();
    let _ = std::mem::size_of::<HappManifest>();
    let _ = std::mem::size_of::<WebHappManifest>();
    let _ = std::mem::size_of::<ZomeManifest>();
    let _ = std::mem::size_of::<ZomeDependency>();
    let _ = std::mem::size_of::<ResourceRef>();
    let _ = std::mem::size_of::<CellProvisioning>();
    let _ = std::mem::size_of::<DnaModifiers>();
    let _ = std::mem::size_of::<OriginTime>();
    let _ = std::mem::size_of::<Nullable<String>>();
    let _ = std::mem::size_of::<RoleDnaInput>();
    let _ = std::mem::size_of::<RoleInput>();
    let _ = std::mem::size_of::<ZomeInput>();
    let _ = std::mem::size_of::<Zome>();
    let _ = std::mem::size_of::<Zomes>();
    let _ = std::mem::size_of::<Bytes>();
    let _ = std::mem::size_of::<ResourceOwner>();
    let _ = std::mem::size_of::<BundleError>();
}
