//! End-to-end scenarios: dna -> happ -> webhapp, each packed and decoded.
//!
//! Mirrors the containment chain webhapp ⊃ happ ⊃ dna ⊃ wasm.

use happ_bundle::{
    Bundle, BundleKind, DnaInput, HappInput, RoleInput, WebHappInput, ZomeInput,
};

fn wasm(fill: u8) -> Vec<u8> {
    vec![fill; 1_000]
}

/// Scenario A: one integrity zome, one coordinator zome depending on it.
fn dna_bundle() -> Bundle {
    Bundle::create_dna(
        DnaInput::new("fake-dna-1", "2023-01-01T00:00:00Z")
            .with_integrity(ZomeInput::new("z1", wasm(1)))
            .with_coordinator(ZomeInput::new("z2", wasm(2)).with_dependency("z1")),
    )
    .unwrap()
}

/// Scenario B: one role wrapping scenario A.
fn happ_bundle() -> Bundle {
    let dna_bytes = dna_bundle().pack().unwrap();
    Bundle::create_happ(
        HappInput::new("fake-happ-1")
            .with_description("Empty testing files")
            .with_role(RoleInput::new("role-1", dna_bytes)),
    )
    .unwrap()
}

/// Scenario C: scenario B plus a synthetic UI.
fn webhapp_bundle() -> Bundle {
    let happ_bytes = happ_bundle().pack().unwrap();
    Bundle::create_webhapp(WebHappInput::new("fake-webhapp-1", wasm(3), happ_bytes)).unwrap()
}

#[test]
fn test_scenario_a_dna_roundtrip() -> anyhow::Result<()> {
    let original = dna_bundle();
    let decoded = Bundle::from_bytes(&original.pack()?, Some(BundleKind::Dna))?;

    assert_eq!(decoded.kind(), BundleKind::Dna);
    assert_eq!(decoded.name(), "fake-dna-1");
    assert_eq!(decoded, original);

    let zomes = decoded.zomes()?;
    assert_eq!(zomes.integrity.len(), 1);
    assert_eq!(zomes.integrity[0].name(), "z1");
    assert_eq!(zomes.integrity[0].bytes.len(), 1_000);
    assert_eq!(zomes.integrity[0].bytes.as_ref(), wasm(1).as_slice());

    assert_eq!(zomes.coordinator.len(), 1);
    assert_eq!(zomes.coordinator[0].name(), "z2");
    assert_eq!(
        zomes.coordinator[0].manifest.dependency_names().collect::<Vec<_>>(),
        vec!["z1"]
    );
    assert_eq!(zomes.coordinator[0].bytes.as_ref(), wasm(2).as_slice());
    Ok(())
}

#[test]
fn test_scenario_b_happ_roundtrip() -> anyhow::Result<()> {
    let original = happ_bundle();
    let decoded = Bundle::from_bytes(&original.pack()?, Some(BundleKind::Happ))?;

    assert_eq!(decoded, original);
    assert_eq!(decoded.resource_names(), vec!["role-1.dna"]);

    let dnas = decoded.dnas()?;
    assert_eq!(dnas.len(), 1);
    assert_eq!(dnas[0].kind(), BundleKind::Dna);
    assert_eq!(dnas[0], dna_bundle());
    assert_eq!(dnas[0].zomes()?, dna_bundle().zomes()?);
    Ok(())
}

#[test]
fn test_scenario_c_webhapp_roundtrip() -> anyhow::Result<()> {
    let original = webhapp_bundle();
    let decoded = Bundle::from_bytes(&original.pack()?, Some(BundleKind::WebHapp))?;

    assert_eq!(decoded, original);

    let ui = decoded.ui()?;
    assert_eq!(ui.len(), 1_000);
    assert_eq!(ui.as_ref(), wasm(3).as_slice());

    let happ = decoded.happ()?;
    assert_eq!(happ.kind(), BundleKind::Happ);
    assert_eq!(happ, happ_bundle());

    // All the way down.
    let dna = &happ.dnas()?[0];
    assert_eq!(dna.zomes()?.get("z1").unwrap().bytes.as_ref(), wasm(1).as_slice());
    Ok(())
}

#[test]
fn test_child_bundles_are_fresh_per_call() -> anyhow::Result<()> {
    let happ = happ_bundle();
    let first = happ.dnas()?;
    let second = happ.dnas()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_display_names_resources() {
    assert_eq!(
        webhapp_bundle().to_string(),
        "Bundle [fake-webhapp-1] { ui.zip, bundled.happ }"
    );
}

#[test]
fn test_happ_with_non_dna_role_fails_on_access() {
    // Validation only checks presence; the nested kind is checked lazily.
    let webhapp_bytes = webhapp_bundle().pack().unwrap();
    let happ = Bundle::create_happ(
        HappInput::new("odd").with_role(RoleInput::new("r", webhapp_bytes)),
    )
    .unwrap();

    let err = happ.dnas().unwrap_err();
    assert!(
        matches!(
            err,
            happ_bundle::BundleError::KindMismatch {
                expected: BundleKind::Dna,
                found: BundleKind::WebHapp
            }
        ),
        "unexpected error: {err}"
    );
}
