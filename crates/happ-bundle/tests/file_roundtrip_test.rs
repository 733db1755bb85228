//! Packed bundles written to disk and read back, the way a packager would.

use happ_bundle::{Bundle, BundleKind, DnaInput, HappInput, RoleInput, WebHappInput, ZomeInput};
use tempfile::tempdir;

fn webhapp() -> Bundle {
    let dna = Bundle::create_dna(
        DnaInput::new("file-dna", 0_i64)
            .with_integrity(ZomeInput::new("z1", vec![7u8; 256]))
            .with_coordinator(ZomeInput::new("z2", vec![8u8; 256]).with_dependency("z1")),
    )
    .unwrap();
    let happ = Bundle::create_happ(
        HappInput::new("file-happ").with_role(RoleInput::new("main", dna.pack().unwrap())),
    )
    .unwrap();
    Bundle::create_webhapp(WebHappInput::new(
        "file-webhapp",
        b"PK\x03\x04".to_vec(),
        happ.pack().unwrap(),
    ))
    .unwrap()
}

#[test]
fn test_write_and_read_by_extension() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let bundle = webhapp();
    let path = temp_dir
        .path()
        .join(format!("{}.{}", bundle.name(), bundle.kind().extension()));
    std::fs::write(&path, bundle.pack()?)?;

    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("webhapp"));
    let kind: BundleKind = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap()
        .parse()
        .unwrap();

    let decoded = Bundle::from_bytes(&std::fs::read(&path)?, Some(kind))?;
    assert_eq!(decoded, bundle);
    assert_eq!(decoded.ui()?.as_ref(), b"PK\x03\x04");
    Ok(())
}

#[test]
fn test_unpacked_children_written_separately() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let happ = webhapp().happ()?;

    for (name, bytes) in happ.resources().iter() {
        std::fs::write(temp_dir.path().join(name), bytes)?;
    }

    let dna_bytes = std::fs::read(temp_dir.path().join("main.dna"))?;
    let dna = Bundle::from_bytes(&dna_bytes, Some(BundleKind::Dna))?;
    assert_eq!(dna.name(), "file-dna");
    assert_eq!(dna.resource_names(), vec!["z1.wasm", "z2.wasm"]);
    Ok(())
}
