//! `lf init` writes a manifest that round-trips through the loader it will
//! later be read back with (regression coverage for the starter template's
//! field names matching `lf_manifest::Model`).

use assert_cmd::Command;

#[test]
fn init_writes_a_manifest_that_loads_and_validates() {
    let project = tempfile::tempdir().expect("tempdir");

    Command::cargo_bin("lf")
        .expect("lf binary")
        .arg("init")
        .arg(project.path())
        .assert()
        .success();

    let manifest_path = project.path().join("manifest.yaml");
    assert!(manifest_path.exists());

    let manifest = lf_manifest::load_from_path(&manifest_path).expect("manifest should parse and validate");
    assert_eq!(manifest.namespace.0, "local");
    assert!(manifest.databases.contains_key("docs"));
    assert!(manifest.models.iter().any(|m| m.id == "default-embedder"));
}

#[test]
fn init_refuses_to_overwrite_an_existing_manifest() {
    let project = tempfile::tempdir().expect("tempdir");

    Command::cargo_bin("lf").expect("lf binary").arg("init").arg(project.path()).assert().success();

    Command::cargo_bin("lf").expect("lf binary").arg("init").arg(project.path()).assert().failure();
}
