use assert_cmd::Command;

fn biblio(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("biblio").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("BIBLIO_ENV", "local")
        .env("BIBLIO_CONFIG_DIR", dir.path().join("config"))
        .env(
            "BIBLIO_DATABASE__PATH",
            dir.path().join("data").join("biblio.db"),
        );
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = biblio(&dir).arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for subcommand in ["serve", "migrate", "openapi"] {
        assert!(stdout.contains(subcommand), "missing {subcommand} in {stdout}");
    }
}

#[test]
fn migrate_creates_database_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    let first = biblio(&dir).arg("migrate").output().unwrap();
    assert!(first.status.success());
    let stdout = String::from_utf8(first.stdout).unwrap();
    assert!(stdout.contains("applied authors/001_create_authors"));
    assert!(stdout.contains("applied books/001_create_books"));
    assert!(dir.path().join("data").join("biblio.db").exists());

    let second = biblio(&dir).arg("migrate").output().unwrap();
    assert!(second.status.success());
    assert!(String::from_utf8(second.stdout)
        .unwrap()
        .contains("0 migration(s) applied"));
}

#[test]
fn openapi_prints_merged_document() {
    let dir = tempfile::tempdir().unwrap();
    let output = biblio(&dir).arg("openapi").output().unwrap();
    assert!(output.status.success());

    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(spec["openapi"], "3.1.0");
    assert!(spec["paths"]["/api/authors/{id}/books"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
    assert!(!dir.path().join("data").exists());
}

#[test]
fn unknown_subcommand_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = biblio(&dir).arg("frobnicate").output().unwrap();
    assert!(!output.status.success());
}
