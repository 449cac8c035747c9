//! End-to-end format detection and export bundle tests through the public API.

use std::sync::Arc;

use vault_core::crypto::KeyDerivationParams;
use vault_core::export::serialize_records;
use vault_core::{
    CredentialManager, CryptoCapability, ExportFormat, FixedKeyCodec, ImportDetector,
    ImportRecord, ImportSource, JsonFileStore, NewCredential, PasswordCodec, StaticIdentity,
    VaultError,
};

const FIXED_SECRET: &str = "0123456789abcdef0123456789abcdef";

fn detector() -> ImportDetector {
    let capability = CryptoCapability::probe().unwrap();
    ImportDetector::new(PasswordCodec::with_params(
        capability,
        KeyDerivationParams { iterations: 1_000 },
    ))
}

fn record(name: &str, url: Option<&str>, username: &str, password: &str) -> ImportRecord {
    ImportRecord::from_fields(Some(name), url, Some(username), Some(password)).unwrap()
}

#[tokio::test]
async fn test_foreign_json_export() {
    let text = r#"{"items":[{"type":1,"name":"Acme","login":{"username":"bob","password":"pw1","uris":[{"uri":"https://acme.test"}]}}]}"#;

    let detected = detector()
        .detect_and_parse(text, "bitwarden.json", None)
        .await
        .unwrap();

    assert_eq!(detected.source, ImportSource::ForeignJson);
    assert!(!detected.decrypted);
    assert_eq!(
        detected.records,
        vec![record("Acme", Some("https://acme.test"), "bob", "pw1")]
    );
}

#[tokio::test]
async fn test_native_json_drops_incomplete_entries() {
    let text = r#"[{"websiteName":"X","username":"u","password":"p"},{"websiteName":"Y","username":"u"}]"#;

    let detected = detector()
        .detect_and_parse(text, "vault.json", None)
        .await
        .unwrap();

    assert_eq!(detected.source, ImportSource::NativeJson);
    assert_eq!(detected.records, vec![record("X", None, "u", "p")]);
}

#[tokio::test]
async fn test_foreign_csv_export() {
    let text = "name,login_username,login_password,login_uri\nAcme,bob,pw1,https://acme.test";

    let detected = detector()
        .detect_and_parse(text, "export.csv", None)
        .await
        .unwrap();

    assert_eq!(detected.source, ImportSource::ForeignCsv);
    assert_eq!(
        detected.records,
        vec![record("Acme", Some("https://acme.test"), "bob", "pw1")]
    );
}

#[tokio::test]
async fn test_native_csv_export() {
    let detected = detector()
        .detect_and_parse("websiteName,username,password\nSite,u,p", "export.csv", None)
        .await
        .unwrap();

    assert_eq!(detected.source, ImportSource::NativeCsv);
    assert_eq!(detected.records, vec![record("Site", None, "u", "p")]);
}

#[tokio::test]
async fn test_bundle_with_default_iterations() {
    let capability = CryptoCapability::probe().unwrap();
    let codec = PasswordCodec::new(capability);
    let detector = ImportDetector::new(codec);

    let records = vec![
        record("Example", Some("https://ex.com"), "bob", "pw1"),
        record("Other", None, "carol", "pw2"),
    ];
    let plaintext = serialize_records(&records, ExportFormat::Json).unwrap();
    let bundle = codec.protect_payload(&plaintext, "k1").await.unwrap().to_string();

    let detected = detector
        .detect_and_parse(&bundle, "backup.json", Some("k1"))
        .await
        .unwrap();
    assert!(detected.decrypted);
    assert_eq!(detected.source, ImportSource::NativeJson);
    assert_eq!(detected.records, records);

    // A wrong key leaves the bundle as plaintext, which holds no credentials
    let wrong = detector
        .detect_and_parse(&bundle, "backup.json", Some("wrong"))
        .await;
    assert!(matches!(
        wrong,
        Err(VaultError::NoCredentialsFound { ref file }) if file == "backup.json"
    ));
}

#[tokio::test]
async fn test_empty_file() {
    let result = detector().detect_and_parse("", "empty.csv", None).await;
    assert!(matches!(result, Err(VaultError::NoCredentialsFound { .. })));
}

#[tokio::test]
async fn test_csv_bundle_survives_persistent_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let capability = CryptoCapability::probe().unwrap();
    let params = KeyDerivationParams { iterations: 1_000 };

    let open_manager = |store: JsonFileStore| {
        CredentialManager::new(
            Arc::new(store),
            Arc::new(StaticIdentity::new("owner-1").unwrap()),
            FixedKeyCodec::new(capability, FIXED_SECRET).unwrap(),
            PasswordCodec::with_params(capability, params),
        )
    };

    let bundle = {
        let manager = open_manager(JsonFileStore::open(dir.path()).await.unwrap());
        manager
            .add(NewCredential::new(
                "Quoted \"Site\"",
                Some("https://q.test".into()),
                "bob",
                "p,w\n1",
            ))
            .await
            .unwrap();
        manager
            .export(ExportFormat::Csv, "S3cret!", "vault_export_encrypted")
            .await
            .unwrap()
    };
    assert_eq!(bundle.format, ExportFormat::Csv);
    assert!(bundle.file_name.starts_with("vault_export_encrypted_"));

    // Reopen from disk in a second data directory and import the bundle
    let other = tempfile::TempDir::new().unwrap();
    let manager = open_manager(JsonFileStore::open(other.path()).await.unwrap());
    let report = manager
        .import_file(&bundle.contents, &bundle.file_name, Some("S3cret!"))
        .await
        .unwrap();

    assert!(report.decrypted);
    assert_eq!(report.source, Some(ImportSource::NativeCsv));
    assert_eq!(report.imported.len(), 1);

    let restored = manager.list_decrypted().await.unwrap();
    assert_eq!(restored[0].credential.website_name, "Quoted \"Site\"");
    assert_eq!(restored[0].password.expose(), "p,w\n1");
}
