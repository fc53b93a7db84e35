use traffic_shell_db::{
    Alert, AlertChange, AlertTiming, AlertType, Catalog, DbError, FileStore, Platform,
    PlatformCategory, PlatformScope, ShellConfig, TrafficApi, Visibility, Zone, filter_by_name,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn private_platform(name: &str, archetype: u64) -> Platform {
    Platform {
        id: 0,
        name: name.into(),
        short_name: name.replace(' ', "_"),
        description: None,
        category: PlatformCategory::CloudComputing,
        visibility: Visibility::Private,
        tags: vec!["edge".into()],
        archetype: Some(archetype),
        sonar: None,
        created: None,
        modified: None,
    }
}

fn zone(name: &str) -> Zone {
    Zone {
        id: 0,
        domain_name: name.into(),
        description: None,
        tags: Vec::new(),
        zone_file: Some("@ IN A 192.0.2.1\n".into()),
    }
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

#[test]
fn test_open_missing_file_starts_seeded_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = FileStore::open(&path).unwrap();
    assert!(!store.platforms(PlatformScope::Community).unwrap().is_empty());
    assert_eq!(store.path(), Some(path.as_path()));
    assert!(!path.exists());
}

#[test]
fn test_writes_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = FileStore::open(&path).unwrap();
    let created = store.create_platform(private_platform("West Edge", 4)).unwrap();
    store.create_zone(zone("example.com")).unwrap();
    assert!(path.exists());

    let reopened = FileStore::load(&path).unwrap();
    let private = reopened.platforms(PlatformScope::Private).unwrap();
    assert_eq!(private.len(), 1);
    assert_eq!(private[0].id, created.id);
    assert_eq!(private[0].short_name, "West_Edge");
    assert_eq!(reopened.zones().unwrap()[0].record_count(), 1);
}

#[test]
fn test_reload_never_reuses_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = FileStore::open(&path).unwrap();
    let first = store.create_zone(zone("a.example")).unwrap();

    // Simulate an older document without the counter.
    let mut document = store.document().clone();
    document.next_id = 0;
    std::fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

    let mut reopened = FileStore::load(&path).unwrap();
    let second = reopened.create_zone(zone("b.example")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn test_load_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::load(&path).unwrap_err();
    assert!(matches!(err, DbError::JsonError(_)));
}

#[test]
fn test_document_uses_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = FileStore::seeded().with_path(&path);
    store.create_platform(private_platform("p1", 4)).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"nextId\""));
    assert!(raw.contains("\"shortName\""));
    assert!(raw.contains("\"cloudComputing\""));
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn test_catalog_alert_lifecycle() {
    let mut catalog = Catalog::new(FileStore::seeded());
    let platform = catalog
        .create_platform(private_platform("origin", 4))
        .unwrap();

    catalog
        .create_alert(Alert {
            id: 0,
            name: "origin down".into(),
            alert_type: AlertType::Sonar,
            platform: platform.id,
            change: AlertChange::ToDown,
            timing: AlertTiming::Immediate,
            emails: vec!["ops@example.com".into()],
            interval_seconds: 300,
            enabled: true,
        })
        .unwrap();

    let alert = catalog.alert_by_name("origin down").unwrap();
    assert_eq!(alert.platform, platform.id);

    catalog.delete_alert("origin down").unwrap();
    assert!(catalog.alerts().unwrap().is_empty());
}

#[test]
fn test_catalog_delete_by_filter() {
    let mut catalog = Catalog::new(FileStore::seeded());
    for name in ["a.test", "b.test", "c.example"] {
        catalog.create_zone(zone(name)).unwrap();
    }

    let doomed = filter_by_name(catalog.zones().unwrap(), r"\.test$").unwrap();
    for z in &doomed {
        catalog.delete_zone(&z.domain_name).unwrap();
    }

    let left: Vec<_> = catalog
        .zones()
        .unwrap()
        .into_iter()
        .map(|z| z.domain_name)
        .collect();
    assert_eq!(left, vec!["c.example"]);
}

#[test]
fn test_catalog_community_platform_is_not_deletable() {
    let mut catalog = Catalog::new(FileStore::seeded());
    let err = catalog.delete_platform("Akamai").unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
    assert!(catalog
        .platform_by_name("Akamai", PlatformScope::All)
        .is_ok());
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ShellConfig::load(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, DbError::IoError(_)));
}

#[test]
fn test_config_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shell.yml");
    std::fs::write(&path, "log_level: debug\n").unwrap();

    let config = ShellConfig::load(&path).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.prompt, "> ");
}
