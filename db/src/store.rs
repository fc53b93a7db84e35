//! JSON file backed implementation of [`TrafficApi`].
//!
//! The whole state lives in one [`StoreDocument`]. Every successful write
//! is flushed to disk when the store has a path; stores built with
//! [`FileStore::in_memory`] or [`FileStore::seeded`] stay in memory until
//! [`FileStore::save_to`] is called.
//!
//! # Examples
//!
//! ```
//! use traffic_shell_db::{FileStore, PlatformScope, TrafficApi};
//!
//! let store = FileStore::seeded();
//! let community = store.platforms(PlatformScope::Community).unwrap();
//! assert!(!community.is_empty());
//! assert!(store.platforms(PlatformScope::Private).unwrap().is_empty());
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::TrafficApi;
use crate::error::{DbError, Result};
use crate::models::{
    Alert, Application, Platform, PlatformCategory, PlatformScope, Resource, Visibility, Zone,
};

/// On-disk layout of a [`FileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    /// Next identifier to hand out.
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl StoreDocument {
    fn max_id(&self) -> u64 {
        let platforms = self.platforms.iter().map(Resource::id);
        let alerts = self.alerts.iter().map(Resource::id);
        let applications = self.applications.iter().map(Resource::id);
        let zones = self.zones.iter().map(Resource::id);
        platforms
            .chain(alerts)
            .chain(applications)
            .chain(zones)
            .max()
            .unwrap_or(0)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }
}

/// Resource store persisted as a single JSON document.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    path: Option<PathBuf>,
    document: StoreDocument,
}

impl FileStore {
    /// Creates an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates an in-memory store holding the standard community platforms.
    pub fn seeded() -> Self {
        let platforms = COMMUNITY_PLATFORMS
            .iter()
            .zip(1..)
            .map(|(&(name, short_name, category), id)| Platform {
                id,
                name: name.to_string(),
                short_name: short_name.to_string(),
                description: None,
                category,
                visibility: Visibility::Community,
                tags: Vec::new(),
                archetype: None,
                sonar: None,
                created: None,
                modified: None,
            })
            .collect::<Vec<_>>();

        let document = StoreDocument {
            next_id: platforms.len() as u64 + 1,
            platforms,
            ..StoreDocument::default()
        };
        Self {
            path: None,
            document,
        }
    }

    /// Loads a store from an existing JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::IoError`] if the file cannot be read, or
    /// [`DbError::JsonError`] if it is not a valid document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut document: StoreDocument = serde_json::from_reader(reader)?;
        document.next_id = document.next_id.max(document.max_id() + 1);

        tracing::debug!(
            path = %path.display(),
            platforms = document.platforms.len(),
            alerts = document.alerts.len(),
            applications = document.applications.len(),
            zones = document.zones.len(),
            "loaded state file"
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
        })
    }

    /// Loads `path` if it exists, otherwise starts from [`FileStore::seeded`]
    /// bound to `path`. Nothing is written until the first change.
    ///
    /// # Errors
    ///
    /// Same as [`FileStore::load`] when the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "state file missing, starting from seed");
            Ok(Self::seeded().with_path(path))
        }
    }

    /// Binds the store to `path` for subsequent writes.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the file this store writes to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the current document.
    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    /// Writes the document to the bound path. In-memory stores do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::IoError`] or [`DbError::JsonError`] if writing fails.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Writes the document as pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::IoError`] or [`DbError::JsonError`] if writing fails.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(path.as_ref(), &self.document)
    }

    /// Applies `change` to a copy of the document and keeps the copy only
    /// once it has been written.
    fn commit<R>(&mut self, change: impl FnOnce(&mut StoreDocument) -> Result<R>) -> Result<R> {
        let mut draft = self.document.clone();
        let result = change(&mut draft)?;
        if let Some(path) = &self.path {
            write_document(path, &draft)?;
        }
        self.document = draft;
        Ok(result)
    }
}

impl TrafficApi for FileStore {
    fn platforms(&self, scope: PlatformScope) -> Result<Vec<Platform>> {
        Ok(self
            .document
            .platforms
            .iter()
            .filter(|p| scope.includes(p.visibility))
            .cloned()
            .collect())
    }

    fn platform(&self, id: u64) -> Result<Platform> {
        find(&self.document.platforms, id)
    }

    fn create_platform(&mut self, mut platform: Platform) -> Result<Platform> {
        let platform = self.commit(|doc| {
            ensure_unique(&doc.platforms, platform.name())?;
            let now = Utc::now();
            platform.id = doc.allocate_id();
            platform.visibility = Visibility::Private;
            platform.created = Some(now);
            platform.modified = Some(now);
            doc.platforms.push(platform.clone());
            Ok(platform)
        })?;
        tracing::debug!(id = platform.id, name = %platform.name, "created platform");
        Ok(platform)
    }

    fn delete_platform(&mut self, id: u64) -> Result<()> {
        self.commit(|doc| {
            let index = doc
                .platforms
                .iter()
                .position(|p| p.id == id && p.visibility == Visibility::Private)
                .ok_or_else(|| not_found::<Platform>(id))?;
            doc.platforms.remove(index);
            Ok(())
        })
    }

    fn alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.document.alerts.clone())
    }

    fn alert(&self, id: u64) -> Result<Alert> {
        find(&self.document.alerts, id)
    }

    fn create_alert(&mut self, mut alert: Alert) -> Result<Alert> {
        let alert = self.commit(|doc| {
            ensure_unique(&doc.alerts, alert.name())?;
            find(&doc.platforms, alert.platform)?;
            alert.id = doc.allocate_id();
            doc.alerts.push(alert.clone());
            Ok(alert)
        })?;
        tracing::debug!(id = alert.id, name = %alert.name, "created alert");
        Ok(alert)
    }

    fn delete_alert(&mut self, id: u64) -> Result<()> {
        self.commit(|doc| remove(&mut doc.alerts, id).map(drop))
    }

    fn applications(&self) -> Result<Vec<Application>> {
        Ok(self.document.applications.clone())
    }

    fn application(&self, id: u64) -> Result<Application> {
        find(&self.document.applications, id)
    }

    fn create_application(&mut self, mut application: Application) -> Result<Application> {
        let application = self.commit(|doc| {
            ensure_unique(&doc.applications, application.name())?;
            application.id = doc.allocate_id();
            doc.applications.push(application.clone());
            Ok(application)
        })?;
        tracing::debug!(id = application.id, name = %application.name, "created application");
        Ok(application)
    }

    fn delete_application(&mut self, id: u64) -> Result<()> {
        self.commit(|doc| remove(&mut doc.applications, id).map(drop))
    }

    fn zones(&self) -> Result<Vec<Zone>> {
        Ok(self.document.zones.clone())
    }

    fn zone(&self, id: u64) -> Result<Zone> {
        find(&self.document.zones, id)
    }

    fn create_zone(&mut self, mut zone: Zone) -> Result<Zone> {
        let zone = self.commit(|doc| {
            ensure_unique(&doc.zones, zone.name())?;
            zone.id = doc.allocate_id();
            doc.zones.push(zone.clone());
            Ok(zone)
        })?;
        tracing::debug!(id = zone.id, domain = %zone.domain_name, "created zone");
        Ok(zone)
    }

    fn delete_zone(&mut self, id: u64) -> Result<()> {
        self.commit(|doc| remove(&mut doc.zones, id).map(drop))
    }
}

fn write_document(path: &Path, document: &StoreDocument) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}

fn not_found<T: Resource>(id: u64) -> DbError {
    DbError::NotFound {
        kind: T::KIND,
        name: format!("#{id}"),
    }
}

fn find<T: Resource>(items: &[T], id: u64) -> Result<T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .cloned()
        .ok_or_else(|| not_found::<T>(id))
}

fn remove<T: Resource>(items: &mut Vec<T>, id: u64) -> Result<T> {
    let index = items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| not_found::<T>(id))?;
    Ok(items.remove(index))
}

fn ensure_unique<T: Resource>(items: &[T], name: &str) -> Result<()> {
    if items.iter().any(|item| item.name() == name) {
        return Err(DbError::Duplicate {
            kind: T::KIND,
            name: name.to_string(),
        });
    }
    Ok(())
}

const COMMUNITY_PLATFORMS: &[(&str, &str, PlatformCategory)] = &[
    ("Akamai", "akamai", PlatformCategory::DeliveryNetwork),
    ("Amazon CloudFront", "cloudfront", PlatformCategory::DeliveryNetwork),
    ("Fastly", "fastly", PlatformCategory::DeliveryNetwork),
    ("Amazon EC2 - US East (N. Virginia)", "ec2_us_east_1", PlatformCategory::CloudComputing),
    ("Amazon EC2 - EU (Ireland)", "ec2_eu_west_1", PlatformCategory::CloudComputing),
    ("Google Cloud - us-central1", "gce_us_central1", PlatformCategory::CloudComputing),
    ("Azure - West Europe", "azure_west_europe", PlatformCategory::CloudComputing),
    ("Cloudflare Workers", "cf_workers", PlatformCategory::DynamicContent),
    ("Amazon S3 - US Standard", "s3_us_standard", PlatformCategory::CloudStorage),
    ("Google Cloud Storage", "gcs", PlatformCategory::CloudStorage),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertChange, AlertTiming, AlertType};

    fn private_platform(name: &str) -> Platform {
        Platform {
            id: 0,
            name: name.to_string(),
            short_name: name.to_lowercase(),
            description: None,
            category: PlatformCategory::CloudComputing,
            visibility: Visibility::Private,
            tags: Vec::new(),
            archetype: Some(4),
            sonar: None,
            created: None,
            modified: None,
        }
    }

    #[test]
    fn test_seeded_ids_are_sequential() {
        let store = FileStore::seeded();
        let ids: Vec<u64> = store.document().platforms.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=COMMUNITY_PLATFORMS.len() as u64).collect::<Vec<_>>());
        assert_eq!(store.document().next_id, COMMUNITY_PLATFORMS.len() as u64 + 1);
    }

    #[test]
    fn test_create_platform_assigns_id_and_visibility() {
        let mut store = FileStore::seeded();
        let mut platform = private_platform("Edge");
        platform.visibility = Visibility::Community;
        let created = store.create_platform(platform).unwrap();
        assert_eq!(created.id, COMMUNITY_PLATFORMS.len() as u64 + 1);
        assert_eq!(created.visibility, Visibility::Private);
        assert!(created.created.is_some());
        assert_eq!(store.platforms(PlatformScope::Private).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut store = FileStore::seeded();
        store.create_platform(private_platform("Edge")).unwrap();
        let err = store.create_platform(private_platform("Edge")).unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
    }

    #[test]
    fn test_community_platforms_cannot_be_deleted() {
        let mut store = FileStore::seeded();
        let err = store.delete_platform(1).unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_alert_requires_existing_platform() {
        let mut store = FileStore::seeded();
        let alert = Alert {
            id: 0,
            name: "down".into(),
            alert_type: AlertType::Sonar,
            platform: 999,
            change: AlertChange::Any,
            timing: AlertTiming::Immediate,
            emails: Vec::new(),
            interval_seconds: 300,
            enabled: true,
        };
        assert!(store.create_alert(alert).is_err());
        assert!(store.alerts().unwrap().is_empty());
    }

    #[test]
    fn test_delete_zone_missing() {
        let mut store = FileStore::in_memory();
        let err = store.delete_zone(3).unwrap_err();
        assert_eq!(err.to_string(), "zone '#3' not found");
    }

    fn zone(name: &str) -> Zone {
        Zone {
            id: 0,
            domain_name: name.to_string(),
            description: None,
            tags: Vec::new(),
            zone_file: None,
        }
    }

    #[test]
    fn test_failed_write_leaves_document_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::seeded().with_path(dir.path().join("missing/state.json"));
        let before = store.document().clone();

        let err = store.create_zone(zone("retry.example")).unwrap_err();
        assert!(matches!(err, DbError::IoError(_)));
        assert_eq!(store.document(), &before);
        assert!(store.zones().unwrap().is_empty());

        let mut store = store.with_path(dir.path().join("state.json"));
        let created = store.create_zone(zone("retry.example")).unwrap();
        assert_eq!(created.id, before.next_id);
    }

    #[test]
    fn test_failed_delete_keeps_resource() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::seeded();
        let created = store.create_zone(zone("keep.example")).unwrap();

        let mut store = store.with_path(dir.path().join("missing/state.json"));
        assert!(store.delete_zone(created.id).is_err());
        assert_eq!(store.zone(created.id).unwrap().domain_name, "keep.example");
    }
}
