//! Read-through caches in front of a [`TrafficApi`].
//!
//! Completion runs on every keystroke, so listings are fetched once per
//! kind and kept until a write through [`Catalog`] invalidates them.

use crate::api::TrafficApi;
use crate::error::{DbError, Result};
use crate::models::{Alert, Application, Platform, PlatformScope, Resource, Visibility, Zone};

/// Lazily filled listing of one resource kind.
///
/// # Examples
///
/// ```
/// use traffic_shell_db::{ResourceCache, Zone};
///
/// let mut cache: ResourceCache<Zone> = ResourceCache::new();
/// assert!(!cache.is_loaded());
/// let zones = cache
///     .list(|| {
///         Ok(vec![Zone {
///             id: 3,
///             domain_name: "example.com".into(),
///             description: None,
///             tags: vec![],
///             zone_file: None,
///         }])
///     })
///     .unwrap();
/// assert_eq!(zones.len(), 1);
/// assert_eq!(cache.find_by_name("example.com").map(|z| z.id), Some(3));
///
/// cache.invalidate();
/// assert!(cache.get(3).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceCache<T> {
    entries: Option<Vec<T>>,
}

impl<T> Default for ResourceCache<T> {
    fn default() -> Self {
        Self { entries: None }
    }
}

impl<T: Resource> ResourceCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a listing has been fetched and not invalidated.
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// Returns the cached listing, calling `load` first if it is empty.
    ///
    /// A failed load leaves the cache empty so the next call retries.
    pub fn list(&mut self, load: impl FnOnce() -> Result<Vec<T>>) -> Result<&[T]> {
        if self.entries.is_none() {
            let fetched = load()?;
            tracing::debug!(kind = %T::KIND, count = fetched.len(), "cache filled");
            self.entries = Some(fetched);
        }
        Ok(self.entries.as_deref().unwrap_or_default())
    }

    /// Looks up a cached entry by id.
    pub fn get(&self, id: u64) -> Option<&T> {
        self.entries.as_ref()?.iter().find(|item| item.id() == id)
    }

    /// Looks up a cached entry by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.entries.as_ref()?.iter().find(|item| item.name() == name)
    }

    /// Drops the listing; the next [`list`](Self::list) refetches.
    pub fn invalidate(&mut self) {
        if self.entries.take().is_some() {
            tracing::debug!(kind = %T::KIND, "cache invalidated");
        }
    }
}

/// A [`TrafficApi`] client with one cache per resource kind.
///
/// Lookups by name go through the caches; creates and deletes go to the
/// API and invalidate the affected kind.
///
/// # Examples
///
/// ```
/// use traffic_shell_db::{Catalog, FileStore, PlatformScope};
///
/// let mut catalog = Catalog::new(FileStore::seeded());
/// let akamai = catalog.platform_by_name("Akamai", PlatformScope::Community).unwrap();
/// assert_eq!(akamai.short_name, "akamai");
/// assert!(catalog.platform_by_name("Akamai", PlatformScope::Private).is_err());
/// ```
#[derive(Debug)]
pub struct Catalog<A> {
    api: A,
    community_platforms: ResourceCache<Platform>,
    private_platforms: ResourceCache<Platform>,
    alerts: ResourceCache<Alert>,
    applications: ResourceCache<Application>,
    zones: ResourceCache<Zone>,
}

impl<A: TrafficApi> Catalog<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            community_platforms: ResourceCache::new(),
            private_platforms: ResourceCache::new(),
            alerts: ResourceCache::new(),
            applications: ResourceCache::new(),
            zones: ResourceCache::new(),
        }
    }

    /// Returns the wrapped API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Consumes the catalog, returning the wrapped API.
    pub fn into_inner(self) -> A {
        self.api
    }

    /// Drops every cached listing.
    pub fn invalidate_all(&mut self) {
        self.community_platforms.invalidate();
        self.private_platforms.invalidate();
        self.alerts.invalidate();
        self.applications.invalidate();
        self.zones.invalidate();
    }

    /// Lists platforms in `scope`, community platforms first.
    pub fn platforms(&mut self, scope: PlatformScope) -> Result<Vec<Platform>> {
        let mut result = Vec::new();
        if scope.includes(Visibility::Community) {
            let api = &self.api;
            result.extend_from_slice(
                self.community_platforms
                    .list(|| api.platforms(PlatformScope::Community))?,
            );
        }
        if scope.includes(Visibility::Private) {
            let api = &self.api;
            result.extend_from_slice(
                self.private_platforms
                    .list(|| api.platforms(PlatformScope::Private))?,
            );
        }
        Ok(result)
    }

    /// Finds a platform in `scope` by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no platform in `scope` has the name.
    pub fn platform_by_name(&mut self, name: &str, scope: PlatformScope) -> Result<Platform> {
        self.platforms(scope)?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| not_found::<Platform>(name))
    }

    pub fn create_platform(&mut self, platform: Platform) -> Result<Platform> {
        let created = self.api.create_platform(platform);
        // Invalidate even when the write fails.
        self.private_platforms.invalidate();
        created
    }

    /// Deletes a private platform by name.
    pub fn delete_platform(&mut self, name: &str) -> Result<()> {
        let platform = self.platform_by_name(name, PlatformScope::Private)?;
        let deleted = self.api.delete_platform(platform.id);
        self.private_platforms.invalidate();
        deleted
    }

    pub fn alerts(&mut self) -> Result<Vec<Alert>> {
        let api = &self.api;
        Ok(self.alerts.list(|| api.alerts())?.to_vec())
    }

    pub fn alert_by_name(&mut self, name: &str) -> Result<Alert> {
        let api = &self.api;
        self.alerts.list(|| api.alerts())?;
        self.alerts
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| not_found::<Alert>(name))
    }

    pub fn create_alert(&mut self, alert: Alert) -> Result<Alert> {
        let created = self.api.create_alert(alert);
        self.alerts.invalidate();
        created
    }

    pub fn delete_alert(&mut self, name: &str) -> Result<()> {
        let alert = self.alert_by_name(name)?;
        let deleted = self.api.delete_alert(alert.id);
        self.alerts.invalidate();
        deleted
    }

    pub fn applications(&mut self) -> Result<Vec<Application>> {
        let api = &self.api;
        Ok(self.applications.list(|| api.applications())?.to_vec())
    }

    pub fn application_by_name(&mut self, name: &str) -> Result<Application> {
        let api = &self.api;
        self.applications.list(|| api.applications())?;
        self.applications
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| not_found::<Application>(name))
    }

    pub fn create_application(&mut self, application: Application) -> Result<Application> {
        let created = self.api.create_application(application);
        self.applications.invalidate();
        created
    }

    pub fn delete_application(&mut self, name: &str) -> Result<()> {
        let application = self.application_by_name(name)?;
        let deleted = self.api.delete_application(application.id);
        self.applications.invalidate();
        deleted
    }

    pub fn zones(&mut self) -> Result<Vec<Zone>> {
        let api = &self.api;
        Ok(self.zones.list(|| api.zones())?.to_vec())
    }

    pub fn zone_by_name(&mut self, name: &str) -> Result<Zone> {
        let api = &self.api;
        self.zones.list(|| api.zones())?;
        self.zones
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| not_found::<Zone>(name))
    }

    pub fn create_zone(&mut self, zone: Zone) -> Result<Zone> {
        let created = self.api.create_zone(zone);
        self.zones.invalidate();
        created
    }

    pub fn delete_zone(&mut self, name: &str) -> Result<()> {
        let zone = self.zone_by_name(name)?;
        let deleted = self.api.delete_zone(zone.id);
        self.zones.invalidate();
        deleted
    }
}

fn not_found<T: Resource>(name: &str) -> DbError {
    DbError::NotFound {
        kind: T::KIND,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::FileStore;

    fn zone(id: u64, name: &str) -> Zone {
        Zone {
            id,
            domain_name: name.to_string(),
            description: None,
            tags: Vec::new(),
            zone_file: None,
        }
    }

    #[test]
    fn test_list_loads_once() {
        let calls = Cell::new(0);
        let mut cache = ResourceCache::new();
        for _ in 0..3 {
            cache
                .list(|| {
                    calls.set(calls.get() + 1);
                    Ok(vec![zone(1, "a.example")])
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get(1).map(|z| z.domain_name.as_str()), Some("a.example"));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let mut cache: ResourceCache<Zone> = ResourceCache::new();
        let err = cache.list(|| Err(DbError::InvalidValue { field: "x", value: "y".into() }));
        assert!(err.is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.list(|| Ok(vec![zone(2, "b")])).unwrap().len(), 1);
    }

    #[test]
    fn test_writes_invalidate() {
        let mut catalog = Catalog::new(FileStore::seeded());
        assert!(catalog.zones().unwrap().is_empty());
        catalog.create_zone(zone(0, "example.org")).unwrap();
        assert_eq!(catalog.zones().unwrap().len(), 1);
        catalog.delete_zone("example.org").unwrap();
        assert!(catalog.zones().unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::seeded().with_path(dir.path().join("missing/state.json"));
        let mut catalog = Catalog::new(store);
        assert!(catalog.zones().unwrap().is_empty());

        assert!(catalog.create_zone(zone(0, "example.org")).is_err());
        assert!(catalog.zones().unwrap().is_empty());
        assert!(catalog.zone_by_name("example.org").is_err());
    }

    #[test]
    fn test_platform_scopes() {
        let mut catalog = Catalog::new(FileStore::seeded());
        let community = catalog.platforms(PlatformScope::Community).unwrap().len();
        assert_eq!(catalog.platforms(PlatformScope::All).unwrap().len(), community);
        assert!(catalog.platforms(PlatformScope::Private).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_name() {
        let mut catalog = Catalog::new(FileStore::seeded());
        let err = catalog.delete_alert("nope").unwrap_err();
        assert_eq!(err.to_string(), "alert 'nope' not found");
    }
}
