//! Resource storage for the traffic-management shell.
//!
//! This crate holds the models the shell manipulates (platforms, alerts,
//! applications and DNS zones), the [`TrafficApi`] seam, a JSON-file backed
//! implementation of it, and the read-through caches used for completion.
//!
//! # Quick start
//!
//! ```
//! use traffic_shell_db::{Catalog, FileStore, PlatformScope, Zone};
//!
//! let mut catalog = Catalog::new(FileStore::seeded());
//! catalog
//!     .create_zone(Zone {
//!         id: 0,
//!         domain_name: "example.com".into(),
//!         description: Some("Main site".into()),
//!         tags: vec![],
//!         zone_file: None,
//!     })
//!     .unwrap();
//!
//! assert_eq!(catalog.zones().unwrap().len(), 1);
//! assert!(!catalog.platforms(PlatformScope::Community).unwrap().is_empty());
//! ```

mod api;
mod cache;
mod config;
mod error;
mod filter;
mod models;
mod store;

pub use api::TrafficApi;
pub use cache::{Catalog, ResourceCache};
pub use config::{DEFAULT_TABLE_WIDTH, ShellConfig};
pub use error::{DbError, Result};
pub use filter::filter_by_name;
pub use models::{
    Alert, AlertChange, AlertTiming, AlertType, Application, ApplicationPlatform,
    ApplicationType, Market, Platform, PlatformCategory, PlatformScope, Resource, ResourceKind,
    SonarConfig, Visibility, Zone, split_list,
};
pub use store::{FileStore, StoreDocument};
