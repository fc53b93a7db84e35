//! The traffic-management service interface.
//!
//! [`TrafficApi`] is the seam between the shell and whatever holds the
//! resources. Created resources are passed with `id` set to `0`; the
//! implementation assigns the identifier and returns the stored copy.

use crate::error::Result;
use crate::models::{Alert, Application, Platform, PlatformScope, Zone};

/// CRUD operations over platforms, alerts, applications and DNS zones.
pub trait TrafficApi {
    /// Lists platforms visible in `scope`.
    fn platforms(&self, scope: PlatformScope) -> Result<Vec<Platform>>;

    /// Fetches one platform by id.
    fn platform(&self, id: u64) -> Result<Platform>;

    /// Stores a new private platform.
    fn create_platform(&mut self, platform: Platform) -> Result<Platform>;

    /// Deletes a private platform.
    fn delete_platform(&mut self, id: u64) -> Result<()>;

    fn alerts(&self) -> Result<Vec<Alert>>;

    fn alert(&self, id: u64) -> Result<Alert>;

    fn create_alert(&mut self, alert: Alert) -> Result<Alert>;

    fn delete_alert(&mut self, id: u64) -> Result<()>;

    fn applications(&self) -> Result<Vec<Application>>;

    fn application(&self, id: u64) -> Result<Application>;

    fn create_application(&mut self, application: Application) -> Result<Application>;

    fn delete_application(&mut self, id: u64) -> Result<()>;

    fn zones(&self) -> Result<Vec<Zone>>;

    fn zone(&self, id: u64) -> Result<Zone>;

    fn create_zone(&mut self, zone: Zone) -> Result<Zone>;

    fn delete_zone(&mut self, id: u64) -> Result<()>;
}
