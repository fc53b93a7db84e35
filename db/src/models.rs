//! Resource models for platforms, alerts, applications and DNS zones.
//!
//! The types serialize as camelCase JSON and round-trip through the
//! [`FileStore`](crate::FileStore) document. Enumerations accept their
//! command-line spellings through [`FromStr`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Kind of resource, used in messages and cache bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Platform,
    Alert,
    Application,
    Zone,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Platform => "platform",
            Self::Alert => "alert",
            Self::Application => "application",
            Self::Zone => "zone",
        };
        f.write_str(name)
    }
}

/// Common view over stored resources.
pub trait Resource: Clone {
    /// Kind of this resource.
    const KIND: ResourceKind;

    /// Store-assigned identifier.
    fn id(&self) -> u64;

    /// Display name used for lookups and completion.
    fn name(&self) -> &str;
}

/// Who can see a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// Managed by this account.
    Private,
    /// Shared with the whole community.
    Community,
}

/// Which platforms a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformScope {
    Private,
    Community,
    All,
}

impl PlatformScope {
    /// Returns `true` if platforms with `visibility` fall in this scope.
    pub fn includes(self, visibility: Visibility) -> bool {
        match self {
            Self::Private => visibility == Visibility::Private,
            Self::Community => visibility == Visibility::Community,
            Self::All => true,
        }
    }
}

/// Community platform categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformCategory {
    CloudComputing,
    DynamicContent,
    DeliveryNetwork,
    CloudStorage,
}

impl fmt::Display for PlatformCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CloudComputing => "Cloud Computing",
            Self::DynamicContent => "Dynamic Content",
            Self::DeliveryNetwork => "Delivery Network",
            Self::CloudStorage => "Cloud Storage",
        };
        f.write_str(name)
    }
}

/// Two-letter market codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "GL")]
    Global,
    #[serde(rename = "AF")]
    Africa,
    #[serde(rename = "AS")]
    Asia,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "OC")]
    Oceania,
    #[serde(rename = "SA")]
    SouthAmerica,
    #[serde(rename = "XX")]
    Unknown,
}

impl FromStr for Market {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GL" => Ok(Self::Global),
            "AF" => Ok(Self::Africa),
            "AS" => Ok(Self::Asia),
            "EU" => Ok(Self::Europe),
            "NA" => Ok(Self::NorthAmerica),
            "OC" => Ok(Self::Oceania),
            "SA" => Ok(Self::SouthAmerica),
            "XX" => Ok(Self::Unknown),
            _ => Err(DbError::InvalidValue {
                field: "market",
                value: s.to_string(),
            }),
        }
    }
}

/// Active health-check ("sonar") settings of a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_ssl_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_match_type: Option<String>,
}

/// A delivery platform (CDN, cloud region, data center).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: u64,
    pub name: String,
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: PlatformCategory,
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Community platform this private platform measures against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonar: Option<SonarConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Resource for Platform {
    const KIND: ResourceKind = ResourceKind::Platform;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// What triggers an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertType {
    Sonar,
}

impl FromStr for AlertType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "sonar" => Ok(Self::Sonar),
            _ => Err(DbError::InvalidValue {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// Which availability transitions raise an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertChange {
    Any,
    ToUp,
    ToDown,
}

impl FromStr for AlertChange {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "any" => Ok(Self::Any),
            "up" | "toup" => Ok(Self::ToUp),
            "down" | "todown" => Ok(Self::ToDown),
            _ => Err(DbError::InvalidValue {
                field: "change",
                value: s.to_string(),
            }),
        }
    }
}

/// When an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertTiming {
    Immediate,
}

impl FromStr for AlertTiming {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "immediate" => Ok(Self::Immediate),
            _ => Err(DbError::InvalidValue {
                field: "timing",
                value: s.to_string(),
            }),
        }
    }
}

/// A health-check alert bound to a private platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub platform: u64,
    pub change: AlertChange,
    pub timing: AlertTiming,
    #[serde(default)]
    pub emails: Vec<String>,
    pub interval_seconds: u32,
    pub enabled: bool,
}

impl Resource for Alert {
    const KIND: ResourceKind = ResourceKind::Alert;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Openmix traffic-steering application types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    #[serde(rename = "JS_V1")]
    JavascriptV1,
    #[serde(rename = "RT_HTTP_PERFORMANCE")]
    OptimalRtt,
    #[serde(rename = "STATIC_FAILOVER")]
    Failover,
    #[serde(rename = "RR_PURE_WEIGHTED")]
    RoundRobin,
    #[serde(rename = "STATIC_ROUTING")]
    StaticRouting,
    #[serde(rename = "KBPS_HTTP_PERFORMANCE")]
    Throughput,
}

impl ApplicationType {
    /// Command-line spellings, in display order.
    pub const NAMES: [&'static str; 6] = [
        "failover",
        "javascript",
        "optimal-rtt",
        "round-robin",
        "static-routing",
        "throughput",
    ];
}

impl FromStr for ApplicationType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" | "js_v1" => Ok(Self::JavascriptV1),
            "optimal-rtt" | "rt_http_performance" => Ok(Self::OptimalRtt),
            "failover" | "static_failover" => Ok(Self::Failover),
            "round-robin" | "rr_pure_weighted" => Ok(Self::RoundRobin),
            "static-routing" | "static_routing" => Ok(Self::StaticRouting),
            "throughput" | "kbps_http_performance" => Ok(Self::Throughput),
            _ => Err(DbError::InvalidValue {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// A platform eligible to receive traffic from an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPlatform {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    pub sonar_enabled: bool,
}

/// An Openmix DNS application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub app_type: ApplicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_cname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_threshold: Option<u32>,
    #[serde(default)]
    pub platforms: Vec<ApplicationPlatform>,
    pub enabled: bool,
}

impl Resource for Application {
    const KIND: ResourceKind = ResourceKind::Application;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An authoritative DNS zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: u64,
    pub domain_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// BIND zone file content the zone was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_file: Option<String>,
}

impl Zone {
    /// Number of resource records in the imported zone file.
    ///
    /// Blank lines, `;` comments and `$` directives are not records.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_db::Zone;
    ///
    /// let zone = Zone {
    ///     id: 1,
    ///     domain_name: "example.com".into(),
    ///     description: None,
    ///     tags: Vec::new(),
    ///     zone_file: Some("$TTL 300\n; apex\n@ IN A 192.0.2.1\nwww IN CNAME @\n".into()),
    /// };
    /// assert_eq!(zone.record_count(), 2);
    /// ```
    pub fn record_count(&self) -> usize {
        self.zone_file
            .as_deref()
            .map(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .filter(|line| !line.starts_with(';') && !line.starts_with('$'))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Resource for Zone {
    const KIND: ResourceKind = ResourceKind::Zone;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.domain_name
    }
}

/// Splits a comma-separated list, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
