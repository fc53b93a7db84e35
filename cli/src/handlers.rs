//! Command handlers.
//!
//! Each handler receives the parsed command and writes its report to the
//! supplied writer. Errors are returned to the caller, which prints them and
//! keeps the shell running.

use std::fmt;
use std::io::Write;

use traffic_shell_core::ParsedCommand;
use traffic_shell_db::{
    Alert, AlertChange, AlertTiming, AlertType, Application, ApplicationPlatform,
    ApplicationType, DbError, Market, Platform, PlatformCategory, PlatformScope, Resource,
    ResourceKind, SonarConfig, Visibility, Zone, filter_by_name, split_list,
};
use url::Url;

use crate::commands::*;
use crate::error::{Result, ShellError};
use crate::table::Table;

/// A parsed shell line.
pub type Command = ParsedCommand<CommandCode, Handler>;

/// Function run for a parsed command.
#[derive(Clone, Copy)]
pub struct Handler(pub fn(&mut Session, &Command, &mut dyn Write) -> Result<Outcome>);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// What the shell does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// State shared by all handlers.
#[derive(Debug)]
pub struct Session {
    pub catalog: SharedCatalog,
    pub table_width: usize,
    /// `(usage, description)` for every command, in tree order.
    pub help: Vec<(String, String)>,
}

pub fn handle_help(session: &mut Session, _: &Command, out: &mut dyn Write) -> Result<Outcome> {
    let width = session.help.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    for (usage, description) in &session.help {
        writeln!(out, "  {usage:<width$}  {description}")?;
    }
    Ok(Outcome::Continue)
}

pub fn handle_exit(_: &mut Session, _: &Command, _: &mut dyn Write) -> Result<Outcome> {
    Ok(Outcome::Exit)
}

pub fn handle_create_platform(
    session: &mut Session,
    cmd: &Command,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let name = required_name(cmd)?;
    let region = cmd
        .arg(ARG_REGION)
        .filter(|r| !r.is_empty())
        .ok_or(ShellError::MissingArgument(ARG_REGION))?;

    let sonar = parse_sonar(cmd)?;
    if sonar.enabled == Some(true) && sonar.url.is_none() {
        return Err(ShellError::Usage(format!(
            "health checks need -{ARG_SONAR_URL} to be enabled"
        )));
    }

    let mut catalog = session.catalog.borrow_mut();
    let archetype = catalog
        .platforms(PlatformScope::Community)?
        .into_iter()
        .find(|p| p.name == region && p.category == PlatformCategory::CloudComputing)
        .ok_or_else(|| DbError::NotFound {
            kind: ResourceKind::Platform,
            name: region.to_string(),
        })?;

    if cmd.has(ARG_FORCE) && catalog.platform_by_name(name, PlatformScope::Private).is_ok() {
        tracing::debug!(name, "replacing existing platform");
        catalog.delete_platform(name)?;
    }

    let short_name = cmd
        .arg(ARG_SHORT_NAME)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| name.replace(' ', "_"));

    let platform = catalog.create_platform(Platform {
        id: 0,
        name: name.to_string(),
        short_name,
        description: optional(cmd.arg(ARG_DESCRIPTION)),
        category: PlatformCategory::CloudComputing,
        visibility: Visibility::Private,
        tags: split_list(cmd.arg_or_empty(ARG_TAGS)),
        archetype: Some(archetype.id),
        sonar: (sonar != SonarConfig::default()).then_some(sonar),
        created: None,
        modified: None,
    })?;

    writeln!(out, "Created platform '{}' (id {})", platform.name, platform.id)?;
    Ok(Outcome::Continue)
}

pub fn handle_create_alert(
    session: &mut Session,
    cmd: &Command,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let name = required_name(cmd)?;
    let alert_type: AlertType = cmd.arg_or_empty(ARG_TYPE).parse()?;
    let change: AlertChange = cmd.arg_or_empty(ARG_CHANGE).parse()?;
    let timing: AlertTiming = cmd.arg_or_empty(ARG_TIMING).parse()?;
    let interval_minutes =
        parse_number(ARG_INTERVAL, cmd.arg_or_empty(ARG_INTERVAL))?.unwrap_or(5);
    let platform = cmd
        .arg(ARG_PLATFORM)
        .filter(|p| !p.is_empty())
        .ok_or(ShellError::MissingArgument(ARG_PLATFORM))?;

    let mut catalog = session.catalog.borrow_mut();
    let platform = catalog.platform_by_name(platform, PlatformScope::Private)?;
    let alert = catalog.create_alert(Alert {
        id: 0,
        name: name.to_string(),
        alert_type,
        platform: platform.id,
        change,
        timing,
        emails: split_list(cmd.arg_or_empty(ARG_EMAILS)),
        interval_seconds: interval_minutes.saturating_mul(60),
        enabled: true,
    })?;

    writeln!(out, "Created alert '{}' (id {})", alert.name, alert.id)?;
    Ok(Outcome::Continue)
}

pub fn handle_create_application(
    session: &mut Session,
    cmd: &Command,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let name = required_name(cmd)?;
    let app_type: ApplicationType = cmd
        .arg(ARG_TYPE)
        .filter(|t| !t.is_empty())
        .ok_or(ShellError::MissingArgument(ARG_TYPE))?
        .parse()?;
    let availability_threshold = parse_number(
        ARG_AVAILABILITY_THRESHOLD,
        cmd.arg_or_empty(ARG_AVAILABILITY_THRESHOLD),
    )?;
    let sonar_enabled =
        parse_bool(ARG_SONAR_ENABLED, cmd.arg_or_empty(ARG_SONAR_ENABLED))?.unwrap_or(true);
    let target = cmd
        .arg(ARG_TARGET_PLATFORM)
        .filter(|t| !t.is_empty())
        .ok_or(ShellError::MissingArgument(ARG_TARGET_PLATFORM))?;

    let mut catalog = session.catalog.borrow_mut();
    let target = catalog.platform_by_name(target, PlatformScope::All)?;
    let application = catalog.create_application(Application {
        id: 0,
        name: name.to_string(),
        description: optional(cmd.arg(ARG_DESCRIPTION)),
        app_type,
        cname: None,
        fallback_cname: optional(cmd.arg(ARG_FALLBACK_CNAME)),
        availability_threshold,
        platforms: vec![ApplicationPlatform {
            id: target.id,
            cname: optional(cmd.arg(ARG_TARGET_CNAME)),
            sonar_enabled,
        }],
        enabled: true,
    })?;

    writeln!(
        out,
        "Created application '{}' (id {})",
        application.name, application.id
    )?;
    Ok(Outcome::Continue)
}

pub fn handle_create_zone(
    session: &mut Session,
    cmd: &Command,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let zone_file = match cmd.arg(ARG_ZONE_FILE).filter(|f| !f.is_empty()) {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    let zone = session.catalog.borrow_mut().create_zone(Zone {
        id: 0,
        domain_name: required_name(cmd)?.to_string(),
        description: optional(cmd.arg(ARG_DESCRIPTION)),
        tags: split_list(cmd.arg_or_empty(ARG_TAGS)),
        zone_file,
    })?;

    writeln!(
        out,
        "Created zone '{}' (id {}, {} records)",
        zone.domain_name,
        zone.id,
        zone.record_count()
    )?;
    Ok(Outcome::Continue)
}

pub fn handle_list(session: &mut Session, cmd: &Command, out: &mut dyn Write) -> Result<Outcome> {
    let filter = cmd.arg_or_empty(ARG_FILTER);
    let mut catalog = session.catalog.borrow_mut();

    let table = match cmd.code {
        CommandCode::ListCommunityPlatforms | CommandCode::ListPrivatePlatforms => {
            let scope = if cmd.code == CommandCode::ListCommunityPlatforms {
                PlatformScope::Community
            } else {
                PlatformScope::Private
            };
            let everything = catalog.platforms(PlatformScope::All)?;
            let platforms = filter_by_name(catalog.platforms(scope)?, filter)?;
            platforms_table(&platforms, &everything)
        }
        CommandCode::ListAlerts => {
            let everything = catalog.platforms(PlatformScope::All)?;
            let alerts = filter_by_name(catalog.alerts()?, filter)?;
            alerts_table(&alerts, &everything)
        }
        CommandCode::ListApplications => {
            applications_table(&filter_by_name(catalog.applications()?, filter)?)
        }
        CommandCode::ListZones => zones_table(&filter_by_name(catalog.zones()?, filter)?),
        other => return Err(unrecognized(other)),
    };

    table.print(out, session.table_width)?;
    Ok(Outcome::Continue)
}

pub fn handle_show(session: &mut Session, cmd: &Command, out: &mut dyn Write) -> Result<Outcome> {
    let name = cmd.arg_or_empty(ARG_NAME);
    let mut catalog = session.catalog.borrow_mut();

    let json = match cmd.code {
        CommandCode::ShowPlatform => {
            serde_json::to_string_pretty(&catalog.platform_by_name(name, PlatformScope::All)?)?
        }
        CommandCode::ShowAlert => serde_json::to_string_pretty(&catalog.alert_by_name(name)?)?,
        CommandCode::ShowApplication => {
            serde_json::to_string_pretty(&catalog.application_by_name(name)?)?
        }
        CommandCode::ShowZone => serde_json::to_string_pretty(&catalog.zone_by_name(name)?)?,
        other => return Err(unrecognized(other)),
    };

    writeln!(out, "{json}")?;
    Ok(Outcome::Continue)
}

pub fn handle_delete(session: &mut Session, cmd: &Command, out: &mut dyn Write) -> Result<Outcome> {
    let kind = match cmd.code {
        CommandCode::DeletePlatform => ResourceKind::Platform,
        CommandCode::DeleteAlert => ResourceKind::Alert,
        CommandCode::DeleteApplication => ResourceKind::Application,
        CommandCode::DeleteZone => ResourceKind::Zone,
        other => return Err(unrecognized(other)),
    };

    let mut catalog = session.catalog.borrow_mut();
    let name = cmd.arg_or_empty(ARG_NAME);
    let filter = cmd.arg_or_empty(ARG_FILTER);

    let names: Vec<String> = if !name.is_empty() {
        vec![name.to_string()]
    } else if !filter.is_empty() {
        match kind {
            ResourceKind::Platform => names_of(filter_by_name(
                catalog.platforms(PlatformScope::Private)?,
                filter,
            )?),
            ResourceKind::Alert => names_of(filter_by_name(catalog.alerts()?, filter)?),
            ResourceKind::Application => {
                names_of(filter_by_name(catalog.applications()?, filter)?)
            }
            ResourceKind::Zone => names_of(filter_by_name(catalog.zones()?, filter)?),
        }
    } else {
        return Err(ShellError::Usage(format!(
            "no {kind} specified by name or by filter"
        )));
    };

    for name in &names {
        match kind {
            ResourceKind::Platform => catalog.delete_platform(name)?,
            ResourceKind::Alert => catalog.delete_alert(name)?,
            ResourceKind::Application => catalog.delete_application(name)?,
            ResourceKind::Zone => catalog.delete_zone(name)?,
        }
        tracing::debug!(%kind, name = %name, "deleted");
    }

    writeln!(out, "Deleted {} {kind}(s)", names.len())?;
    Ok(Outcome::Continue)
}

fn names_of<T: Resource>(items: Vec<T>) -> Vec<String> {
    items.iter().map(|item| item.name().to_string()).collect()
}

fn unrecognized(code: CommandCode) -> ShellError {
    ShellError::Usage(format!("unrecognized command: {code:?}"))
}

fn platform_name(platforms: &[Platform], id: u64) -> String {
    platforms
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

fn platforms_table(platforms: &[Platform], everything: &[Platform]) -> Table {
    let mut table = Table::new(&["Name", "ID", "Category", "Alias"]);
    for p in platforms {
        let alias = p
            .archetype
            .map(|id| platform_name(everything, id))
            .unwrap_or_default();
        table.push_row(vec![p.name.clone(), p.id.to_string(), p.category.to_string(), alias]);
    }
    table
}

fn alerts_table(alerts: &[Alert], platforms: &[Platform]) -> Table {
    let mut table = Table::new(&["Name", "Enabled", "Platform"]);
    for a in alerts {
        table.push_row(vec![
            a.name.clone(),
            a.enabled.to_string(),
            platform_name(platforms, a.platform),
        ]);
    }
    table
}

fn applications_table(applications: &[Application]) -> Table {
    let mut table = Table::new(&["Name", "Enabled", "CNAME"]);
    for a in applications {
        table.push_row(vec![
            a.name.clone(),
            a.enabled.to_string(),
            a.cname.clone().unwrap_or_default(),
        ]);
    }
    table
}

fn zones_table(zones: &[Zone]) -> Table {
    let mut table = Table::new(&["Domain", "Records", "Description"]);
    for z in zones {
        table.push_row(vec![
            z.domain_name.clone(),
            z.record_count().to_string(),
            z.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

fn optional(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}

/// The resource name, which may not be an explicit `""`.
fn required_name(cmd: &Command) -> Result<&str> {
    cmd.arg(ARG_NAME)
        .filter(|n| !n.trim().is_empty())
        .ok_or(ShellError::MissingArgument(ARG_NAME))
}

fn parse_bool(name: &'static str, value: &str) -> Result<Option<bool>> {
    match value.to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "t" | "true" => Ok(Some(true)),
        "0" | "f" | "false" => Ok(Some(false)),
        _ => Err(ShellError::InvalidArgument {
            name,
            value: value.to_string(),
        }),
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ShellError::InvalidArgument {
            name,
            value: value.to_string(),
        })
}

fn parse_url(name: &'static str, value: &str) -> Result<Option<String>> {
    if value.is_empty() {
        return Ok(None);
    }
    let invalid = || ShellError::InvalidArgument {
        name,
        value: value.to_string(),
    };
    let parsed = Url::parse(value).map_err(|e| {
        tracing::debug!(value, error = %e, "rejected url");
        invalid()
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => {
            Ok(Some(value.to_string()))
        }
        _ => Err(invalid()),
    }
}

fn parse_sonar(cmd: &Command) -> Result<SonarConfig> {
    let arg = |name| cmd.arg_or_empty(name);
    let market = match arg(ARG_SONAR_MARKET) {
        "" => None,
        code => Some(code.parse::<Market>()?),
    };

    let mut sonar = SonarConfig {
        enabled: parse_bool(ARG_SONAR_ENABLED, arg(ARG_SONAR_ENABLED))?,
        url: parse_url(ARG_SONAR_URL, arg(ARG_SONAR_URL))?,
        poll_interval_seconds: parse_number(
            ARG_SONAR_POLL_INTERVAL,
            arg(ARG_SONAR_POLL_INTERVAL),
        )?,
        timeout_seconds: parse_number(ARG_SONAR_TIMEOUT, arg(ARG_SONAR_TIMEOUT))?,
        method: optional(cmd.arg(ARG_SONAR_METHOD)).map(|m| m.to_ascii_uppercase()),
        ignore_ssl_errors: parse_bool(
            ARG_SONAR_IGNORE_SSL_ERRORS,
            arg(ARG_SONAR_IGNORE_SSL_ERRORS),
        )?,
        maintenance_mode: parse_bool(
            ARG_SONAR_MAINTENANCE_MODE,
            arg(ARG_SONAR_MAINTENANCE_MODE),
        )?,
        host: optional(cmd.arg(ARG_SONAR_HOST)),
        market,
        request_content_type: optional(cmd.arg(ARG_SONAR_REQUEST_CONTENT_TYPE)),
        response_body_match: optional(cmd.arg(ARG_SONAR_RESPONSE_BODY_MATCH)),
        response_match_type: optional(cmd.arg(ARG_SONAR_RESPONSE_MATCH_TYPE)),
    };

    if sonar != SonarConfig::default() && sonar.method.is_none() {
        sonar.method = Some("GET".to_string());
    }
    Ok(sonar)
}
