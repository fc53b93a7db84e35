//! The shell's command table.
//!
//! Commands have the shape `verb object [variant] <positional>... -named value...`,
//! for example `create platform cloud "West Edge" -region "Azure - West Europe"`.

use std::cell::RefCell;
use std::rc::Rc;

use traffic_shell_core::{
    CommandFragment, CommandSpec, NamedArg, PositionalArg, Suggestion, filter_contains,
    filter_has_prefix,
};
use traffic_shell_db::{
    ApplicationType, Catalog, FileStore, PlatformCategory, PlatformScope, Resource,
};

use crate::handlers::{self, Handler};

/// Shared, cached view of the resource store.
pub type SharedCatalog = Rc<RefCell<Catalog<FileStore>>>;

/// The shell's command tree.
pub type ShellSpec = CommandSpec<CommandCode, Handler>;

/// Every complete command the shell understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    CreateCloudPlatform,
    CreateAlert,
    CreateApplication,
    CreateZone,
    ListCommunityPlatforms,
    ListPrivatePlatforms,
    ListAlerts,
    ListApplications,
    ListZones,
    ShowPlatform,
    ShowAlert,
    ShowApplication,
    ShowZone,
    DeletePlatform,
    DeleteAlert,
    DeleteApplication,
    DeleteZone,
    Help,
    Exit,
}

pub const ARG_NAME: &str = "name";
pub const ARG_DESCRIPTION: &str = "description";
pub const ARG_SHORT_NAME: &str = "shortName";
pub const ARG_REGION: &str = "region";
pub const ARG_TAGS: &str = "tags";
pub const ARG_FORCE: &str = "force";
pub const ARG_FILTER: &str = "filter";
pub const ARG_TYPE: &str = "type";
pub const ARG_PLATFORM: &str = "platform";
pub const ARG_CHANGE: &str = "change";
pub const ARG_TIMING: &str = "timing";
pub const ARG_EMAILS: &str = "emails";
pub const ARG_INTERVAL: &str = "interval";
pub const ARG_FALLBACK_CNAME: &str = "fallbackCname";
pub const ARG_AVAILABILITY_THRESHOLD: &str = "availabilityThreshold";
pub const ARG_TARGET_PLATFORM: &str = "targetPlatform";
pub const ARG_TARGET_CNAME: &str = "targetCname";
pub const ARG_ZONE_FILE: &str = "zoneFile";
pub const ARG_SONAR_ENABLED: &str = "sonarEnabled";
pub const ARG_SONAR_URL: &str = "sonarUrl";
pub const ARG_SONAR_POLL_INTERVAL: &str = "sonarPollInterval";
pub const ARG_SONAR_TIMEOUT: &str = "sonarTimeout";
pub const ARG_SONAR_METHOD: &str = "sonarMethod";
pub const ARG_SONAR_IGNORE_SSL_ERRORS: &str = "sonarIgnoreSslErrors";
pub const ARG_SONAR_MAINTENANCE_MODE: &str = "sonarMaintenanceMode";
pub const ARG_SONAR_HOST: &str = "sonarHost";
pub const ARG_SONAR_MARKET: &str = "sonarMarket";
pub const ARG_SONAR_REQUEST_CONTENT_TYPE: &str = "sonarRequestContentType";
pub const ARG_SONAR_RESPONSE_BODY_MATCH: &str = "sonarResponseBodyMatch";
pub const ARG_SONAR_RESPONSE_MATCH_TYPE: &str = "sonarResponseMatchType";

const MARKETS: [(&str, &str); 8] = [
    ("GL", "Global"),
    ("AF", "Africa"),
    ("AS", "Asia"),
    ("EU", "Europe"),
    ("NA", "North America"),
    ("OC", "Oceania"),
    ("SA", "South America"),
    ("XX", "Unknown"),
];

/// Builds the command tree, with name completion served from `catalog`.
pub fn build_spec(catalog: &SharedCatalog) -> ShellSpec {
    CommandSpec::new()
        .with_command("create", create_command(catalog))
        .with_command("list", list_command())
        .with_command("show", show_command(catalog))
        .with_command("delete", delete_command(catalog))
        .with_command(
            "help",
            CommandFragment::new("List available commands")
                .with_code(CommandCode::Help)
                .with_handler(Handler(handlers::handle_help)),
        )
        .with_command(
            "exit",
            CommandFragment::new("Exit")
                .with_code(CommandCode::Exit)
                .with_handler(Handler(handlers::handle_exit)),
        )
}

fn create_command(catalog: &SharedCatalog) -> CommandFragment<CommandCode, Handler> {
    let cloud_regions = platform_names(
        catalog,
        PlatformScope::Community,
        Some(PlatformCategory::CloudComputing),
    );
    let cloud = CommandFragment::new("New private platform measured against a public cloud")
        .with_code(CommandCode::CreateCloudPlatform)
        .with_handler(Handler(handlers::handle_create_platform))
        .with_positional(PositionalArg::required(ARG_NAME, "Name of platform"))
        .with_named(ARG_SHORT_NAME, NamedArg::value("Set the short name"))
        .with_named(
            ARG_REGION,
            NamedArg::value("Set the public cloud region").with_suggest(cloud_regions),
        )
        .with_named(ARG_TAGS, NamedArg::value("Comma-separated tags"))
        .with_named(
            ARG_FORCE,
            NamedArg::flag("Replace a private platform with the same name"),
        )
        .with_named(
            ARG_SONAR_ENABLED,
            NamedArg::value("Enable health checks (true/false)").with_suggest(booleans),
        )
        .with_named(ARG_SONAR_URL, NamedArg::value("Health check URL"))
        .with_named(
            ARG_SONAR_POLL_INTERVAL,
            NamedArg::value("Seconds between health checks"),
        )
        .with_named(
            ARG_SONAR_TIMEOUT,
            NamedArg::value("Health check timeout in seconds"),
        )
        .with_named(
            ARG_SONAR_METHOD,
            NamedArg::value("HTTP method (default GET)").with_suggest(http_methods),
        )
        .with_named(
            ARG_SONAR_IGNORE_SSL_ERRORS,
            NamedArg::value("Ignore TLS errors (true/false)").with_suggest(booleans),
        )
        .with_named(
            ARG_SONAR_MAINTENANCE_MODE,
            NamedArg::value("Maintenance mode (true/false)").with_suggest(booleans),
        )
        .with_named(ARG_SONAR_HOST, NamedArg::value("Host header for health checks"))
        .with_named(
            ARG_SONAR_MARKET,
            NamedArg::value("Market the checks run from").with_suggest(markets),
        )
        .with_named(
            ARG_SONAR_REQUEST_CONTENT_TYPE,
            NamedArg::value("Request content type"),
        )
        .with_named(
            ARG_SONAR_RESPONSE_BODY_MATCH,
            NamedArg::value("Expected response body"),
        )
        .with_named(
            ARG_SONAR_RESPONSE_MATCH_TYPE,
            NamedArg::value("How the body is matched"),
        );

    let alert = CommandFragment::new("Create a health alert")
        .with_code(CommandCode::CreateAlert)
        .with_handler(Handler(handlers::handle_create_alert))
        .with_positional(PositionalArg::required(ARG_NAME, "Name of alert"))
        .with_named(
            ARG_TYPE,
            NamedArg::value("Alert type").with_suggest(fixed(&[("sonar", "Health check alert")])),
        )
        .with_named(
            ARG_PLATFORM,
            NamedArg::value("Private platform to watch")
                .with_suggest(platform_names(catalog, PlatformScope::Private, None)),
        )
        .with_named(
            ARG_CHANGE,
            NamedArg::value("Which transitions alert").with_suggest(fixed(&[
                ("any", "Any change"),
                ("down", "Platform goes down"),
                ("up", "Platform comes back up"),
            ])),
        )
        .with_named(
            ARG_TIMING,
            NamedArg::value("When to alert").with_suggest(fixed(&[("immediate", "Immediately")])),
        )
        .with_named(ARG_EMAILS, NamedArg::value("Comma-separated recipients"))
        .with_named(
            ARG_INTERVAL,
            NamedArg::value("Minutes between repeats (default 5)"),
        );

    let application = CommandFragment::new("Create a traffic-steering application")
        .with_code(CommandCode::CreateApplication)
        .with_handler(Handler(handlers::handle_create_application))
        .with_positional(PositionalArg::required(ARG_NAME, "Name of application"))
        .with_named(
            ARG_TYPE,
            NamedArg::value("Application type").with_suggest(application_types),
        )
        .with_named(
            ARG_FALLBACK_CNAME,
            NamedArg::value("CNAME used when no platform is available"),
        )
        .with_named(
            ARG_AVAILABILITY_THRESHOLD,
            NamedArg::value("Minimum availability percentage"),
        )
        .with_named(
            ARG_TARGET_PLATFORM,
            NamedArg::value("Platform receiving traffic")
                .with_suggest(platform_names(catalog, PlatformScope::All, None)),
        )
        .with_named(ARG_TARGET_CNAME, NamedArg::value("CNAME of the target platform"))
        .with_named(
            ARG_SONAR_ENABLED,
            NamedArg::value("Use health checks (default true)").with_suggest(booleans),
        );

    let zone = CommandFragment::new("Create a DNS zone")
        .with_code(CommandCode::CreateZone)
        .with_handler(Handler(handlers::handle_create_zone))
        .with_positional(PositionalArg::required(ARG_NAME, "Domain name"))
        .with_named(ARG_TAGS, NamedArg::value("Comma-separated tags"))
        .with_named(ARG_ZONE_FILE, NamedArg::value("BIND zone file to import"));

    CommandFragment::new("Creates platforms, alerts, applications and zones")
        .with_named(ARG_DESCRIPTION, NamedArg::value("Set the description"))
        .with_sub(
            "platform",
            CommandFragment::new("Create a new platform").with_sub("cloud", cloud),
        )
        .with_sub("alert", alert)
        .with_sub("application", application)
        .with_sub("zone", zone)
}

fn list_command() -> CommandFragment<CommandCode, Handler> {
    CommandFragment::new("List platforms, alerts, applications and zones")
        .with_handler(Handler(handlers::handle_list))
        .with_named(ARG_FILTER, NamedArg::value("Regex filter on names"))
        .with_sub(
            "platform",
            CommandFragment::new("List platforms")
                .with_sub(
                    "community",
                    CommandFragment::new("List community platforms")
                        .with_code(CommandCode::ListCommunityPlatforms),
                )
                .with_sub(
                    "private",
                    CommandFragment::new("List private platforms")
                        .with_code(CommandCode::ListPrivatePlatforms),
                ),
        )
        .with_sub("alert", CommandFragment::new("List alerts").with_code(CommandCode::ListAlerts))
        .with_sub(
            "application",
            CommandFragment::new("List applications").with_code(CommandCode::ListApplications),
        )
        .with_sub("zone", CommandFragment::new("List DNS zones").with_code(CommandCode::ListZones))
}

fn show_command(catalog: &SharedCatalog) -> CommandFragment<CommandCode, Handler> {
    let name = |subject: &str, provider: NameProvider| {
        PositionalArg::required(ARG_NAME, subject).with_suggest(provider)
    };

    CommandFragment::new("Show one resource as JSON")
        .with_handler(Handler(handlers::handle_show))
        .with_sub(
            "platform",
            CommandFragment::new("Show a platform")
                .with_code(CommandCode::ShowPlatform)
                .with_positional(name(
                    "Name of platform",
                    platform_names(catalog, PlatformScope::All, None),
                )),
        )
        .with_sub(
            "alert",
            CommandFragment::new("Show an alert")
                .with_code(CommandCode::ShowAlert)
                .with_positional(name("Name of alert", alert_names(catalog))),
        )
        .with_sub(
            "application",
            CommandFragment::new("Show an application")
                .with_code(CommandCode::ShowApplication)
                .with_positional(name("Name of application", application_names(catalog))),
        )
        .with_sub(
            "zone",
            CommandFragment::new("Show a DNS zone")
                .with_code(CommandCode::ShowZone)
                .with_positional(name("Domain name", zone_names(catalog))),
        )
}

fn delete_command(catalog: &SharedCatalog) -> CommandFragment<CommandCode, Handler> {
    let name = |subject: &str, provider: NameProvider| {
        PositionalArg::optional(ARG_NAME, subject).with_suggest(provider)
    };

    CommandFragment::new("Delete resources by name or by filter")
        .with_handler(Handler(handlers::handle_delete))
        .with_named(
            ARG_FILTER,
            NamedArg::value("Delete everything whose name matches this regex"),
        )
        .with_sub(
            "platform",
            CommandFragment::new("Delete private platforms")
                .with_code(CommandCode::DeletePlatform)
                .with_positional(name(
                    "Name of platform",
                    platform_names(catalog, PlatformScope::Private, None),
                )),
        )
        .with_sub(
            "alert",
            CommandFragment::new("Delete alerts")
                .with_code(CommandCode::DeleteAlert)
                .with_positional(name("Name of alert", alert_names(catalog))),
        )
        .with_sub(
            "application",
            CommandFragment::new("Delete applications")
                .with_code(CommandCode::DeleteApplication)
                .with_positional(name("Name of application", application_names(catalog))),
        )
        .with_sub(
            "zone",
            CommandFragment::new("Delete DNS zones")
                .with_code(CommandCode::DeleteZone)
                .with_positional(name("Domain name", zone_names(catalog))),
        )
}

type NameProvider = Box<dyn Fn(&str) -> Vec<Suggestion>>;

fn platform_names(
    catalog: &SharedCatalog,
    scope: PlatformScope,
    category: Option<PlatformCategory>,
) -> NameProvider {
    let catalog = Rc::clone(catalog);
    Box::new(move |partial: &str| {
        let Ok(mut catalog) = catalog.try_borrow_mut() else {
            return Vec::new();
        };
        match catalog.platforms(scope) {
            Ok(platforms) => {
                let names = platforms
                    .iter()
                    .filter(|p| category.is_none_or(|c| p.category == c))
                    .map(|p| Suggestion::quoted(&p.name, p.category.to_string()));
                filter_contains(names, partial, true)
            }
            Err(e) => {
                tracing::debug!(error = %e, "platform completion unavailable");
                Vec::new()
            }
        }
    })
}

fn names_of<T: Resource>(items: &[T], partial: &str) -> Vec<Suggestion> {
    let names = items
        .iter()
        .map(|item| Suggestion::quoted(item.name(), T::KIND.to_string()));
    filter_contains(names, partial, true)
}

fn alert_names(catalog: &SharedCatalog) -> NameProvider {
    let catalog = Rc::clone(catalog);
    Box::new(move |partial: &str| {
        let Ok(mut catalog) = catalog.try_borrow_mut() else {
            return Vec::new();
        };
        catalog
            .alerts()
            .map(|alerts| names_of(&alerts, partial))
            .unwrap_or_default()
    })
}

fn application_names(catalog: &SharedCatalog) -> NameProvider {
    let catalog = Rc::clone(catalog);
    Box::new(move |partial: &str| {
        let Ok(mut catalog) = catalog.try_borrow_mut() else {
            return Vec::new();
        };
        catalog
            .applications()
            .map(|apps| names_of(&apps, partial))
            .unwrap_or_default()
    })
}

fn zone_names(catalog: &SharedCatalog) -> NameProvider {
    let catalog = Rc::clone(catalog);
    Box::new(move |partial: &str| {
        let Ok(mut catalog) = catalog.try_borrow_mut() else {
            return Vec::new();
        };
        catalog
            .zones()
            .map(|zones| names_of(&zones, partial))
            .unwrap_or_default()
    })
}

fn fixed(values: &'static [(&'static str, &'static str)]) -> NameProvider {
    Box::new(move |partial: &str| {
        let all = values.iter().map(|(text, desc)| Suggestion::new(*text, *desc));
        filter_has_prefix(all, partial, true)
    })
}

fn booleans(partial: &str) -> Vec<Suggestion> {
    let all = [Suggestion::new("true", ""), Suggestion::new("false", "")];
    filter_has_prefix(all, partial, true)
}

fn http_methods(partial: &str) -> Vec<Suggestion> {
    let all = ["GET", "HEAD", "POST"].map(|m| Suggestion::new(m, ""));
    filter_has_prefix(all, partial, true)
}

fn markets(partial: &str) -> Vec<Suggestion> {
    let all = MARKETS.map(|(code, name)| Suggestion::new(code, name));
    filter_has_prefix(all, partial, true)
}

fn application_types(partial: &str) -> Vec<Suggestion> {
    let all = ApplicationType::NAMES.map(|name| Suggestion::new(name, ""));
    filter_has_prefix(all, partial, true)
}
