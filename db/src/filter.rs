//! Regex filtering for `-filter` arguments.

use regex::Regex;

use crate::error::Result;
use crate::models::Resource;

/// Keeps the items whose name matches `pattern` anywhere.
///
/// An empty pattern keeps everything.
///
/// # Errors
///
/// Returns [`InvalidFilter`](crate::DbError::InvalidFilter) if `pattern` is
/// not a valid regular expression.
///
/// # Examples
///
/// ```
/// use traffic_shell_db::{filter_by_name, FileStore, PlatformScope, TrafficApi};
///
/// let platforms = FileStore::seeded().platforms(PlatformScope::Community).unwrap();
/// let amazon = filter_by_name(platforms, "^Amazon").unwrap();
/// assert!(amazon.iter().all(|p| p.name.starts_with("Amazon")));
/// assert!(filter_by_name(amazon, "(").is_err());
/// ```
pub fn filter_by_name<T: Resource>(items: Vec<T>, pattern: &str) -> Result<Vec<T>> {
    if pattern.is_empty() {
        return Ok(items);
    }
    let re = Regex::new(pattern)?;
    Ok(items
        .into_iter()
        .filter(|item| re.is_match(item.name()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Zone;

    fn zones(names: &[&str]) -> Vec<Zone> {
        names
            .iter()
            .zip(1..)
            .map(|(name, id)| Zone {
                id,
                domain_name: name.to_string(),
                description: None,
                tags: Vec::new(),
                zone_file: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_pattern_keeps_all() {
        let all = zones(&["a.com", "b.org"]);
        assert_eq!(filter_by_name(all, "").unwrap().len(), 2);
    }

    #[test]
    fn test_unanchored_match() {
        let kept = filter_by_name(zones(&["a.com", "b.org", "com.net"]), r"\.com$").unwrap();
        let names: Vec<_> = kept.iter().map(|z| z.domain_name.as_str()).collect();
        assert_eq!(names, vec!["a.com"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = filter_by_name(zones(&["a"]), "[").unwrap_err();
        assert!(err.to_string().starts_with("invalid filter"));
    }
}
