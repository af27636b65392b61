//! Package catalog loading and filtering
//!
//! The catalog is an ordered JSON list of package descriptors read once at
//! startup (and again on explicit refresh). Loading fails soft: a missing or
//! malformed source logs a warning and yields the built-in default catalog,
//! so the application always has something to show.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Static record describing one installable package and its shell commands.
///
/// Immutable after load. `name` is not required to be unique in the source;
/// lookups treat it as a de-facto key and resolve to the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub description: String,
    /// Icon URI, carried as data for the presentation layer; never fetched here.
    pub icon: String,
    pub install_command: String,
    pub remove_command: String,
    /// Not every catalog entry supports in-place update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_command: Option<String>,
    pub check_command: String,
}

/// Load the catalog from `path`, falling back to [`default_catalog`] on any
/// failure. Never returns an error past this boundary.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Vec<PackageDescriptor> {
    let path = path.as_ref();
    match read_catalog(path) {
        Ok(catalog) => {
            debug!(path = %path.display(), packages = catalog.len(), "catalog loaded");
            catalog
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "falling back to the built-in catalog"
            );
            default_catalog()
        }
    }
}

/// Strict variant of [`load_catalog`]: parse and validate, no fallback.
pub fn read_catalog(path: &Path) -> Result<Vec<PackageDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog from {:?}", path))?;

    let catalog: Vec<PackageDescriptor> =
        serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

    for (index, descriptor) in catalog.iter().enumerate() {
        if descriptor.name.trim().is_empty() {
            anyhow::bail!("Catalog entry {} has an empty name", index);
        }
    }

    Ok(catalog)
}

/// The built-in catalog used when no usable source is present.
pub fn default_catalog() -> Vec<PackageDescriptor> {
    vec![
        PackageDescriptor {
            name: "GIMP".to_string(),
            description: "Powerful image editor.".to_string(),
            icon: "https://www.gimp.org/images/frontpage/wilber-big.png".to_string(),
            install_command: "sudo zypper install -y gimp".to_string(),
            remove_command: "sudo zypper remove -y gimp".to_string(),
            update_command: Some("sudo zypper update -y gimp".to_string()),
            check_command: "zypper se -i gimp".to_string(),
        },
        PackageDescriptor {
            name: "VLC".to_string(),
            description: "Multimedia player.".to_string(),
            icon: "https://www.videolan.org/images/logo.png".to_string(),
            install_command: "sudo zypper install -y vlc".to_string(),
            remove_command: "sudo zypper remove -y vlc".to_string(),
            update_command: Some("sudo zypper update -y vlc".to_string()),
            check_command: "zypper se -i vlc".to_string(),
        },
    ]
}

impl PackageDescriptor {
    /// Case-insensitive substring match against name or description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Filter the catalog by a search query, preserving order.
///
/// An empty query returns the full catalog.
pub fn filter<'a>(catalog: &'a [PackageDescriptor], query: &str) -> Vec<&'a PackageDescriptor> {
    if query.is_empty() {
        return catalog.iter().collect();
    }
    catalog.iter().filter(|pkg| pkg.matches(query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn descriptor(name: &str, description: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            icon: String::new(),
            install_command: "true".to_string(),
            remove_command: "true".to_string(),
            update_command: None,
            check_command: "true".to_string(),
        }
    }

    #[test]
    fn test_load_valid_catalog() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"[{
                    "name": "Firefox",
                    "description": "Web browser.",
                    "icon": "https://example.org/firefox.png",
                    "install_command": "sudo zypper install -y firefox",
                    "remove_command": "sudo zypper remove -y firefox",
                    "check_command": "zypper se -i firefox"
                }]"#,
            )
            .unwrap();
        temp_file.flush().unwrap();

        let catalog = load_catalog(temp_file.path());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "Firefox");
        assert_eq!(catalog[0].update_command, None);
    }

    #[test]
    fn test_load_catalog_with_update_command() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"[{
                    "name": "Firefox",
                    "description": "Web browser.",
                    "icon": "",
                    "install_command": "install",
                    "remove_command": "remove",
                    "update_command": "update",
                    "check_command": "check"
                }]"#,
            )
            .unwrap();
        temp_file.flush().unwrap();

        let catalog = load_catalog(temp_file.path());
        assert_eq!(catalog[0].update_command.as_deref(), Some("update"));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let catalog = load_catalog("/nonexistent/packages.json");
        assert_eq!(catalog, default_catalog());
    }

    #[test]
    fn test_malformed_json_falls_back_to_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ not json ]").unwrap();
        temp_file.flush().unwrap();

        let catalog = load_catalog(temp_file.path());
        assert_eq!(catalog, default_catalog());
    }

    #[test]
    fn test_missing_required_field_falls_back_to_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        // No install_command
        temp_file
            .write_all(br#"[{"name": "x", "description": "", "icon": "", "remove_command": "", "check_command": ""}]"#)
            .unwrap();
        temp_file.flush().unwrap();

        let catalog = load_catalog(temp_file.path());
        assert_eq!(catalog, default_catalog());
    }

    #[test]
    fn test_empty_name_falls_back_to_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"[{
                    "name": "  ",
                    "description": "",
                    "icon": "",
                    "install_command": "i",
                    "remove_command": "r",
                    "check_command": "c"
                }]"#,
            )
            .unwrap();
        temp_file.flush().unwrap();

        let catalog = load_catalog(temp_file.path());
        assert_eq!(catalog, default_catalog());
    }

    #[test]
    fn test_read_catalog_reports_cause() {
        let err = read_catalog(Path::new("/nonexistent/packages.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog"));
    }

    #[test]
    fn test_default_catalog_is_well_formed() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());
        for pkg in &catalog {
            assert!(!pkg.name.trim().is_empty());
            assert!(!pkg.install_command.is_empty());
            assert!(!pkg.remove_command.is_empty());
            assert!(!pkg.check_command.is_empty());
        }
    }

    #[test]
    fn test_filter_empty_query_returns_all_in_order() {
        let catalog = vec![
            descriptor("GIMP", "Image editor"),
            descriptor("VLC", "Media player"),
        ];
        let result = filter(&catalog, "");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "GIMP");
        assert_eq!(result[1].name, "VLC");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let catalog = vec![
            descriptor("GIMP", "Image editor"),
            descriptor("VLC", "Media player"),
        ];
        let result = filter(&catalog, "vlc");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "VLC");
    }

    #[test]
    fn test_filter_matches_description() {
        let catalog = vec![
            descriptor("GIMP", "Image editor"),
            descriptor("VLC", "Media player"),
        ];
        let result = filter(&catalog, "PLAYER");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "VLC");
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let catalog = vec![descriptor("GIMP", "Image editor")];
        assert!(filter(&catalog, "spreadsheet").is_empty());
    }

    #[test]
    fn test_descriptor_roundtrip_preserves_optional_update() {
        let pkg = descriptor("GIMP", "Image editor");
        let json = serde_json::to_string(&pkg).unwrap();
        assert!(!json.contains("update_command"));
        let back: PackageDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pkg);
    }
}
