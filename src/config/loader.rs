//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{ServerConfig, SiteConfig};
use crate::config::validation::{validate_server_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load and validate the server configuration from a TOML file.
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = read(path)?;
    let config: ServerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    validate_server_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load one site file. The id defaults to the file stem.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = read(path)?;
    let mut site: SiteConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    if site.id.is_empty() {
        site.id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(site)
}

/// Load every `*.toml` site file in `dir`, in file-name order.
///
/// Cross-site checks (alias collisions etc.) are left to
/// [`validate_sites`](crate::config::validation::validate_sites).
pub fn load_sites(dir: &Path) -> Result<Vec<SiteConfig>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();

    files
        .iter()
        .map(|path| {
            tracing::info!(file = %path.display(), "Found site configuration");
            load_site_config(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_server_config_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sites_directory = \"/srv/sites\"\n[listener]\nbind_address = \"127.0.0.1:9000\"").unwrap();

        let config = load_server_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.sites_directory, "/srv/sites");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.store.max_connections, 64);
    }

    #[test]
    fn test_load_server_config_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_secs = 0").unwrap();
        assert!(matches!(
            load_server_config(file.path()),
            Err(ConfigError::Validation(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listener = 3").unwrap();
        assert!(matches!(load_server_config(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_sites_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b-shop.toml"),
            "aliases = [\"shop.test\"]\n[public_values]\nphone = \"555\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a-blog.toml"),
            "id = \"blog\"\naliases = [\"blog.test\", \"www.blog.test\"]\nnot_found_path = \"/missing\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sites = load_sites(dir.path()).unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].id, "blog");
        assert_eq!(sites[0].not_found_path, "/missing");
        assert_eq!(sites[1].id, "b-shop");
        assert_eq!(sites[1].not_found_path, "/404");
        assert_eq!(sites[1].element_controllers.len(), 3);
        assert_eq!(sites[1].public_values.get("phone").map(String::as_str), Some("555"));
    }

    #[test]
    fn test_missing_directory() {
        let err = load_sites(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
