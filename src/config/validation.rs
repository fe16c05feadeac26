//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Cross-site checks: every alias maps to exactly one site
//! - Validate value ranges (timeouts > 0, pool sizes > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the parsed config

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use crate::config::schema::{ServerConfig, SiteConfig};
use crate::models::ControllerKind;
use crate::tenancy::normalize_host;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field}: `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("site `{site}` has no aliases")]
    NoAliases { site: String },

    #[error("site `{site}` has a blank alias")]
    BlankAlias { site: String },

    #[error("alias `{alias}` is claimed by both `{first}` and `{second}`")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("site id `{site}` is used more than once")]
    DuplicateSite { site: String },

    #[error("site `{site}` not-found path `{path}` must start with `/`")]
    RelativeNotFoundPath { site: String, path: String },

    #[error("site `{site}` allows unknown element controller `{kind}`")]
    UnknownElementController { site: String, kind: String },

    #[error("site `{site}` maps `{token}` to unregistered controller `{target}`")]
    UnknownControllerAlias {
        site: String,
        token: String,
        target: String,
    },
}

pub fn validate_server_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs".to_string(),
        });
    }
    if config.store.max_connections == 0 {
        errors.push(ValidationError::Zero {
            field: "store.max_connections".to_string(),
        });
    }
    if config.sessions.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "sessions.sweep_interval_secs".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the full set of sites. `controllers` lists the registered
/// controller tokens that site aliases may point at.
pub fn validate_sites(sites: &[SiteConfig], controllers: &[&str]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut alias_owner: HashMap<String, &str> = HashMap::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for site in sites {
        let id = site.id.as_str();
        if !seen_ids.insert(id) {
            errors.push(ValidationError::DuplicateSite { site: id.to_string() });
        }

        if site.aliases.is_empty() {
            errors.push(ValidationError::NoAliases { site: id.to_string() });
        }
        for alias in &site.aliases {
            let alias = normalize_host(alias);
            if alias.is_empty() {
                errors.push(ValidationError::BlankAlias { site: id.to_string() });
                continue;
            }
            if let Some(first) = alias_owner.get(&alias) {
                if *first != id {
                    errors.push(ValidationError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.to_string(),
                        second: id.to_string(),
                    });
                }
                continue;
            }
            alias_owner.insert(alias, id);
        }

        if !site.not_found_path.starts_with('/') {
            errors.push(ValidationError::RelativeNotFoundPath {
                site: id.to_string(),
                path: site.not_found_path.clone(),
            });
        }

        for kind in &site.element_controllers {
            if kind.parse::<ControllerKind>().is_err() {
                errors.push(ValidationError::UnknownElementController {
                    site: id.to_string(),
                    kind: kind.clone(),
                });
            }
        }

        for (token, target) in &site.controller_aliases {
            if !controllers.contains(&target.as_str()) {
                errors.push(ValidationError::UnknownControllerAlias {
                    site: id.to_string(),
                    token: token.clone(),
                    target: target.clone(),
                });
            }
        }

        if site.store.max_connections == Some(0) {
            errors.push(ValidationError::Zero {
                field: format!("{id}.store.max_connections"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, aliases: &[&str]) -> SiteConfig {
        SiteConfig {
            id: id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_default_server_config_is_valid() {
        assert!(validate_server_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_server_config_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.timeouts.request_secs = 0;
        config.store.max_connections = 0;
        config.sessions.sweep_interval_secs = 0;
        let errors = validate_server_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_sites_need_aliases() {
        let errors = validate_sites(&[site("empty", &[])], &[]).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoAliases { site: "empty".into() }]);
    }

    #[test]
    fn test_alias_claimed_twice() {
        let sites = [site("a", &["one.test"]), site("b", &["ONE.test", "two.test"])];
        let errors = validate_sites(&sites, &[]).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateAlias {
                alias: "one.test".into(),
                first: "a".into(),
                second: "b".into(),
            }]
        );
    }

    #[test]
    fn test_aliases_compared_as_hosts() {
        // Repeats within one site are harmless.
        let sites = [site("blog", &["blog.test", "Blog.Test", "blog.test."])];
        assert!(validate_sites(&sites, &[]).is_ok());

        let sites = [site("a", &["one.test"]), site("b", &["one.test:80"])];
        let errors = validate_sites(&sites, &[]).unwrap_err();
        assert!(matches!(
            &errors[..],
            [ValidationError::DuplicateAlias { alias, .. }] if alias == "one.test"
        ));
    }

    #[test]
    fn test_site_field_checks() {
        let mut bad = site("bad", &["bad.test", " "]);
        bad.not_found_path = "404".into();
        bad.element_controllers.push("menu".into());
        bad.controller_aliases.insert("page".into(), "pages".into());
        let errors = validate_sites(&[bad], &["paths"]).unwrap_err();
        assert_eq!(errors.len(), 4);

        let mut good = site("good", &["good.test"]);
        good.controller_aliases.insert("page".into(), "paths".into());
        assert!(validate_sites(&[good], &["paths"]).is_ok());
    }
}
