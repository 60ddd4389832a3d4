//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RewriterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::address::AbsoluteUrl;
use crate::config::schema::RewriterConfig;
use crate::registry::GLOBAL_DOMAIN_NAME;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &RewriterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let rewrite = &config.rewrite;
    if let Some(url) = &rewrite.global_domain {
        check_url(&mut errors, "rewrite.global_domain", url);
    }
    if let Some(url) = &rewrite.advanced_base_url {
        check_url(&mut errors, "rewrite.advanced_base_url", url);
    }
    if rewrite.cache_capacity == 0 {
        errors.push(ValidationError::new("rewrite.cache_capacity", "must be greater than 0"));
    }

    for (name, url) in &config.domains {
        let field = format!("domains.{name}");
        if name.trim().is_empty() {
            errors.push(ValidationError::new(&field, "domain name must not be blank"));
        }
        if name == GLOBAL_DOMAIN_NAME {
            errors.push(ValidationError::new(&field, "name is reserved for the global domain"));
        }
        check_url(&mut errors, &field, url);
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "required when admin is enabled"));
        }
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, url: &str) {
    if let Err(err) = AbsoluteUrl::parse(url) {
        errors.push(ValidationError::new(field, err.to_string()));
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &str, addr: &str) {
    if addr.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("`{addr}` is not a socket address")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RewriterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RewriterConfig::default();
        config.rewrite.global_domain = Some("not a url".into());
        config.rewrite.cache_capacity = 0;
        config.domains.insert("".into(), "https://a.com".into());
        config.domains.insert(GLOBAL_DOMAIN_NAME.into(), "https://b.com".into());
        config.domains.insert("ftp".into(), "ftp://files.example.com".into());
        config.admin.enabled = true;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "rewrite.global_domain",
                "rewrite.cache_capacity",
                "domains.",
                format!("domains.{GLOBAL_DOMAIN_NAME}").as_str(),
                "domains.ftp",
                "admin.api_key",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_addresses_checked_only_when_enabled() {
        let mut config = RewriterConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
