//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, ResolvedConfig};
use super::secret::secret_string;
use crate::domain::errors::ResolvedError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ResolvedConfig
/// 4. Applies environment variable overrides (CDC_RESOLVED_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ResolvedError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is invalid, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use cdc_resolved::config::loader::load_config;
///
/// let config = load_config("cdc-resolved.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ResolvedConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ResolvedError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ResolvedError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Performs the same substitution, override, and validation steps as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<ResolvedConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ResolvedConfig = toml::from_str(&contents)
        .map_err(|e| ResolvedError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ResolvedError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap())
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(ResolvedError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        ResolvedError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the CDC_RESOLVED_* prefix
///
/// Variables follow the pattern `CDC_RESOLVED_<SECTION>_<KEY>`, for example
/// `CDC_RESOLVED_STORE_TABLE` or `CDC_RESOLVED_RETRY_MAX_RETRIES`.
///
/// # Errors
///
/// Returns an error if a numeric or enumerated override does not parse
fn apply_env_overrides(config: &mut ResolvedConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CDC_RESOLVED_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("CDC_RESOLVED_DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(ResolvedError::Configuration(format!(
                    "Invalid value '{other}' for CDC_RESOLVED_DATABASE_TARGET"
                )))
            }
        };
    }

    // PostgreSQL overrides (only if the section is configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("CDC_RESOLVED_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("CDC_RESOLVED_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_override("CDC_RESOLVED_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
    }

    // Store overrides
    if let Ok(val) = std::env::var("CDC_RESOLVED_STORE_SCHEMA") {
        config.store.schema = val;
    }
    if let Ok(val) = std::env::var("CDC_RESOLVED_STORE_TABLE") {
        config.store.table = val;
    }
    if let Ok(val) = std::env::var("CDC_RESOLVED_STORE_WRITE_POLICY") {
        config.store.write_policy = toml::Value::String(val.clone())
            .try_into()
            .map_err(|_| {
                ResolvedError::Configuration(format!(
                    "Invalid value '{val}' for CDC_RESOLVED_STORE_WRITE_POLICY"
                ))
            })?;
    }

    // Retry overrides
    if let Ok(val) = std::env::var("CDC_RESOLVED_RETRY_MAX_RETRIES") {
        config.retry.max_retries = parse_override("CDC_RESOLVED_RETRY_MAX_RETRIES", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CDC_RESOLVED_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled =
            parse_override("CDC_RESOLVED_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CDC_RESOLVED_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolved::WritePolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CDC_RESOLVED_TEST_DSN", "postgresql://root@db:26257/defaultdb");
        let input = "connection_string = \"${CDC_RESOLVED_TEST_DSN}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(
            result,
            "connection_string = \"postgresql://root@db:26257/defaultdb\""
        );
        std::env::remove_var("CDC_RESOLVED_TEST_DSN");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CDC_RESOLVED_TEST_MISSING");
        let input = "connection_string = \"${CDC_RESOLVED_TEST_MISSING}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("CDC_RESOLVED_TEST_MISSING"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# connection_string = \"${CDC_RESOLVED_TEST_COMMENTED}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(ResolvedError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[store]
schema = "_cdc_sink"
table = "resolved"
write_policy = "strictly_monotonic"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database_target, DatabaseTarget::Memory);
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.store.write_policy, WritePolicy::StrictlyMonotonic);
        assert_eq!(config.retry.max_retries, 10);
    }

    #[test]
    fn test_parse_config_rejects_unknown_policy() {
        let toml_content = r#"
database_target = "memory"

[store]
write_policy = "sometimes"
"#;
        assert!(parse_config(toml_content).is_err());
    }
}
