//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseEngine, FeedConfig, S3Config, StorageBackendKind};
use super::secret::secret_string;
use crate::domain::errors::FeedError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FeedConfig
/// 4. Applies environment variable overrides (ENTITY_FEED_* and the plain
///    DB_* / S3_* / feed names)
/// 5. Validates the configuration
///
/// # Errors
///
/// Every failure is returned as [`FeedError::Configuration`].
///
/// # Examples
///
/// ```no_run
/// use entity_feed::config::loader::load_config;
///
/// let config = load_config("entity-feed.toml").expect("Failed to load config");
/// println!("{}", config.database.describe());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FeedConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FeedError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FeedError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn load_config_str(contents: &str) -> Result<FeedConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FeedConfig = toml::from_str(&contents)
        .map_err(|e| FeedError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FeedError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FeedError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FeedError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// First set variable among `names`
fn env_any(names: &[&str]) -> Option<(String, String)> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
}

fn env_parse<T: FromStr>(names: &[&str]) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env_any(names) {
        Some((name, raw)) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            FeedError::Configuration(format!("Invalid value '{raw}' for {name}: {e}"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides
///
/// `ENTITY_FEED_<SECTION>_<KEY>` names take precedence over the plain names
/// (`DB_HOST`, `S3_BUCKET`, `CHUNK_SIZE`, ...) used by existing deployments.
fn apply_env_overrides(config: &mut FeedConfig) -> Result<()> {
    // Application overrides
    if let Some((_, val)) = env_any(&["ENTITY_FEED_APPLICATION_LOG_LEVEL"]) {
        config.application.log_level = val;
    }

    // Database overrides
    if let Some((_, val)) = env_any(&["ENTITY_FEED_DATABASE_ENGINE", "DB_ENGINE"]) {
        config.database.engine = DatabaseEngine::from_str(&val)?;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_DATABASE_HOST", "DB_HOST"]) {
        config.database.host = val;
    }
    if let Some(port) = env_parse::<u16>(&["ENTITY_FEED_DATABASE_PORT", "DB_PORT"])? {
        config.database.port = Some(port);
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_DATABASE_USER", "DB_USER"]) {
        config.database.user = val;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_DATABASE_PASSWORD", "DB_PASSWORD"]) {
        config.database.password = secret_string(val);
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_DATABASE_DATABASE", "DB_NAME"]) {
        config.database.database = val;
    }
    if let Some(size) = env_parse(&["ENTITY_FEED_DATABASE_POOL_MIN_SIZE"])? {
        config.database.pool_min_size = size;
    }
    if let Some(size) = env_parse(&["ENTITY_FEED_DATABASE_POOL_MAX_SIZE"])? {
        config.database.pool_max_size = size;
    }
    if let Some(retries) = env_parse(&["ENTITY_FEED_DATABASE_CONNECT_RETRIES"])? {
        config.database.connect_retries = retries;
    }

    // Feed overrides
    if let Some((_, val)) = env_any(&["ENTITY_FEED_FEED_FEED_TYPE", "FEED_TYPE"]) {
        config.feed.feed_type = val;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_FEED_NAME", "FEED_NAME"]) {
        config.feed.name = val;
    }
    if let Some(size) = env_parse(&["ENTITY_FEED_FEED_CHUNK_SIZE", "CHUNK_SIZE"])? {
        config.feed.chunk_size = size;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_FEED_OUTPUT_DIR"]) {
        config.feed.output_dir = val;
    }

    // Storage overrides
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_BACKEND"]) {
        config.storage.backend = StorageBackendKind::from_str(&val)?;
    }
    if let Some(retries) = env_parse(&["ENTITY_FEED_STORAGE_UPLOAD_RETRIES"])? {
        config.storage.upload_retries = retries;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_LOCAL_DIRECTORY"]) {
        config.storage.local.directory = val;
    }
    apply_s3_overrides(config);

    // Logging overrides
    if let Some(enabled) = env_parse(&["ENTITY_FEED_LOGGING_LOCAL_ENABLED"])? {
        config.logging.local_enabled = enabled;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_LOGGING_LOCAL_PATH"]) {
        config.logging.local_path = val;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_LOGGING_LOCAL_ROTATION"]) {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn apply_s3_overrides(config: &mut FeedConfig) {
    let bucket = env_any(&["ENTITY_FEED_STORAGE_S3_BUCKET", "S3_BUCKET"]);

    // An S3 section can come entirely from the environment
    if config.storage.s3.is_none() {
        let Some((_, ref name)) = bucket else {
            return;
        };
        config.storage.s3 = Some(S3Config {
            bucket: name.clone(),
            region: String::new(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            force_path_style: false,
            key_prefix: String::new(),
        });
    }

    let Some(ref mut s3) = config.storage.s3 else {
        return;
    };

    if let Some((_, val)) = bucket {
        s3.bucket = val;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_S3_REGION", "S3_REGION"]) {
        s3.region = val;
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_S3_ACCESS_KEY_ID", "S3_ACCESS_KEY_ID"])
    {
        s3.access_key_id = Some(val);
    }
    if let Some((_, val)) = env_any(&[
        "ENTITY_FEED_STORAGE_S3_SECRET_ACCESS_KEY",
        "S3_SECRET_ACCESS_KEY",
    ]) {
        s3.secret_access_key = Some(secret_string(val));
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_S3_ENDPOINT"]) {
        s3.endpoint = Some(val);
    }
    if let Some((_, val)) = env_any(&["ENTITY_FEED_STORAGE_S3_KEY_PREFIX"]) {
        s3.key_prefix = val;
    }
}


#[cfg(test)]
mod tests {
    use super::test_env;
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_TOML: &str = r#"
[database]
engine = "mysql"
host = "db.internal"
user = "feed"
password = "pass"
database = "places"

[feed]
chunk_size = 50

[storage]
backend = "local"

[storage.local]
directory = "out"
"#;

    #[test]
    fn test_substitute_env_vars() {
        let _env = test_env::isolated();
        std::env::set_var("LOADER_TEST_PASSWORD", "test_value");
        let input = "password = \"${LOADER_TEST_PASSWORD}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("LOADER_TEST_PASSWORD");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _env = test_env::isolated();
        std::env::remove_var("LOADER_TEST_MISSING_A");
        std::env::remove_var("LOADER_TEST_MISSING_B");
        let input = "a = \"${LOADER_TEST_MISSING_A}\"\nb = \"${LOADER_TEST_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err
            .to_string()
            .contains("LOADER_TEST_MISSING_A, LOADER_TEST_MISSING_B"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# password = \"${LOADER_TEST_ONLY_IN_COMMENT}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${LOADER_TEST_ONLY_IN_COMMENT}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(FeedError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _env = test_env::isolated();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_TOML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.engine, DatabaseEngine::Mysql);
        assert_eq!(config.database.effective_port(), 3306);
        assert_eq!(config.feed.chunk_size, 50);
        assert_eq!(config.feed.name, "reservewithgoogle.entity");
        assert_eq!(config.storage.backend, StorageBackendKind::Local);
        assert_eq!(config.storage.local.directory, "out");
        assert!(config.storage.s3.is_none());
    }

    #[test]
    fn test_load_config_rejects_unknown_engine() {
        let _env = test_env::isolated();
        let toml = VALID_TOML.replace("engine = \"mysql\"", "engine = \"oracle\"");
        let err = load_config_str(&toml).unwrap_err();
        assert!(matches!(err, FeedError::Configuration(_)));
    }

    #[test]
    fn test_load_config_rejects_invalid_chunk_size() {
        let _env = test_env::isolated();
        let toml = VALID_TOML.replace("chunk_size = 50", "chunk_size = 0");
        let err = load_config_str(&toml).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_ambient_overrides_do_not_leak_into_tests() {
        let env = test_env::isolated();
        std::env::set_var("CHUNK_SIZE", "7");
        std::env::set_var("ENTITY_FEED_DATABASE_HOST", "ambient-host");
        drop(env);

        let _env = test_env::isolated();
        let config = load_config_str(VALID_TOML).unwrap();
        assert_eq!(config.feed.chunk_size, 50);
        assert_eq!(config.database.host, "db.internal");
    }
}
