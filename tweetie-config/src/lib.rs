//! Loader for tweetie settings with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, then `TWEETIE__`-prefixed
//! environment variables win (`TWEETIE__API__TIMEOUT_SECS=30` overrides
//! `api.timeout_secs`). String values get `${VAR}` and `~` expansion after merging.
//! Every field has a default, so an empty configuration is valid.
//!
//! ```yaml
//! credentials_file: ~/.config/tweetie/twitter.csv
//! api:
//!   base_url: https://api.twitter.com
//!   timeout_secs: 15
//!   max_retries: 0
//!   wait_on_rate_limit: true
//!   wait_on_rate_limit_notify: true
//!   max_rate_limit_wait_secs: ~
//! logging:
//!   format: text
//!   filter: info
//!   stderr: false
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tweetie_common::APP_NAME;
use tweetie_common::observability::{LogConfig, LogFormat};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TWEETIE";
const DEFAULT_CREDENTIALS_FILE: &str = "twitter.csv";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TweetieConfig {
    /// File whose first line holds `key, secret, token, token_secret`.
    pub credentials_file: PathBuf,
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

impl Default for TweetieConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            api: ApiSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Remote API client settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Retry budget for network failures and 5xx responses. Off unless configured.
    pub max_retries: usize,
    /// Sleep until the rate-limit window resets instead of failing.
    pub wait_on_rate_limit: bool,
    /// Emit a warning every time a rate-limit wait starts.
    pub wait_on_rate_limit_notify: bool,
    /// Upper bound for a single rate-limit wait; `None` waits as long as the service asks.
    pub max_rate_limit_wait_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".into(),
            timeout_secs: 15,
            max_retries: 0,
            wait_on_rate_limit: true,
            wait_on_rate_limit_notify: true,
            max_rate_limit_wait_secs: None,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_rate_limit_wait(&self) -> Option<Duration> {
        self.max_rate_limit_wait_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub filter: String,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".into(),
            dir: None,
            stderr: false,
        }
    }
}

impl LoggingSettings {
    /// Translate into the observability initializer's input.
    ///
    /// ```
    /// use tweetie_config::LoggingSettings;
    ///
    /// let log = LoggingSettings { stderr: true, ..Default::default() }.to_log_config();
    /// assert!(log.emit_stderr);
    /// assert_eq!(log.default_filter, "info");
    /// ```
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            app_name: APP_NAME,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn default_credentials_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(DEFAULT_CREDENTIALS_FILE)
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') || s.starts_with('~') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::full(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (files + env overrides).
pub struct TweetieConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TweetieConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetieConfigLoader {
    /// Start from defaults plus `TWEETIE__` env overrides.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str("api:\n  timeout_secs: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.api.timeout_secs, 3);
    /// assert!(config.api.wait_on_rate_limit);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing, for env-only deployments.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources and deserialize into [`TweetieConfig`].
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// unsafe { std::env::set_var("TWEETIE_DOC_KEYS", "/tmp/keys.csv"); }
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str(r#"credentials_file: "${TWEETIE_DOC_KEYS}""#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.credentials_file, std::path::PathBuf::from("/tmp/keys.csv"));
    ///
    /// unsafe { std::env::remove_var("TWEETIE_DOC_KEYS"); }
    /// ```
    pub fn load(self) -> Result<TweetieConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_values() {
        temp_env::with_vars([("KEYS_DIR", Some("/srv")), ("KEYS_NAME", Some("k.csv"))], || {
            let mut v = json!({
                "credentials_file": "${KEYS_DIR}/${KEYS_NAME}",
                "api": { "timeout_secs": 3 },
                "list": ["$KEYS_DIR", true, null]
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({
                    "credentials_file": "/srv/k.csv",
                    "api": { "timeout_secs": 3 },
                    "list": ["/srv", true, null]
                })
            );
        });
    }

    #[test]
    fn expands_home_prefix() {
        temp_env::with_var("HOME", Some("/home/alice"), || {
            let mut v = json!("~/keys.csv");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("/home/alice/keys.csv"));
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${TWEETIE_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${TWEETIE_DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_wait_on_rate_limit_without_bound() {
        let api = ApiSettings::default();
        assert!(api.wait_on_rate_limit);
        assert!(api.wait_on_rate_limit_notify);
        assert_eq!(api.max_rate_limit_wait(), None);
        assert_eq!(api.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn failed_requests_are_not_retried_by_default() {
        assert_eq!(ApiSettings::default().max_retries, 0);
    }

    #[test]
    fn default_credentials_file_is_under_app_dir() {
        let path = default_credentials_file();
        assert!(path.ends_with("tweetie/twitter.csv"));
    }
}
