//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML files/snippets as they were attached,
//! then `SCOUT__`-prefixed environment variables (`__` separates nesting, e.g.
//! `SCOUT__BROWSER__HEADLESS=false`). `${VAR}` placeholders inside string
//! values are expanded after merging. Every section carries defaults, so an
//! empty source set yields a usable [`ScoutConfig`].
use config::{Config, ConfigError, Environment, File};
use scout_common::observability::LogFormat;
use scout_common::ExtractionMode;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SCOUT";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub probe: ProbeConfig,
    pub search: SearchConfig,
    pub loader: LoaderConfig,
    pub extraction: ExtractionConfig,
    pub environment: EnvironmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".into(),
        }
    }
}

/// How the browser session is launched. Has no bearing on pipeline semantics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub no_sandbox: bool,
    pub disable_dev_shm_usage: bool,
    /// Additional Chrome command-line switches, passed through verbatim.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            no_sandbox: true,
            disable_dev_shm_usage: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Candidate URL; `{domain}` is replaced with the resolved domain.
    pub url_template: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url_template: "https://{domain}/careers".into(),
            timeout_ms: 15_000,
            user_agent: concat!("scout/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ProbeConfig {
    /// ```
    /// use scout_config::ProbeConfig;
    ///
    /// let probe = ProbeConfig::default();
    /// assert_eq!(probe.candidate_url("acme.com"), "https://acme.com/careers");
    /// ```
    pub fn candidate_url(&self, domain: &str) -> String {
        self.url_template.replace("{domain}", domain)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine_url: String,
    /// Query text; `{domain}` is replaced with the resolved domain.
    pub query_template: String,
    pub query_input_selector: String,
    /// CSS selector for result headings; each heading's link is a result.
    pub result_selector: String,
    pub wait_timeout_ms: u64,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: "https://www.google.com".into(),
            query_template: "jobs at {domain}".into(),
            query_input_selector: "[name='q']".into(),
            result_selector: "h3".into(),
            wait_timeout_ms: 10_000,
            max_results: 10,
        }
    }
}

impl SearchConfig {
    pub fn query_for(&self, domain: &str) -> String {
        self.query_template.replace("{domain}", domain)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Fixed delay after navigation so client-rendered content can settle.
    pub settle_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 5_000,
        }
    }
}

impl LoaderConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
}

/// Browser/driver version precondition run before each extraction request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub check_versions: bool,
    pub chrome_binary: String,
    pub chromedriver_binary: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            check_versions: true,
            chrome_binary: "google-chrome".into(),
            chromedriver_binary: "chromedriver".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            emit_stderr: true,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
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

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start with no file sources; environment overrides are applied on load.
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.search.max_results, 10);
    /// assert_eq!(config.loader.settle_delay_ms, 5_000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so deployments can rely purely on
    /// environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use scout_common::ExtractionMode;
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let cfg = ScoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// extraction:
    ///   mode: text
    /// search:
    ///   wait_timeout_ms: 2500
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.extraction.mode, ExtractionMode::Text);
    /// assert_eq!(cfg.search.wait_timeout_ms, 2500);
    /// assert_eq!(cfg.search.result_selector, "h3");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
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
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
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
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_match_service_behaviour() {
        let cfg = ScoutConfig::default();
        assert!(cfg.browser.headless);
        assert!(cfg.browser.no_sandbox);
        assert!(cfg.browser.disable_dev_shm_usage);
        assert_eq!(cfg.probe.candidate_url("acme.com"), "https://acme.com/careers");
        assert_eq!(cfg.search.query_for("acme.com"), "jobs at acme.com");
        assert_eq!(cfg.search.wait_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.loader.settle_delay(), Duration::from_secs(5));
        assert_eq!(cfg.extraction.mode, ExtractionMode::Markup);
        assert!(cfg.environment.check_versions);
    }
}
