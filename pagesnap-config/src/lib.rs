//! Loader for pagesnap configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML files and inline snippets first, then
//! `PAGESNAP__`-prefixed environment variables (`PAGESNAP__EXTRACTION__MAX_ATTEMPTS=5`),
//! so the environment always wins. `${VAR}` placeholders in string values are
//! expanded afterwards. Every section has defaults, so an empty document is a
//! valid configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File name looked up by [`default_config_path`].
pub const CONFIG_FILE_NAME: &str = "pagesnap.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PagesnapConfig {
    pub version: Option<String>,
    pub browser: BrowserSettings,
    pub extraction: ExtractionSettings,
    pub artifact: ArtifactSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthLevel,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            stealth: StealthLevel::Balanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StealthLevel {
    Lightweight,
    Balanced,
    Maximum,
}

/// Knobs for the snapshot retry loop and the leaf-block filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub max_attempts: u32,
    pub load_timeout_ms: u64,
    pub challenge_wait_ms: u64,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
    /// Class names whose elements (and descendants) never contribute
    /// formatted content. Site specific; defaults to a cookie banner.
    pub ignored_classes: Vec<String>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            load_timeout_ms: 10_000,
            challenge_wait_ms: 5_000,
            backoff_min_ms: 1_000,
            backoff_max_ms: 3_000,
            ignored_classes: default_ignored_classes(),
        }
    }
}

pub fn default_ignored_classes() -> Vec<String> {
    [
        "ch2-container",
        "ch2-theme-bar",
        "ch2-style-light",
        "ch2-dialog",
        "ch2-dialog-bottom",
        "ch2-visible",
        "ch2-settings",
        "ch2-settings-scan",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Used when a save request carries no path.
    pub default_path: String,
    pub model: String,
    pub preset: FormatPreset,
    pub generation_timeout_secs: u64,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            default_path: "log/agent_output.txt".into(),
            model: "gpt-4o-mini".into(),
            preset: FormatPreset::Primary,
            generation_timeout_secs: 60,
        }
    }
}

/// Context/output bounds for the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatPreset {
    Primary,
    Light,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider used for every model that does not route elsewhere.
    pub default: LlmProvider,
    /// Credential for models routed to Gemini by name.
    pub gemini_auth_token: Option<String>,
    pub gemini_endpoint: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            default: LlmProvider::default(),
            gemini_auth_token: None,
            gemini_endpoint: default_gemini_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmProvider {
    Openai {
        #[serde(default)]
        auth_token: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
    },
    Ollama {
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
    },
    Gemini {
        #[serde(default)]
        auth_token: String,
        #[serde(default = "default_gemini_endpoint")]
        endpoint: String,
    },
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::Openai {
            auth_token: String::new(),
            endpoint: default_openai_endpoint(),
        }
    }
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<String>,
    pub stderr: bool,
    pub json: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            stderr: false,
            json: false,
            filter: "info".into(),
        }
    }
}

impl PagesnapConfig {
    /// Reject combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ex = &self.extraction;
        if ex.max_attempts == 0 {
            return Err(ConfigError::Message(
                "extraction.max_attempts must be at least 1".into(),
            ));
        }
        if ex.backoff_min_ms >= ex.backoff_max_ms {
            return Err(ConfigError::Message(format!(
                "extraction.backoff_min_ms ({}) must be below backoff_max_ms ({})",
                ex.backoff_min_ms, ex.backoff_max_ms
            )));
        }
        if self.artifact.generation_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "artifact.generation_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// `./pagesnap.yaml` when present, else the per-user config location.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("pagesnap").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
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
pub struct PagesnapConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PagesnapConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PagesnapConfigLoader {
    /// Start from the built-in defaults.
    ///
    /// ```
    /// use pagesnap_config::PagesnapConfigLoader;
    ///
    /// let config = PagesnapConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.extraction.max_attempts, 3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use pagesnap_config::{FormatPreset, PagesnapConfigLoader};
    ///
    /// let cfg = PagesnapConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// artifact:
    ///   preset: light
    ///   model: "gemini-1.5-flash"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.artifact.preset, FormatPreset::Light);
    /// assert_eq!(cfg.artifact.default_path, "log/agent_output.txt");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `PAGESNAP__` environment variables are layered on last, then `${VAR}`
    /// placeholders are expanded before the typed structs are built.
    pub fn load(self) -> Result<PagesnapConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("PAGESNAP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extraction.ignored_classes"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PagesnapConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
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
        temp_env::with_vars(
            [("OPENAI_KEY", Some("sk-test")), ("GEM", Some("g-test"))],
            || {
                let mut v = json!({
                    "llm": { "default": { "auth_token": "${OPENAI_KEY}" } },
                    "tokens": ["$GEM", 3, null]
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "llm": { "default": { "auth_token": "sk-test" } },
                        "tokens": ["g-test", 3, null]
                    })
                );
            },
        );
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
        let mut v = json!("hi-${DOES_NOT_EXIST_PAGESNAP}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_PAGESNAP}"));
    }

    #[test]
    fn defaults_match_pipeline_constants() {
        let cfg = PagesnapConfig::default();
        assert_eq!(cfg.extraction.max_attempts, 3);
        assert_eq!(cfg.extraction.load_timeout_ms, 10_000);
        assert_eq!(cfg.extraction.challenge_wait_ms, 5_000);
        assert_eq!(cfg.extraction.ignored_classes.len(), 8);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_backoff_window() {
        let mut cfg = PagesnapConfig::default();
        cfg.extraction.backoff_min_ms = 4_000;
        assert!(cfg.validate().is_err());
    }
}
