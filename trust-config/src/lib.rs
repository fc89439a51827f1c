//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one, so an empty file is valid)
//! 2. YAML files and inline snippets, in the order they were attached
//! 3. `TRUST__`-prefixed environment variables, `__` separating path
//!    segments (`TRUST__LLM__API_KEY`, `TRUST__PIPELINE__MAX_CLAIMS`)
//!
//! After merging, every string value has `${VAR}` / `$VAR` references
//! expanded from the process environment. Unknown variables are left as-is,
//! which is how [`TrustConfig::missing_credentials`] spots unset keys.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use trust_common::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL, LlmConfig};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub llm: LlmSettings,
    pub news: NewsSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    /// Defaults per provider when unset.
    pub model: Option<String>,
    /// Base URL override (OpenAI-compatible gateways).
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub max_delay_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: String::new(),
            model: None,
            endpoint: None,
            timeout_secs: 30,
            max_attempts: 3,
            max_delay_secs: 30,
        }
    }
}

impl LlmSettings {
    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(m), _) if !m.trim().is_empty() => m,
            (_, LlmProvider::Gemini) => DEFAULT_GEMINI_MODEL,
            (_, LlmProvider::OpenAi) => DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub api_key: String,
    pub endpoint: String,
    pub page_size: u32,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://newsapi.org/v2/everything".into(),
            page_size: 5,
            language: "en".into(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub max_claims: usize,
    pub min_content_chars: usize,
    pub gather_concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_claims: 5,
            min_content_chars: 50,
            gather_concurrency: 3,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `text` or `json`
    pub format: String,
    pub dir: Option<String>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "text".into(),
            dir: None,
            stderr: true,
            filter: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Replaces the built-in source-domain penalty table when set.
    pub penalties: Option<Vec<PenaltyRuleConfig>>,
    pub penalty_match: PenaltyMatch,
}

/// How penalty rules are matched against the page URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyMatch {
    /// Rule text anywhere in the URL, so wrapped and redirect URLs match too.
    #[default]
    Substring,
    /// Parsed host or one of its subdomains.
    Host,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PenaltyRuleConfig {
    pub domain: String,
    #[serde(default)]
    pub path_prefix: Option<String>,
    pub factor: f64,
}

fn is_unset(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.contains("${")
}

impl TrustConfig {
    /// Credentials the pipeline cannot run without, as dotted config keys.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unset(&self.llm.api_key) {
            missing.push("llm.api_key");
        }
        if is_unset(&self.news.api_key) {
            missing.push("news.api_key");
        }
        missing
    }

    /// Provider selection in the shape the LLM client factory expects.
    pub fn llm_config(&self) -> LlmConfig {
        let api_key = self.llm.api_key.trim().to_string();
        let model = self.llm.model().to_string();
        match self.llm.provider {
            LlmProvider::Gemini => LlmConfig::Gemini { api_key, model },
            LlmProvider::OpenAi => LlmConfig::OpenAi {
                api_key,
                model,
                base_url: self.llm.endpoint.clone(),
            },
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
pub struct TrustConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TrustConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustConfigLoader {
    /// Start from built-in defaults.
    ///
    /// ```
    /// use trust_config::TrustConfigLoader;
    ///
    /// let config = TrustConfigLoader::new()
    ///     .with_yaml_str("pipeline:\n  max_claims: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.pipeline.max_claims, 3);
    /// assert_eq!(config.llm.model(), "gemini-1.5-flash");
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

    /// Like [`with_file`](Self::with_file), but a missing file is skipped so
    /// deployments can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use trust_config::{LlmProvider, TrustConfigLoader};
    ///
    /// unsafe { std::env::set_var("DOC_OPENAI_KEY", "injected-from-env"); }
    ///
    /// let config = TrustConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: openai
    ///   api_key: "${DOC_OPENAI_KEY}"
    ///   endpoint: "https://gateway.example/v1"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.provider, LlmProvider::OpenAi);
    /// assert_eq!(config.llm.api_key, "injected-from-env");
    /// assert_eq!(config.llm.model(), "gpt-4o-mini");
    ///
    /// unsafe { std::env::remove_var("DOC_OPENAI_KEY"); }
    /// ```
    pub fn load(self) -> Result<TrustConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TRUST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Expand on the untyped tree so numbers and lists survive untouched.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TrustConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
