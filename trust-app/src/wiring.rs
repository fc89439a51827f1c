use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trust_common::TrustError;
use trust_common::observability::{LogConfig, LogFormat};
use trust_config::{LlmSettings, LoggingSettings, NewsSettings, ScoringSettings, TrustConfig};
use trust_core::{AnalysisRequest, Analyzer, AnalyzerOptions, MemoryCache, PenaltyTable, ScoringEngine};
use trust_llm::build_llm_client;
use trust_llm::retry::{RetryPolicy, RetryingLlm};
use trust_news::{NewsApiClient, NewsApiSettings};

pub fn log_config(settings: &LoggingSettings) -> LogConfig {
    LogConfig {
        app_name: "trust-issues",
        log_dir: settings.dir.as_deref().map(PathBuf::from),
        emit_stderr: settings.stderr,
        format: LogFormat::parse(&settings.format),
        default_filter: settings.filter.clone(),
    }
}

pub fn retry_policy(llm: &LlmSettings) -> RetryPolicy {
    RetryPolicy {
        max_attempts: llm.max_attempts.max(1),
        max_delay: llm.max_delay(),
        call_timeout: llm.timeout(),
        jitter: true,
    }
}

pub fn news_settings(news: &NewsSettings) -> NewsApiSettings {
    NewsApiSettings {
        api_key: news.api_key.trim().to_string(),
        endpoint: news.endpoint.clone(),
        page_size: news.page_size,
        language: news.language.clone(),
        timeout: std::time::Duration::from_secs(news.timeout_secs),
    }
}

pub fn penalty_table(scoring: &ScoringSettings) -> PenaltyTable {
    let table = match &scoring.penalties {
        Some(rules) => PenaltyTable::from_config(rules),
        None => PenaltyTable::default(),
    };
    table.with_mode(scoring.penalty_match)
}

/// Fail before any pipeline work when a provider key is unset.
pub fn check_credentials(cfg: &TrustConfig) -> trust_common::Result<()> {
    let missing = cfg.missing_credentials();
    if missing.is_empty() {
        return Ok(());
    }
    Err(TrustError::Config(format!(
        "missing credentials: {} (set them in the config file or via TRUST__LLM__API_KEY / TRUST__NEWS__API_KEY)",
        missing.join(", ")
    )))
}

/// Construct every client once; the returned analyzer shares them read-only.
pub fn build_analyzer(cfg: &TrustConfig) -> trust_common::Result<Analyzer> {
    check_credentials(cfg)?;

    let client = build_llm_client(&cfg.llm_config(), cfg.llm.timeout())?;
    tracing::info!(model = %client.model_name(), "app.llm_ready");
    let llm = RetryingLlm::new(client, retry_policy(&cfg.llm));

    let search = Arc::new(NewsApiClient::new(news_settings(&cfg.news))?);

    Ok(Analyzer::new(
        Some(llm),
        search,
        ScoringEngine::new(penalty_table(&cfg.scoring)),
        Arc::new(MemoryCache::new()),
        AnalyzerOptions::from(&cfg.pipeline),
    ))
}

/// Request JSON from `input`, or stdin when no path is given.
pub fn read_request(input: Option<&Path>) -> Result<AnalysisRequest> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("request is not a valid analysis request JSON")
}
