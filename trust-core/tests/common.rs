#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use trust_common::observability::{LogConfig, LogFormat};
use trust_common::{Result, TrustError};
use trust_llm::retry::{RetryPolicy, RetryingLlm};
use trust_llm::traits::{LlmClient, LlmResponse};
use trust_news::{EvidenceSearch, NewsArticle, SearchOutcome};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "trust-issues-tests",
            emit_stderr: true,
            format: if std::env::var("TRUST_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };

        trust_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Replays provider outcomes in order, recording each prompt.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(script: Vec<std::result::Result<&str, &str>>) -> Arc<Self> {
        let script = script
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        match next {
            Ok(text) => Ok(LlmResponse {
                text,
                model: Some("scripted".into()),
                tokens_used: None,
            }),
            Err(message) => Err(TrustError::Provider(message)),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Retry wrapper without jitter so backoff timing is exact.
pub fn retrying(client: Arc<ScriptedLlm>) -> RetryingLlm {
    RetryingLlm::new(
        client,
        RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        },
    )
}

type Responder = Box<dyn Fn(&str) -> SearchOutcome + Send + Sync>;
type Delay = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Search provider answering from a closure, optionally after a per-query delay.
pub struct FakeSearch {
    respond: Responder,
    delay: Delay,
    queries: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(respond: impl Fn(&str) -> SearchOutcome + Send + Sync + 'static) -> Arc<Self> {
        Self::staggered(|_| Duration::ZERO, respond)
    }

    pub fn empty() -> Arc<Self> {
        Self::new(|_| SearchOutcome::Empty)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::staggered(move |_| delay, |_| SearchOutcome::Empty)
    }

    pub fn staggered(
        delay: impl Fn(&str) -> Duration + Send + Sync + 'static,
        respond: impl Fn(&str) -> SearchOutcome + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            delay: Box::new(delay),
            queries: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        })
    }

    /// Queries in the order they were issued.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Queries in the order they finished.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvidenceSearch for FakeSearch {
    async fn search(&self, query: &str) -> SearchOutcome {
        self.queries.lock().unwrap().push(query.to_string());
        let delay = (self.delay)(query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(query.to_string());
        (self.respond)(query)
    }
}

pub fn article(source: &str, title: &str, description: &str) -> NewsArticle {
    NewsArticle {
        source_name: source.to_string(),
        title: title.to_string(),
        url: format!(
            "https://{}.example/{}",
            source.to_lowercase().replace(' ', ""),
            title.to_lowercase().replace(' ', "-")
        ),
        description: description.to_string(),
        published_at: "2024-01-01T00:00:00Z".to_string(),
    }
}
