#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use trust_common::observability::{LogConfig, LogFormat};
use trust_common::{Result, TrustError};
use trust_llm::traits::{LlmClient, LlmResponse};

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

/// Replays a fixed script of provider outcomes and counts calls.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(script: Vec<std::result::Result<&str, &str>>) -> Self {
        let script = script
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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
