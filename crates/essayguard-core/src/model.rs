//! Optional language-model collaborator.
//!
//! A [`ModelOracle`] can score a text's AI likelihood or rewrite it. Both
//! calls are best-effort: the [`Analyzer`] bounds them with a timeout and
//! falls back to its own deterministic result on any failure.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::engine::{AnalyzeOptions, Analyzer};
use crate::error::{AnalysisResult, ModelError, ModelResult};
use crate::reports::{AnalysisReport, RiskBand, ScoreSource};
use crate::scoring;

/// First number in a model answer.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

const SCORE_PROMPT: &str = "You rate how likely a student essay was written by an AI model. \
    Answer with a single integer from 0 (certainly human) to 100 (certainly AI) and nothing else.";

const REWRITE_PROMPT: &str = "Rewrite the following student essay so it reads naturally in the \
    student's own voice. Keep its meaning, length and structure. Reply with the rewritten text only.";

/// A language model that can judge or rewrite text.
#[async_trait]
pub trait ModelOracle: Send + Sync {
    /// AI likelihood of `text`, 0--100.
    async fn score(&self, text: &str) -> ModelResult<f64>;

    /// A rewritten version of `text`.
    async fn rewrite(&self, text: &str) -> ModelResult<String>;
}

// -- HTTP oracle ------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// [`ModelOracle`] over an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpModelOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpModelOracle {
    /// Build an oracle from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &ModelConfig) -> ModelResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::MissingCredentials {
                var: config.api_key_env.clone(),
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> ModelResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ModelError::Malformed("no choices in response".to_string()))
    }
}

#[async_trait]
impl ModelOracle for HttpModelOracle {
    async fn score(&self, text: &str) -> ModelResult<f64> {
        let answer = self.complete(SCORE_PROMPT, text).await?;
        parse_score(&answer)
    }

    async fn rewrite(&self, text: &str) -> ModelResult<String> {
        let answer = self.complete(REWRITE_PROMPT, text).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ModelError::Malformed("empty rewrite".to_string()));
        }
        Ok(answer.to_string())
    }
}

/// Read a 0--100 score out of a model answer.
pub fn parse_score(answer: &str) -> ModelResult<f64> {
    let m = NUMBER_PATTERN
        .find(answer)
        .ok_or_else(|| ModelError::Malformed(format!("no number in {answer:?}")))?;
    let value: f64 = m
        .as_str()
        .parse()
        .map_err(|_| ModelError::Malformed(format!("bad number {:?}", m.as_str())))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ModelError::Malformed(format!("score {value} out of range")));
    }
    Ok(value)
}

// -- Analyzer integration ---------------------------------------------------

/// Where a rewrite came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RewriteSource {
    /// The language model.
    Model,
    /// Local fix application.
    Local,
}

/// A rewritten text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rewrite {
    /// The rewritten text.
    pub text: String,
    /// Producer of `text`.
    pub source: RewriteSource,
    /// Why the model rewrite was not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

async fn bounded<T, F>(ms: u64, call: F) -> ModelResult<T>
where
    F: Future<Output = ModelResult<T>>,
{
    tokio::time::timeout(Duration::from_millis(ms), call)
        .await
        .unwrap_or(Err(ModelError::Timeout { ms }))
}

impl Analyzer {
    /// Analyze `text`, blending in the oracle's score when it answers in time.
    ///
    /// `score = round((1 - w) * pattern + w * model)`, then the severity
    /// floor and clamp are applied again. Any model failure leaves the
    /// pattern result in place with a `model_note`.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub async fn analyze_with_model(
        &self,
        text: &str,
        options: &AnalyzeOptions,
        oracle: &dyn ModelOracle,
        config: &ModelConfig,
    ) -> AnalysisResult<AnalysisReport> {
        let mut report = self.analyze(text, options)?;

        match bounded(config.timeout_ms, oracle.score(text)).await {
            Ok(model_score) => {
                let w = config.blend_weight.clamp(0.0, 1.0);
                let blended = (1.0 - w).mul_add(f64::from(report.score), w * model_score);
                let score = self
                    .params()
                    .finalize(blended, report.breakdown.severity_floor);
                tracing::debug!(pattern = report.score, model_score, score, "blended model score");
                report.score = score;
                report.band = RiskBand::from_score(score);
                report.score_source = ScoreSource::Blended;
                report.reasoning = format!(
                    "{} (blended with model score {model_score:.0})",
                    scoring::reasoning(score, &report.flags, &report.breakdown)
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "model scoring failed, using pattern score");
                report.model_note = Some(e.to_string());
            }
        }
        Ok(report)
    }

    /// Rewrite `text` with the oracle, falling back to local fixes.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub async fn rewrite_with_model(
        &self,
        text: &str,
        options: &AnalyzeOptions,
        oracle: &dyn ModelOracle,
        config: &ModelConfig,
    ) -> AnalysisResult<Rewrite> {
        self.validate_input(text, options)?;

        match bounded(config.timeout_ms, oracle.rewrite(text)).await {
            Ok(rewritten) => Ok(Rewrite {
                text: rewritten,
                source: RewriteSource::Model,
                note: None,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "model rewrite failed, applying local fixes");
                let outcome = self.fix_and_rescan(text, options)?;
                Ok(Rewrite {
                    text: outcome.fix.text,
                    source: RewriteSource::Local,
                    note: Some(e.to_string()),
                })
            }
        }
    }
}
