use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use practice_core::model::{Cluster, Level, OptionKey, Question, QuestionBank, QuestionId, SessionSettings};

use crate::config::GeneratorConfig;
use crate::error::GenerationError;

/// Produces a question bank for the given settings.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationError` on transport failures, invalid payloads or an
    /// empty bank.
    async fn generate(&self, settings: &SessionSettings) -> Result<QuestionBank, GenerationError>;
}

/// Question generator backed by the practice-test HTTP endpoint.
#[derive(Clone)]
pub struct HttpQuestionGenerator {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl HttpQuestionGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeneratorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionGenerator for HttpQuestionGenerator {
    async fn generate(&self, settings: &SessionSettings) -> Result<QuestionBank, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!(
            "{}/practice-tests/generate",
            config.base_url.trim_end_matches('/')
        );
        let payload = GenerateRequest::from(settings);

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        debug!(received = body.questions.len(), "generation payload received");
        body.into_bank()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    cluster: Cluster,
    level: Level,
    question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    focus_topic: Option<&'a str>,
}

impl<'a> From<&'a SessionSettings> for GenerateRequest<'a> {
    fn from(settings: &'a SessionSettings) -> Self {
        Self {
            cluster: settings.cluster(),
            level: settings.level(),
            question_count: settings.question_count(),
            focus_topic: settings.focus_topic(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    #[serde(default)]
    id: Option<String>,
    stem: String,
    options: BTreeMap<String, String>,
    correct_answer: String,
    #[serde(default)]
    instructional_area: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

impl GenerateResponse {
    fn into_bank(self) -> Result<QuestionBank, GenerationError> {
        if self.questions.is_empty() {
            return Err(GenerationError::EmptyBank);
        }
        let explicit: Vec<Option<QuestionId>> = self
            .questions
            .iter()
            .map(|q| q.id.as_deref().and_then(|raw| QuestionId::new(raw).ok()))
            .collect();
        let mut taken: BTreeSet<QuestionId> = explicit.iter().flatten().cloned().collect();

        // Id-less questions take their positional `qN`, or the next free one.
        let questions = self
            .questions
            .into_iter()
            .zip(explicit)
            .enumerate()
            .map(|(index, (generated, id))| {
                let id = id.unwrap_or_else(|| {
                    let mut slot = index;
                    while taken.contains(&QuestionId::positional(slot)) {
                        slot += 1;
                    }
                    let id = QuestionId::positional(slot);
                    taken.insert(id.clone());
                    id
                });
                generated.into_question(index, id)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuestionBank::new(questions)?)
    }
}

impl GeneratedQuestion {
    fn into_question(self, index: usize, id: QuestionId) -> Result<Question, GenerationError> {
        let invalid = |reason: String| {
            GenerationError::InvalidPayload(format!("question {}: {reason}", index + 1))
        };

        let options = self
            .options
            .into_iter()
            .map(|(key, text)| {
                OptionKey::new(key)
                    .map(|key| (key, text))
                    .map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let correct = OptionKey::new(self.correct_answer).map_err(|e| invalid(e.to_string()))?;

        Ok(Question::new(id, self.stem, options, correct)
            .map_err(|e| invalid(e.to_string()))?
            .with_topic(self.instructional_area)
            .with_explanation(self.explanation))
    }
}
