use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question count must be between 1 and {max}, got {got}")]
    InvalidQuestionCount { got: u32, max: u32 },

    #[error("focus topic cannot be blank")]
    BlankFocusTopic,

    #[error("unknown career cluster: {0}")]
    UnknownCluster(String),

    #[error("unknown competition level: {0}")]
    UnknownLevel(String),
}

//
// ─── CLUSTER / LEVEL ───────────────────────────────────────────────────────────
//

/// DECA career cluster a practice test is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cluster {
    BusinessManagement,
    Entrepreneurship,
    Finance,
    Hospitality,
    Marketing,
    PersonalFinancialLiteracy,
}

impl Cluster {
    pub const ALL: [Cluster; 6] = [
        Cluster::BusinessManagement,
        Cluster::Entrepreneurship,
        Cluster::Finance,
        Cluster::Hospitality,
        Cluster::Marketing,
        Cluster::PersonalFinancialLiteracy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Cluster::BusinessManagement => "business_management",
            Cluster::Entrepreneurship => "entrepreneurship",
            Cluster::Finance => "finance",
            Cluster::Hospitality => "hospitality",
            Cluster::Marketing => "marketing",
            Cluster::PersonalFinancialLiteracy => "personal_financial_literacy",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Cluster::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| SettingsError::UnknownCluster(s.to_owned()))
    }
}

/// Competition level, which controls question difficulty on the generator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    District,
    Association,
    Icdc,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::District => "district",
            Level::Association => "association",
            Level::Icdc => "icdc",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "district" => Ok(Level::District),
            "association" | "state" => Ok(Level::Association),
            "icdc" => Ok(Level::Icdc),
            _ => Err(SettingsError::UnknownLevel(s.to_owned())),
        }
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Settings submitted while a session is being configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    cluster: Cluster,
    level: Level,
    question_count: u32,
    #[serde(default)]
    focus_topic: Option<String>,
    #[serde(default)]
    require_answer_to_advance: bool,
    #[serde(default)]
    shuffle_questions: bool,
}

impl SessionSettings {
    pub const MAX_QUESTIONS: u32 = 100;

    /// Creates settings with both UI guards disabled.
    ///
    /// Settings are not validated until `validate` is called, matching a form
    /// that is filled in before it is submitted.
    #[must_use]
    pub fn new(cluster: Cluster, level: Level, question_count: u32) -> Self {
        Self {
            cluster,
            level,
            question_count,
            focus_topic: None,
            require_answer_to_advance: false,
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_focus_topic(mut self, topic: impl Into<String>) -> Self {
        self.focus_topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn with_require_answer_to_advance(mut self, required: bool) -> Self {
        self.require_answer_to_advance = required;
        self
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    /// Check the settings before a generation request is made.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidQuestionCount` outside `1..=MAX_QUESTIONS`
    /// and `SettingsError::BlankFocusTopic` for a whitespace-only focus topic.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.question_count == 0 || self.question_count > Self::MAX_QUESTIONS {
            return Err(SettingsError::InvalidQuestionCount {
                got: self.question_count,
                max: Self::MAX_QUESTIONS,
            });
        }
        if self
            .focus_topic
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(SettingsError::BlankFocusTopic);
        }
        Ok(())
    }

    #[must_use]
    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn focus_topic(&self) -> Option<&str> {
        self.focus_topic.as_deref().map(str::trim)
    }

    #[must_use]
    pub fn require_answer_to_advance(&self) -> bool {
        self.require_answer_to_advance
    }

    #[must_use]
    pub fn shuffle_questions(&self) -> bool {
        self.shuffle_questions
    }
}
