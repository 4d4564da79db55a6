use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawQuestion {
    pub source_id: Option<Value>,
    pub text: String,
    pub explanation: Option<String>,
    pub options: Vec<RawOption>,
    pub correct_answer: Option<i64>,
    pub correct_answers: Option<Vec<i64>>,
}

impl RawQuestion {
    pub fn display_id(&self) -> String {
        match &self.source_id {
            Some(Value::String(value)) => value.clone(),
            Some(value) => value.to_string(),
            None => "without id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawOption {
    pub label: Option<String>,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Provider {
    Aws,
    Gcp,
    Azure,
    Oracle,
    Salesforce,
    Ml,
    DevOps,
    General,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "AWS",
            Self::Gcp => "GCP",
            Self::Azure => "Azure",
            Self::Oracle => "Oracle",
            Self::Salesforce => "Salesforce",
            Self::Ml => "ML",
            Self::DevOps => "DevOps",
            Self::General => "General",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classification {
    pub provider: Provider,
    pub certification: &'static str,
    pub category: &'static str,
    pub difficulty: Difficulty,
    pub tags: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionMetadata {
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<Value>,
    pub has_correct_answer: bool,
    pub extraction_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionRecord {
    pub label: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionRecord {
    pub text: String,
    pub explanation: String,
    pub classification: Classification,
    pub is_multiple_choice: bool,
    pub content_hash: String,
    pub metadata: QuestionMetadata,
    pub options: Vec<OptionRecord>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SkipReason {
    EmptyText,
    TooFewOptions(usize),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "question has no text"),
            Self::TooFewOptions(count) => write!(f, "question has {count} valid options, need at least 2"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RecordOutcome {
    Inserted,
    Updated,
    Skipped(SkipReason),
    Failed,
}
