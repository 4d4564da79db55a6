use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

use super::types::{RawOption, RawQuestion};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionInput {
    id: Option<Value>,
    question: Option<Value>,
    text: Option<Value>,
    explanation: Option<Value>,
    options: Option<Value>,
    correct_answer: Option<Value>,
    correct_answers: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionInput {
    label: Option<Value>,
    text: Option<Value>,
    is_correct: Option<Value>,
    correct: Option<Value>,
}

pub(crate) fn load_question_file(path: &Path) -> Result<Vec<RawQuestion>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    parse_question_document(document)
        .with_context(|| format!("unrecognized question file structure: {}", path.display()))
}

pub(crate) fn parse_question_document(document: Value) -> Result<Vec<RawQuestion>> {
    let elements = match document {
        Value::Array(elements) => elements,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(elements)) => elements,
            Some(_) => bail!("\"questions\" is not an array"),
            None => bail!("expected a \"questions\" array or a top-level array"),
        },
        _ => bail!("expected a \"questions\" array or a top-level array"),
    };

    Ok(elements.into_iter().map(normalize_question).collect())
}

fn normalize_question(element: Value) -> RawQuestion {
    let input: QuestionInput = serde_json::from_value(element).unwrap_or_default();

    let text = [input.question.as_ref(), input.text.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string();

    let explanation = input
        .explanation
        .as_ref()
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let options = match input.options {
        Some(Value::Array(items)) => items.into_iter().filter_map(normalize_option).collect(),
        _ => Vec::new(),
    };

    let correct_answers = match input.correct_answers {
        Some(Value::Array(items)) => Some(items.iter().filter_map(Value::as_i64).collect()),
        _ => None,
    };

    RawQuestion {
        source_id: input.id,
        text,
        explanation,
        options,
        correct_answer: input.correct_answer.as_ref().and_then(Value::as_i64),
        correct_answers,
    }
}

fn normalize_option(element: Value) -> Option<RawOption> {
    let input: OptionInput = serde_json::from_value(element).ok()?;
    let text = input.text.as_ref()?.as_str()?.to_string();

    let label = input
        .label
        .as_ref()
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let flagged = |value: &Option<Value>| value.as_ref().and_then(Value::as_bool).unwrap_or(false);

    Some(RawOption {
        label,
        text,
        is_correct: flagged(&input.is_correct) || flagged(&input.correct),
    })
}
