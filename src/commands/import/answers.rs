use anyhow::{Context, Result};
use regex::Regex;

use super::types::RawQuestion;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum AnswerSource {
    CorrectAnswer,
    CorrectAnswers,
    OptionFlags,
    Explanation,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedAnswers {
    pub indices: Vec<i64>,
    pub source: AnswerSource,
}

impl ResolvedAnswers {
    pub fn is_resolved(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.indices.len() > 1
    }

    pub fn contains(&self, option_index: usize) -> bool {
        i64::try_from(option_index)
            .map(|index| self.indices.contains(&index))
            .unwrap_or(false)
    }
}

pub(crate) struct AnswerResolver {
    letter_token: Regex,
}

impl AnswerResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            letter_token: Regex::new(r"(?-u:\b)([A-Z])\.")
                .context("failed to compile answer letter regex")?,
        })
    }

    /// Strict precedence: the first signal that yields anything wins and
    /// later signals are never consulted, even when they disagree.
    pub fn resolve(&self, question: &RawQuestion) -> ResolvedAnswers {
        let candidates: [(AnswerSource, Vec<i64>); 2] = [
            (AnswerSource::CorrectAnswer, question.correct_answer.into_iter().collect()),
            (
                AnswerSource::CorrectAnswers,
                question.correct_answers.clone().unwrap_or_default(),
            ),
        ];
        for (source, indices) in candidates {
            if !indices.is_empty() {
                return resolved(source, indices);
            }
        }

        let flagged = question
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct)
            .filter_map(|(index, _)| i64::try_from(index).ok())
            .collect::<Vec<i64>>();
        if !flagged.is_empty() {
            return resolved(AnswerSource::OptionFlags, flagged);
        }

        let from_explanation = question
            .explanation
            .as_deref()
            .map(|explanation| self.letters_in(explanation, question.options.len()))
            .unwrap_or_default();
        if !from_explanation.is_empty() {
            return resolved(AnswerSource::Explanation, from_explanation);
        }

        ResolvedAnswers {
            indices: Vec::new(),
            source: AnswerSource::Unresolved,
        }
    }

    fn letters_in(&self, explanation: &str, option_count: usize) -> Vec<i64> {
        self.letter_token
            .captures_iter(explanation)
            .filter_map(|captures| captures.get(1))
            .filter_map(|letter| letter.as_str().bytes().next())
            .map(|letter| usize::from(letter - b'A'))
            .filter(|index| *index < option_count)
            .filter_map(|index| i64::try_from(index).ok())
            .collect()
    }
}

fn resolved(source: AnswerSource, indices: Vec<i64>) -> ResolvedAnswers {
    let mut unique = Vec::with_capacity(indices.len());
    for index in indices {
        if !unique.contains(&index) {
            unique.push(index);
        }
    }

    ResolvedAnswers {
        indices: unique,
        source,
    }
}
