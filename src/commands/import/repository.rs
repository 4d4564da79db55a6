use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use uuid::Uuid;

use super::db_setup::with_transaction;
use super::types::{OptionRecord, QuestionRecord};
use crate::util::now_utc_string;

pub(crate) fn find_question_by_hash(
    connection: &Connection,
    content_hash: &str,
) -> Result<Option<String>> {
    connection
        .query_row(
            "SELECT id FROM questions WHERE content_hash = ?1",
            [content_hash],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to look up question by hash {content_hash}"))
}

pub(crate) fn insert_question(connection: &mut Connection, record: &QuestionRecord) -> Result<String> {
    let question_id = Uuid::new_v4().to_string();
    let tags = serde_json::to_string(&record.classification.tags)
        .context("failed to serialize question tags")?;
    let metadata =
        serde_json::to_string(&record.metadata).context("failed to serialize question metadata")?;
    let now = now_utc_string();

    with_transaction(connection, |tx| {
        tx.execute(
            "
            INSERT INTO questions(
              id, question_text, explanation, provider, certification, category,
              difficulty, is_multiple_choice, tags, content_hash, metadata,
              created_at, updated_at
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            ",
            params![
                &question_id,
                &record.text,
                &record.explanation,
                record.classification.provider.as_str(),
                record.classification.certification,
                record.classification.category,
                record.classification.difficulty.as_str(),
                record.is_multiple_choice,
                &tags,
                &record.content_hash,
                &metadata,
                &now,
            ],
        )
        .context("failed to insert question")?;

        insert_options(tx, &question_id, &record.options)?;
        insert_tags(tx, &question_id, &record.classification.tags)?;

        tx.execute(
            "INSERT INTO question_stats(question_id) VALUES(?1)",
            [&question_id],
        )
        .context("failed to seed question stats")?;

        Ok(question_id.clone())
    })
}

pub(crate) fn update_question(
    connection: &mut Connection,
    question_id: &str,
    record: &QuestionRecord,
) -> Result<()> {
    let tags = serde_json::to_string(&record.classification.tags)
        .context("failed to serialize question tags")?;
    let metadata =
        serde_json::to_string(&record.metadata).context("failed to serialize question metadata")?;
    let now = now_utc_string();

    with_transaction(connection, |tx| {
        let updated = tx
            .execute(
                "
                UPDATE questions SET
                  question_text=?1,
                  explanation=?2,
                  provider=?3,
                  certification=?4,
                  category=?5,
                  difficulty=?6,
                  is_multiple_choice=?7,
                  tags=?8,
                  metadata=?9,
                  updated_at=?10
                WHERE id=?11
                ",
                params![
                    &record.text,
                    &record.explanation,
                    record.classification.provider.as_str(),
                    record.classification.certification,
                    record.classification.category,
                    record.classification.difficulty.as_str(),
                    record.is_multiple_choice,
                    &tags,
                    &metadata,
                    &now,
                    question_id,
                ],
            )
            .context("failed to update question")?;
        if updated != 1 {
            bail!("question {question_id} disappeared before update");
        }

        tx.execute(
            "DELETE FROM question_options WHERE question_id = ?1",
            [question_id],
        )
        .context("failed to delete previous options")?;

        insert_options(tx, question_id, &record.options)?;

        tx.execute(
            "DELETE FROM question_tags WHERE question_id = ?1",
            [question_id],
        )
        .context("failed to delete previous tags")?;

        insert_tags(tx, question_id, &record.classification.tags)
    })
}

fn insert_options(tx: &Transaction<'_>, question_id: &str, options: &[OptionRecord]) -> Result<()> {
    let mut statement = tx.prepare(
        "
        INSERT INTO question_options(
          question_id, option_label, option_text, is_correct, option_order
        )
        VALUES(?1, ?2, ?3, ?4, ?5)
        ",
    )?;

    for (order, option) in (1_i64..).zip(options) {
        statement
            .execute(params![
                question_id,
                &option.label,
                &option.text,
                option.is_correct,
                order
            ])
            .with_context(|| format!("failed to insert option {order} ({})", option.label))?;
    }

    Ok(())
}

fn insert_tags(tx: &Transaction<'_>, question_id: &str, tags: &[&str]) -> Result<()> {
    let mut statement =
        tx.prepare("INSERT INTO question_tags(question_id, tag) VALUES(?1, ?2)")?;

    for tag in tags {
        statement
            .execute(params![question_id, tag])
            .with_context(|| format!("failed to insert tag {tag}"))?;
    }

    Ok(())
}
