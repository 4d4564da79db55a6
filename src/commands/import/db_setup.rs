use anyhow::{Context, Result, bail};
use rusqlite::{Connection, Transaction};
use tracing::warn;

use crate::util::now_utc_string;

pub(crate) const DB_SCHEMA_VERSION: &str = "1.0.0";

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign_keys")?;
    Ok(())
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS questions (
              id TEXT PRIMARY KEY,
              question_text TEXT NOT NULL,
              explanation TEXT NOT NULL DEFAULT '',
              provider TEXT NOT NULL DEFAULT 'General',
              certification TEXT NOT NULL DEFAULT 'General',
              category TEXT NOT NULL DEFAULT 'General',
              difficulty TEXT NOT NULL DEFAULT 'medium',
              is_multiple_choice INTEGER NOT NULL DEFAULT 0,
              tags TEXT NOT NULL DEFAULT '[]',
              content_hash TEXT NOT NULL UNIQUE,
              metadata TEXT NOT NULL DEFAULT '{}',
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              is_active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS question_options (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              question_id TEXT NOT NULL,
              option_label TEXT NOT NULL,
              option_text TEXT NOT NULL,
              is_correct INTEGER NOT NULL DEFAULT 0,
              option_order INTEGER NOT NULL,
              FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS question_stats (
              question_id TEXT PRIMARY KEY,
              total_attempts INTEGER NOT NULL DEFAULT 0,
              correct_attempts INTEGER NOT NULL DEFAULT 0,
              average_time_seconds INTEGER NOT NULL DEFAULT 0,
              last_attempted TEXT,
              FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS question_tags (
              question_id TEXT NOT NULL,
              tag TEXT NOT NULL,
              PRIMARY KEY (question_id, tag),
              FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE
            );
            ",
        )
        .context("failed to create question tables")?;

    ensure_column_exists(connection, "questions", "is_active INTEGER NOT NULL DEFAULT 1")?;
    ensure_column_exists(connection, "question_stats", "last_attempted TEXT")?;

    connection
        .execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_questions_provider ON questions(provider);
            CREATE INDEX IF NOT EXISTS idx_questions_certification ON questions(certification);
            CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
            CREATE INDEX IF NOT EXISTS idx_questions_difficulty ON questions(difficulty);
            CREATE INDEX IF NOT EXISTS idx_questions_content_hash ON questions(content_hash);
            CREATE INDEX IF NOT EXISTS idx_question_options_question_id ON question_options(question_id, option_order);
            CREATE INDEX IF NOT EXISTS idx_question_tags_tag ON question_tags(tag, question_id);
            ",
        )
        .context("failed to create question indexes")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

fn ensure_column_exists(
    connection: &Connection,
    table_name: &str,
    column_definition: &str,
) -> Result<()> {
    let Some(column_name) = column_definition.split_whitespace().next() else {
        bail!("invalid column definition: {column_definition}");
    };

    let pragma_sql = format!("PRAGMA table_info({table_name})");
    let mut statement = connection
        .prepare(&pragma_sql)
        .with_context(|| format!("failed to inspect schema for table {table_name}"))?;

    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let existing_name: String = row.get(1)?;
        if existing_name == column_name {
            return Ok(());
        }
    }

    let alter_sql = format!("ALTER TABLE {table_name} ADD COLUMN {column_definition}");
    connection
        .execute(&alter_sql, [])
        .with_context(|| format!("failed to add column {column_name} on {table_name}"))?;

    Ok(())
}

/// Runs `work` inside one transaction: commit on `Ok`, roll back on `Err`.
pub(crate) fn with_transaction<T>(
    connection: &mut Connection,
    work: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = connection
        .transaction()
        .context("failed to begin transaction")?;

    match work(&tx) {
        Ok(value) => {
            tx.commit().context("failed to commit transaction")?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}

pub(crate) fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection
        .query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("failed to count rows: {sql}"))?;
    Ok(count)
}
