use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::import::{DB_SCHEMA_VERSION, count_rows};

pub fn run(args: StatusArgs) -> Result<()> {
    info!(db_path = %args.db_path.display(), "status requested");

    if !args.db_path.exists() {
        bail!("database file missing: {}", args.db_path.display());
    }

    let conn = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    let schema_version = read_metadata(&conn, "db_schema_version")?.unwrap_or_default();
    let updated_at = read_metadata(&conn, "db_updated_at")?.unwrap_or_default();
    if schema_version != DB_SCHEMA_VERSION {
        warn!(
            found = %schema_version,
            expected = DB_SCHEMA_VERSION,
            "database schema version differs from this build"
        );
    }

    let questions = count_rows(&conn, "SELECT COUNT(*) FROM questions")?;
    let options = count_rows(&conn, "SELECT COUNT(*) FROM question_options")?;
    let stats = count_rows(&conn, "SELECT COUNT(*) FROM question_stats")?;
    let unanswered = count_rows(
        &conn,
        "SELECT COUNT(*) FROM questions WHERE json_extract(metadata, '$.hasCorrectAnswer') = 0",
    )?;

    info!(
        path = %args.db_path.display(),
        schema_version = %schema_version,
        updated_at = %updated_at,
        questions,
        options,
        stats,
        unanswered,
        "database status"
    );

    for (provider, count) in provider_counts(&conn)? {
        info!(provider = %provider, questions = count, "questions by provider");
    }

    Ok(())
}

fn read_metadata(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .with_context(|| format!("failed to read metadata key {key}"))
}

fn provider_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut statement = conn.prepare(
        "SELECT provider, COUNT(*) FROM questions GROUP BY provider ORDER BY COUNT(*) DESC, provider",
    )?;
    let rows = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, i64)>>>()
        .context("failed to count questions by provider")?;
    Ok(rows)
}
