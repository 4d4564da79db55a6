use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use super::db_setup::{DB_SCHEMA_VERSION, configure_connection, ensure_schema};
use super::discovery::find_files;
use super::pipeline::ImportPipeline;
use crate::cli::ImportArgs;
use crate::model::{ImportCounts, ImportPaths, ImportRunManifest};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: ImportArgs) -> Result<()> {
    if args.targets.is_empty() {
        bail!(
            "no input files given; usage: qbank import <file.json> [more.json | dir/*pattern*.json]..."
        );
    }

    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("import-{}", utc_compact_string(started_ts));

    info!(db_path = %args.db_path.display(), run_id = %run_id, "starting question import");

    let mut connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    let pipeline = ImportPipeline::new()?;

    let files = args
        .targets
        .iter()
        .flat_map(|target| find_files(target))
        .collect::<Vec<PathBuf>>();
    if files.is_empty() {
        warn!(targets = ?args.targets, "no question files matched the given targets");
    }

    let counts = pipeline.import_files(&mut connection, &files);
    log_summary(&counts);

    if let Some(summary_path) = &args.summary_path {
        let manifest = ImportRunManifest {
            manifest_version: 1,
            run_id,
            db_schema_version: DB_SCHEMA_VERSION.to_string(),
            status: if counts.errors == 0 {
                "completed".to_string()
            } else {
                "completed_with_errors".to_string()
            },
            started_at,
            finished_at: now_utc_string(),
            targets: args.targets.clone(),
            files: files.iter().map(|file| file.display().to_string()).collect(),
            paths: ImportPaths {
                db_path: args.db_path.display().to_string(),
                summary_path: summary_path.display().to_string(),
            },
            counts,
        };
        write_json_pretty(summary_path, &manifest)?;
        info!(path = %summary_path.display(), "wrote import run summary");
    }

    Ok(())
}

fn log_summary(counts: &ImportCounts) {
    info!(
        processed = counts.processed,
        inserted = counts.inserted,
        updated = counts.updated,
        skipped = counts.skipped,
        errors = counts.errors,
        "import summary"
    );

    if counts.errors > 0 {
        warn!(
            errors = counts.errors,
            "import finished with errors; see the log above for the affected files and questions"
        );
    } else {
        info!("import completed successfully");
    }
}
