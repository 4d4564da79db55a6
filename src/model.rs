use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportPaths {
    pub db_path: String,
    pub summary_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub targets: Vec<String>,
    pub files: Vec<String>,
    pub paths: ImportPaths,
    pub counts: ImportCounts,
}
