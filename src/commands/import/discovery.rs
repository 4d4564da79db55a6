use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::error;

const QUESTION_FILE_SUFFIX: &str = ".json";

pub(crate) fn find_files(target: &str) -> Vec<PathBuf> {
    let path = Path::new(target);
    let Some(file_pattern) = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| name.contains('*'))
    else {
        return vec![path.to_path_buf()];
    };

    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let needle = file_pattern.replacen('*', "", 1);

    match list_matching_files(directory, &needle) {
        Ok(files) => files,
        Err(err) => {
            error!(
                pattern = %target,
                error = %format!("{err:#}"),
                "failed to search for question files"
            );
            Vec::new()
        }
    }
}

fn list_matching_files(directory: &Path, needle: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to read {}", directory.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", directory.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(needle) && name.ends_with(QUESTION_FILE_SUFFIX) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
