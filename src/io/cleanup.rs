//! Removal of previously rendered chart files.
//!
//! Only files this program writes are touched: `NYT_COVID_*.svg` directly in
//! the output directory (no recursion).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::CHART_FILE_PREFIX;
use crate::error::AppError;

/// Chart files under `dir` (deterministic order).
pub fn discover_chart_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read directory '{}': {e}", dir.display())))?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if is_file && is_chart_file(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Delete every chart file under `dir`; returns the deleted paths.
pub fn remove_chart_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let files = discover_chart_files(dir)?;
    for path in &files {
        fs::remove_file(path)
            .map_err(|e| AppError::new(2, format!("Failed to delete '{}': {e}", path.display())))?;
        debug!(path = %path.display(), "deleted chart file");
    }
    Ok(files)
}

fn is_chart_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    name.starts_with(CHART_FILE_PREFIX)
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target/test_out/cleanup").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn removes_only_rendered_charts() {
        let dir = scratch_dir("only_charts");
        for name in [
            "NYT_COVID_all_states_cases.svg",
            "NYT_COVID_texas_county_deaths.SVG",
            "notes.svg",
            "NYT_COVID_data.csv",
        ] {
            fs::write(dir.join(name), "x").unwrap();
        }
        fs::create_dir_all(dir.join("NYT_COVID_nested.svg")).unwrap();

        let removed = remove_chart_files(&dir).unwrap();
        let names: Vec<String> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["NYT_COVID_all_states_cases.svg", "NYT_COVID_texas_county_deaths.SVG"]
        );

        assert!(dir.join("notes.svg").exists());
        assert!(dir.join("NYT_COVID_data.csv").exists());
        assert!(dir.join("NYT_COVID_nested.svg").is_dir());
        assert!(discover_chart_files(&dir).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = remove_chart_files(Path::new("target/test_out/cleanup/does-not-exist")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
