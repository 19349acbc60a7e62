//! Report discovery in conventional output locations.

use std::path::{Path, PathBuf};

/// Relative locations searched by [`find_report`], in precedence order.
pub const REPORT_CANDIDATES: &[&str] = &[
    // CI wrappers that redirect the JSON reporter
    "tmp/playwright.json",
    "playwright-report/report.json",
    "test-results/report.json",
    "playwright-report.json",
    "test-results.json",
    "playwright-report/results.json",
    "test-results/results.json",
];

/// Returns the first existing report under `root_dir`, if any.
///
/// Only checks for existence; the file is not opened.
pub fn find_report(root_dir: &Path) -> Option<PathBuf> {
    REPORT_CANDIDATES
        .iter()
        .map(|candidate| root_dir.join(candidate))
        .find(|path| {
            tracing::debug!("Probing for report at {}", path.display());
            path.exists()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "[]").unwrap();
    }

    #[test]
    fn test_no_report_found() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(find_report(temp_dir.path()), None);
    }

    #[test]
    fn test_single_candidate() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "test-results.json");

        assert_eq!(
            find_report(temp_dir.path()),
            Some(temp_dir.path().join("test-results.json"))
        );
    }

    #[test]
    fn test_precedence_order() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "test-results/results.json");
        touch(temp_dir.path(), "playwright-report.json");
        touch(temp_dir.path(), "test-results/report.json");

        assert_eq!(
            find_report(temp_dir.path()),
            Some(temp_dir.path().join("test-results/report.json"))
        );

        touch(temp_dir.path(), "tmp/playwright.json");
        assert_eq!(
            find_report(temp_dir.path()),
            Some(temp_dir.path().join("tmp/playwright.json"))
        );
    }

    #[test]
    fn test_results_json_fallbacks() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "test-results/results.json");
        touch(temp_dir.path(), "playwright-report/results.json");

        assert_eq!(
            find_report(temp_dir.path()),
            Some(temp_dir.path().join("playwright-report/results.json"))
        );
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "playwright-report/index.html");
        touch(temp_dir.path(), "results.json");

        assert_eq!(find_report(temp_dir.path()), None);
    }
}
