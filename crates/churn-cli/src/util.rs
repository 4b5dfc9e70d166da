use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fail early when the input CSV is absent; warn when it does not look like
/// a CSV.
pub fn validate_csv_file(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("CSV not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    if ext.as_deref() != Some("csv") {
        log::warn!(
            "Input {} does not have a .csv extension; parsing it as comma-separated anyway",
            path.display()
        );
    }

    Ok(())
}

/// Absolute form of `dir`, which must already exist.
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize()
        .with_context(|| format!("Failed to resolve directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_csv_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().starts_with("CSV not found"));
    }

    #[test]
    fn existing_file_without_csv_extension_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        assert!(validate_csv_file(&path).is_ok());
    }

    #[test]
    fn resolved_dir_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_dir(dir.path()).unwrap().is_absolute());
    }
}
