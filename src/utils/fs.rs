use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn path_exists(base: &Path, relative: &str) -> bool {
    base.join(relative).exists()
}

/// Files directly inside `path` whose name ends with `ext`, sorted by name.
pub fn root_files_with_extension(path: &Path, ext: &str) -> Vec<PathBuf> {
    let dot_ext = if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };
    let mut results: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(&dot_ext))
        .map(|e| e.into_path())
        .collect();
    results.sort();
    results
}

pub fn has_root_file_with_extension(path: &Path, ext: &str) -> bool {
    !root_files_with_extension(path, ext).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_path_exists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.txt"), "hello").unwrap();
        assert!(path_exists(tmp.path(), "test.txt"));
        assert!(!path_exists(tmp.path(), "missing.txt"));
    }

    #[test]
    fn test_root_files_ignore_nested() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.sln"), "").unwrap();
        fs::write(tmp.path().join("a.sln"), "").unwrap();
        fs::write(tmp.path().join("sub/c.sln"), "").unwrap();
        fs::write(tmp.path().join("readme.md"), "").unwrap();
        let found = root_files_with_extension(tmp.path(), "sln");
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.sln", "b.sln"]);
    }

    #[test]
    fn test_directory_with_extension_is_not_a_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("weird.lpr")).unwrap();
        assert!(!has_root_file_with_extension(tmp.path(), ".lpr"));
    }
}
