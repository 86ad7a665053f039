use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::error::Error;
use crate::schema::SegmentedDocument;
use crate::traits::SegmentLoader;
use crate::Result;

use super::json::JsonSegmentLoader;

/// Loader for directories of segment files
pub struct DirectorySegmentLoader {
    path: PathBuf,
    glob_pattern: String,
    recursive: bool,
}

impl DirectorySegmentLoader {
    /// Create a new directory loader matching `*.json`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            glob_pattern: "*.json".to_string(),
            recursive: false,
        }
    }

    /// Set the glob pattern for file names
    pub fn with_glob_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.glob_pattern = pattern.into();
        self
    }

    /// Enable or disable recursive directory traversal
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Find matching files, sorted by path
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        let pattern = glob::Pattern::new(&self.glob_pattern).map_err(|e| {
            Error::DocumentLoader(format!("Invalid glob pattern '{}': {}", self.glob_pattern, e))
        })?;

        let metadata = fs::metadata(&self.path).await.map_err(|e| {
            Error::DocumentLoader(format!("Failed to read directory metadata: {}", e))
        })?;

        if !metadata.is_dir() {
            return Err(Error::DocumentLoader(format!(
                "Path is not a directory: {}",
                self.path.display()
            )));
        }

        let mut files = Vec::new();
        let mut pending = vec![self.path.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir)
                .await
                .map_err(|e| Error::DocumentLoader(format!("Failed to read directory: {}", e)))?;

            while let Some(entry) = read_dir.next_entry().await? {
                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(file_type) => file_type,
                    Err(_) => continue, // Skip entries we can't read metadata for
                };

                // Symlinked files are followed, symlinked directories are not.
                let is_file = if file_type.is_symlink() {
                    match fs::metadata(&path).await {
                        Ok(meta) => meta.is_file(),
                        Err(_) => continue,
                    }
                } else {
                    file_type.is_file()
                };

                if is_file && matches_pattern(&pattern, &path) {
                    files.push(path);
                } else if file_type.is_dir() && self.recursive {
                    pending.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

fn matches_pattern(pattern: &glob::Pattern, path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| pattern.matches(name))
        .unwrap_or(false)
}

#[async_trait]
impl SegmentLoader for DirectorySegmentLoader {
    async fn load(&self) -> Result<Vec<SegmentedDocument>> {
        let mut documents = Vec::new();

        for path in self.discover().await? {
            match JsonSegmentLoader::new(&path).load().await {
                Ok(mut docs) => documents.append(&mut docs),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping segment file"),
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    fn write(path: &Path, content: &str) {
        std_fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b.json"), "[]");
        write(&dir.path().join("a.json"), "[]");
        write(&dir.path().join("notes.txt"), "ignored");
        std_fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested").join("c.json"), "[]");

        let flat = DirectorySegmentLoader::new(dir.path()).discover().await.unwrap();
        let names: Vec<String> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        let deep = DirectorySegmentLoader::new(dir.path())
            .with_recursive(true)
            .discover()
            .await
            .unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recursion_does_not_follow_directory_links() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std_fs::create_dir(&nested).unwrap();
        write(&nested.join("a.json"), "[]");
        symlink(dir.path(), nested.join("loop")).unwrap();
        symlink(nested.join("a.json"), dir.path().join("linked.json")).unwrap();

        let found = DirectorySegmentLoader::new(dir.path())
            .with_recursive(true)
            .discover()
            .await
            .unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.json".to_string()));
        assert!(names.contains(&"linked.json".to_string()));
    }

    #[tokio::test]
    async fn test_load_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("good.json"), r#"[{"text": "Kept."}]"#);
        write(&dir.path().join("bad.json"), r#"[{"body": "no text"}]"#);

        let docs = DirectorySegmentLoader::new(dir.path()).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source.ends_with("good.json"));
    }

    #[tokio::test]
    async fn test_invalid_pattern_and_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectorySegmentLoader::new(dir.path())
            .with_glob_pattern("[")
            .discover()
            .await;
        assert!(matches!(result, Err(Error::DocumentLoader(_))));

        let result = DirectorySegmentLoader::new(dir.path().join("missing"))
            .discover()
            .await;
        assert!(matches!(result, Err(Error::DocumentLoader(_))));
    }
}
