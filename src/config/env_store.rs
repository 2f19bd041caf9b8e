use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// KEY=VALUE line store backing `.env` (discovered state: tool paths, git
/// user, platform user/repo) and `.cookiecutter` (echo of the project
/// answers). Keys are upper-cased; saving updates in place or appends;
/// last writer wins.
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
}

impl EnvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn dotenv(project_dir: &Path) -> Self {
        Self::new(project_dir.join(".env"))
    }

    pub fn cookiecutter(project_dir: &Path) -> Self {
        Self::new(project_dir.join(".cookiecutter"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look a key up, case-insensitively. A missing file reads as empty.
    pub fn load(&self, key: &str) -> Result<Option<String>> {
        let wanted = key.trim().to_uppercase();
        for (name, value) in self.entries()? {
            if name == wanted {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Update the key in place if present (case-insensitively), else append.
    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        let wanted = key.trim().to_uppercase();
        let mut lines: Vec<String> = if self.path.exists() {
            fs::read_to_string(&self.path)?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let mut updated = false;
        for line in lines.iter_mut() {
            if let Some((name, _)) = line.split_once('=') {
                if name.trim().to_uppercase() == wanted {
                    *line = format!("{}={}", wanted, value);
                    updated = true;
                    break;
                }
            }
        }
        if !updated {
            lines.push(format!("{}={}", wanted, value));
        }

        fs::write(&self.path, lines.join("\n") + "\n")?;
        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                line.split_once('=')
                    .map(|(k, v)| (k.trim().to_uppercase(), v.trim().to_string()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_appends_then_updates_in_place() {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::dotenv(dir.path());

        store.save("git_user", "ada").unwrap();
        store.save("GIT_EMAIL", "ada@example.org").unwrap();
        assert_eq!(store.load("GIT_USER").unwrap().as_deref(), Some("ada"));

        // Case-insensitive update keeps a single line per key.
        store.save("Git_User", "grace").unwrap();
        assert_eq!(store.load("git_user").unwrap().as_deref(), Some("grace"));
        assert_eq!(store.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::cookiecutter(dir.path());
        assert_eq!(store.load("PROJECT_NAME").unwrap(), None);
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# comment\n\nPROJECT_PATH=/tmp/p\n").unwrap();
        let store = EnvStore::new(&path);
        assert_eq!(
            store.load("project_path").unwrap().as_deref(),
            Some("/tmp/p")
        );
        assert_eq!(store.entries().unwrap().len(), 1);
    }
}
