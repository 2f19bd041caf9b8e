use crate::core::readme;
use crate::domain::model::DatasetEntry;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::validate_url;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The `datasets.json` array, loaded and saved as a whole.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    path: PathBuf,
}

impl DatasetRegistry {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            path: project_dir.join("datasets.json"),
        }
    }

    /// A missing file reads as an empty array.
    pub fn load(&self) -> Result<Vec<DatasetEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(&self.path)?)?)
    }

    /// Replace the matching entry or append a new one. Returns true when an
    /// existing entry was updated.
    pub fn upsert(&self, entry: DatasetEntry) -> Result<bool> {
        let mut entries = self.load()?;
        let updated = if let Some(existing) = entries.iter_mut().find(|e| e.same_dataset(&entry)) {
            *existing = entry.clone();
            println!("Updated existing dataset entry for {}.", entry.data_name);
            true
        } else {
            println!("Added new dataset entry for {}.", entry.data_name);
            entries.push(entry);
            false
        };
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::info!("Metadata saved to {}", self.path.display());
        Ok(updated)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetDatasetParams {
    pub name: String,
    pub source: Option<String>,
    pub run_command: Option<String>,
    pub destination: Option<String>,
    pub doi: Option<String>,
    pub citation: Option<String>,
    pub license: Option<String>,
}

/// Register or refresh one raw dataset: ensure the destination, optionally run
/// the download command, inventory the files, upsert `datasets.json` and
/// regenerate the dataset tables.
pub async fn set_dataset(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    params: SetDatasetParams,
) -> Result<DatasetEntry> {
    if let Some(source) = &params.source {
        if source.contains("://") {
            validate_url("source", source)?;
        }
    }

    let destination = params
        .destination
        .clone()
        .unwrap_or_else(|| format!("./data/raw/{}", sanitize_folder_name(&params.name)));
    let dest_path = project_dir.join(destination.trim_start_matches("./"));
    // A destination may be a single loose file rather than a folder.
    if !dest_path.is_file() {
        fs::create_dir_all(&dest_path)?;
    }

    let before = list_entries(&dest_path)?;

    let mut stored_command = None;
    if let Some(run_command) = &params.run_command {
        let mut parts: Vec<String> = run_command.split_whitespace().map(str::to_string).collect();
        let program = parts
            .first()
            .cloned()
            .ok_or_else(|| ScaffoldError::ConfigError {
                message: "download command is empty".to_string(),
            })?;
        if !runner.is_installed(&program) {
            return Err(ScaffoldError::ToolMissing { tool: program });
        }
        if let Some(source) = &params.source {
            parts.push(source.clone());
        }
        parts.push(dest_path.to_string_lossy().into_owned());

        let args: Vec<&str> = parts.iter().skip(1).map(String::as_str).collect();
        let output = runner.run_checked(&program, &args, project_dir).await?;
        if !output.stdout.trim().is_empty() {
            println!("Command output:\n{}", output.stdout);
        }
        stored_command = Some(parts.join(" "));
    }

    let after = list_entries(&dest_path)?;
    let data_files: Vec<String> = if params.run_command.is_some() {
        after.difference(&before).cloned().collect()
    } else {
        after.iter().cloned().collect()
    };

    let (number_of_files, total_size_mb, file_formats) = inventory(&dest_path)?;

    // Replication packages with very large file counts are better shipped as
    // archives; mirror the guidance printed by data-deposit checklists.
    if number_of_files > 1000 {
        println!(
            "It is recommended to zip datasets with >1000 files when creating a replication package."
        );
    }

    let entry = DatasetEntry {
        data_name: params.name.clone(),
        destination,
        hash: git_path_hash(runner, project_dir, &dest_path).await,
        number_of_files,
        total_size_mb,
        file_formats,
        data_files,
        timestamp: Utc::now(),
        source: params.source,
        run_command: stored_command,
        doi: params.doi,
        citation: params.citation,
        license: params.license,
    };

    let registry = DatasetRegistry::new(project_dir);
    registry.upsert(entry.clone())?;
    refresh_dataset_outputs(project_dir)?;

    Ok(entry)
}

/// No-argument `set-dataset`: re-register everything already under
/// `data/raw/`, skipping git bookkeeping files.
pub async fn register_all_raw(runner: &dyn CommandRunner, project_dir: &Path) -> Result<usize> {
    let raw_dir = project_dir.join("data/raw");
    if !raw_dir.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    let mut names: Vec<String> = fs::read_dir(&raw_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with(".git") && name != ".gitkeep")
        .collect();
    names.sort();

    for name in names {
        let params = SetDatasetParams {
            name: name.clone(),
            destination: Some(format!("./data/raw/{}", name)),
            ..Default::default()
        };
        set_dataset(runner, project_dir, params).await?;
        count += 1;
    }
    Ok(count)
}

/// Regenerate the README dataset table and `dataset_list.md` from the
/// registry.
pub fn refresh_dataset_outputs(project_dir: &Path) -> Result<()> {
    let entries = DatasetRegistry::new(project_dir).load()?;
    let (compact, full) = readme::dataset_tables(&entries);
    readme::update_dataset_section(&project_dir.join("README.md"), &compact)?;
    fs::write(project_dir.join("dataset_list.md"), full)?;
    Ok(())
}

fn list_entries(path: &Path) -> Result<BTreeSet<String>> {
    if path.is_file() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(BTreeSet::from([name]));
    }
    Ok(fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect())
}

/// File count, total size in whole MiB and the extension set of the files
/// directly inside `path` (or of `path` itself when it is a single file).
fn inventory(path: &Path) -> Result<(usize, u64, Vec<String>)> {
    let mut count = 0;
    let mut total_bytes = 0u64;
    let mut formats = BTreeSet::new();

    if path.is_file() {
        let meta = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some((_, ext)) = name.rsplit_once('.') {
            formats.insert(format!(".{}", ext.to_lowercase()));
        }
        return Ok((1, meta.len() / (1024 * 1024), formats.into_iter().collect()));
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        count += 1;
        total_bytes += meta.len();
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some((_, ext)) = name.rsplit_once('.') {
            formats.insert(format!(".{}", ext.to_lowercase()));
        }
    }

    Ok((count, total_bytes / (1024 * 1024), formats.into_iter().collect()))
}

pub fn sanitize_folder_name(name: &str) -> String {
    name.replace([' ', '/', '\\', ':'], "_")
}

/// Hash of the last commit touching the destination, when git history exists.
async fn git_path_hash(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    dest: &Path,
) -> Option<String> {
    let dest = dest.to_string_lossy().into_owned();
    let output = runner
        .run(
            "git",
            &["log", "-1", "--pretty=%H", "--", dest.as_str()],
            project_dir,
        )
        .await
        .ok()?;
    let hash = output.stdout.trim();
    if output.success() && !hash.is_empty() {
        Some(hash.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("ocean survey/v1"), "ocean_survey_v1");
        assert_eq!(sanitize_folder_name("plain"), "plain");
    }

    #[test]
    fn test_inventory_counts_files_only() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("a.CSV"), vec![0u8; 1024]).unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let (count, size_mb, formats) = inventory(dir.path()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(size_mb, 0);
        assert_eq!(formats, vec![".csv".to_string(), ".json".to_string()]);
    }
}
