use crate::config::answers::ProjectAnswers;
use crate::domain::model::{CodePlatform, DatasetEntry};
use crate::utils::error::Result;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Entries never shown in the Project Tree.
pub const DEFAULT_IGNORES: &[&str] = &["bin", ".git", ".datalad", ".gitkeep", ".env", "__pycache__"];

const TREE_MARKER: &str = "------------";

// ---------------------------------------------------------------------------
// File descriptions

/// Lookup table annotating tree entries, persisted as
/// `setup/file_descriptions.json`.
#[derive(Debug, Clone, Default)]
pub struct FileDescriptions {
    map: BTreeMap<String, String>,
}

impl FileDescriptions {
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        if path.exists() {
            let map = serde_json::from_str(&fs::read_to_string(path)?)?;
            return Ok(Self { map });
        }
        let seeded = Self::seeded();
        seeded.save(path)?;
        Ok(seeded)
    }

    pub fn seeded() -> Self {
        let mut map = BTreeMap::new();
        for (name, desc) in [
            ("README.md", "The top-level README for developers using this project."),
            ("data", "Directory for datasets."),
            ("external", "Data from third-party sources."),
            ("interim", "Intermediate data transformed during the workflow."),
            ("processed", "The final, clean data used for analysis or modeling."),
            ("raw", "Original, immutable raw data."),
            ("docs", "Documentation files."),
            ("notebooks", "Notebooks for exploratory and explanatory work."),
            ("reports", "Generated reports, including figures."),
            ("figures", "Generated graphics and figures to be used in reporting."),
            ("requirements.txt", "The requirements file for reproducing the analysis environment."),
            ("src", "Source code for use in this project."),
            ("setup", "Scaffolding state and dependency manifests."),
            ("datasets.json", "Metadata for every registered raw dataset."),
            ("CITATION.cff", "Citation metadata for this project."),
        ] {
            map.insert(name.to_string(), desc.to_string());
        }
        Self { map }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.map)?)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, description: &str) {
        self.map.insert(name.to_string(), description.to_string());
    }

    /// Fold `<- description` annotations from an existing README tree back
    /// into the table, so hand-edits survive regeneration.
    pub fn harvest_from_readme(&mut self, readme_content: &str) -> usize {
        static ROW: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?:├──|└──)\s*(\S+)\s*<-\s*(.+?)\s*(?:<br>)?\s*$")
                .expect("row pattern is valid")
        });
        let mut harvested = 0;
        for line in readme_content.lines() {
            if let Some(caps) = ROW.captures(line) {
                self.insert(&caps[1], caps[2].trim());
                harvested += 1;
            }
        }
        harvested
    }
}

// ---------------------------------------------------------------------------
// README generation

/// Write the initial README, with the delimited Project Tree section and an
/// empty dataset list. An existing README is never touched.
pub fn generate_readme(answers: &ProjectAnswers, readme_path: &Path) -> Result<bool> {
    if readme_path.exists() {
        return Ok(false);
    }

    let clone = match answers.code_platform {
        CodePlatform::GitHub => format!(
            "git clone https://github.com/<username>/{}.git\ncd {}",
            answers.repo_name, answers.repo_name
        ),
        CodePlatform::GitLab => format!(
            "git clone https://gitlab.com/<username>/{}.git\ncd {}",
            answers.repo_name, answers.repo_name
        ),
        CodePlatform::None => format!("cd {}", answers.repo_name),
    };

    let content = format!(
        "# {name}\n\n{description}\n\n\
         ## Contact Information\n{contact}\n\n\
         ## Installation\n```\n{clone}\n```\n\
         ## Usage\n```\npython src/workflow.py\n```\n\
         ## Dataset list\n\n\
         ## Project Tree\n{marker}\n\n{marker}\n",
        name = answers.project_name,
        description = answers.description,
        contact = answers.authors,
        clone = clone,
        marker = TREE_MARKER,
    );
    fs::write(readme_path, content)?;
    tracing::info!("README.md created at {}", readme_path.display());
    Ok(true)
}

// ---------------------------------------------------------------------------
// Project tree

/// Render the project tree as the README's annotated bullet rows.
pub fn render_tree(root: &Path, ignores: &[&str], descriptions: &FileDescriptions) -> Result<Vec<String>> {
    let mut rows = vec![r#"<span style="font-size: 9px;">"#.to_string()];
    render_dir(root, "", ignores, descriptions, &mut rows)?;
    rows.push("</span>".to_string());
    Ok(rows)
}

fn render_dir(
    folder: &Path,
    prefix: &str,
    ignores: &[&str],
    descriptions: &FileDescriptions,
    rows: &mut Vec<String>,
) -> Result<()> {
    let mut items: Vec<String> = fs::read_dir(folder)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !ignores.contains(&name.as_str()))
        .collect();
    items.sort();

    let count = items.len();
    for (index, item) in items.into_iter().enumerate() {
        let is_last = index + 1 == count;
        let symbol = if is_last { "└── " } else { "├── " };
        let description = descriptions
            .get(&item)
            .map(|d| format!(" <- {}", d))
            .unwrap_or_default();
        rows.push(format!("{}{}{}{}<br> ", prefix, symbol, item, description));

        let child = folder.join(&item);
        if child.is_dir() {
            let child_prefix = if is_last {
                format!("{}&nbsp;&nbsp;&nbsp;&nbsp;", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            render_dir(&child, &child_prefix, ignores, descriptions, rows)?;
        }
    }
    Ok(())
}

/// Replace the tree between the `------------` markers. Absent markers are a
/// printed warning and a no-op, never an error.
pub fn update_tree_section(
    readme_path: &Path,
    root: &Path,
    ignores: &[&str],
    descriptions: &FileDescriptions,
) -> Result<bool> {
    if !readme_path.exists() {
        println!("README file '{}' does not exist.", readme_path.display());
        return Ok(false);
    }

    let content = fs::read_to_string(readme_path)?;
    let lines: Vec<&str> = content.lines().collect();

    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        if line.contains("Project Tree") && lines.get(i + 1).map(|l| l.trim()) == Some(TREE_MARKER) {
            start = Some(i + 2);
            break;
        }
    }
    let Some(start) = start else {
        println!("No 'Project Tree' section found in the README. No changes made.");
        return Ok(false);
    };

    let Some(end) = lines[start..]
        .iter()
        .position(|l| l.trim() == TREE_MARKER)
        .map(|off| start + off)
    else {
        println!("No closing line ('{}') found for 'Project Tree'. No changes made.", TREE_MARKER);
        return Ok(false);
    };

    let tree = render_tree(root, ignores, descriptions)?;
    let mut updated: Vec<String> = Vec::with_capacity(lines.len() + tree.len());
    updated.extend(lines[..start].iter().map(|s| s.to_string()));
    updated.extend(tree);
    updated.extend(lines[end..].iter().map(|s| s.to_string()));

    fs::write(readme_path, updated.join("\n") + "\n")?;
    tracing::info!("'Project Tree' section updated in {}", readme_path.display());
    Ok(true)
}

// ---------------------------------------------------------------------------
// Dataset tables

/// Compact table for the README and a full table for `dataset_list.md`.
pub fn dataset_tables(entries: &[DatasetEntry]) -> (String, String) {
    let mut compact = String::from("| Name | Location | Files | Size (MB) | Formats |\n|---|---|---|---|---|\n");
    let mut full = String::from(
        "| Name | Location | Files | Size (MB) | Formats | Source | DOI | Citation | License | Registered |\n|---|---|---|---|---|---|---|---|---|---|\n",
    );

    for entry in entries {
        let formats = entry.file_formats.join(", ");
        compact.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            entry.data_name, entry.destination, entry.number_of_files, entry.total_size_mb, formats
        ));
        full.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            entry.data_name,
            entry.destination,
            entry.number_of_files,
            entry.total_size_mb,
            formats,
            entry.source.as_deref().unwrap_or("-"),
            entry.doi.as_deref().unwrap_or("-"),
            entry.citation.as_deref().unwrap_or("-"),
            entry.license.as_deref().unwrap_or("-"),
            entry.timestamp.format("%Y-%m-%d"),
        ));
    }

    (compact, format!("# Dataset list\n\n{}", full))
}

/// Replace the body of `## Dataset list` up to the next `## ` heading; when
/// the heading is missing the section is appended instead.
pub fn update_dataset_section(readme_path: &Path, table: &str) -> Result<()> {
    let content = if readme_path.exists() {
        fs::read_to_string(readme_path)?
    } else {
        String::new()
    };

    let section = format!("## Dataset list\n\n{}", table.trim_end());
    let updated = replace_heading_section(&content, "## Dataset list", &section);
    fs::write(readme_path, updated)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Software requirements

/// One software block parsed from a `dependencies.txt` manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareGroup {
    pub software: String,
    pub install_cmd: Option<String>,
    pub dependencies: Vec<(String, String)>,
}

/// Parse the `Software version:` / `Install Command:` / `Dependencies:`
/// sections of a dependency manifest.
pub fn parse_dependencies_manifest(content: &str) -> Vec<SoftwareGroup> {
    let mut groups: Vec<SoftwareGroup> = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line == "Software version:" {
            if let Some(software) = lines.get(i + 1) {
                groups.push(SoftwareGroup {
                    software: software.trim().to_string(),
                    install_cmd: None,
                    dependencies: Vec::new(),
                });
                i += 2;
                continue;
            }
        } else if line == "Install Command:" {
            if let (Some(cmd), Some(group)) = (lines.get(i + 1), groups.last_mut()) {
                group.install_cmd = Some(cmd.trim().to_string());
                i += 2;
                continue;
            }
        } else if let Some((package, version)) = line.split_once("==") {
            if let Some(group) = groups.last_mut() {
                group
                    .dependencies
                    .push((package.trim().to_string(), version.trim().to_string()));
            }
        }
        i += 1;
    }

    groups
}

/// Render `### Software Requirements` from manifests paired with subheadings.
pub fn render_requirements_section(manifests: &[(Vec<SoftwareGroup>, &str)]) -> String {
    let mut section = String::from("### Software Requirements\n\n");
    section.push_str(&format!(
        "**The software below was installed on: {} ({})**\n",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));

    for (groups, heading) in manifests {
        if !heading.is_empty() {
            section.push_str(&format!("\n#### **{}**\n", heading));
        }
        for group in groups {
            if let Some(cmd) = &group.install_cmd {
                section.push_str(&format!(
                    "**To replicate the environment below, run '{}' as the initial step.**\n",
                    cmd
                ));
            }
            section.push_str(&format!("\n**{}**\n", group.software));
            for (package, version) in &group.dependencies {
                section.push_str(&format!("  - {}: {}\n", package, version));
            }
        }
        section.push_str("\n---\n");
    }

    section
}

/// Splice the requirements section: replaced from its heading to the next
/// `## ` heading (or EOF), appended when absent.
pub fn update_requirements_section(readme_path: &Path, section: &str) -> Result<()> {
    let content = if readme_path.exists() {
        fs::read_to_string(readme_path)?
    } else {
        String::new()
    };

    let updated = replace_heading_section(&content, "### Software Requirements", section.trim_end());
    fs::write(readme_path, updated)?;
    tracing::info!("{} successfully updated", readme_path.display());
    Ok(())
}

/// Replace from `heading` until the next `\n## ` heading or EOF; append the
/// replacement when the heading is absent.
fn replace_heading_section(content: &str, heading: &str, replacement: &str) -> String {
    if let Some(start) = content.find(heading) {
        let rest = &content[start + heading.len()..];
        let end = rest
            .find("\n## ")
            .map(|off| start + heading.len() + off)
            .unwrap_or(content.len());
        format!(
            "{}{}{}",
            &content[..start],
            replacement,
            &content[end..]
        )
    } else if content.is_empty() {
        format!("{}\n", replacement)
    } else {
        format!("{}\n\n{}\n", content.trim_end(), replacement)
    }
}
