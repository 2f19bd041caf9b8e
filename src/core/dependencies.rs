use crate::core::readme;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use chrono::Local;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Top-level standard-library modules that must not end up in a requirements
/// manifest. Covers the modules research code actually imports.
const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "ast", "asyncio", "base64", "collections", "concurrent", "contextlib",
    "copy", "csv", "ctypes", "dataclasses", "datetime", "decimal", "difflib", "enum", "errno",
    "functools", "gc", "getpass", "glob", "gzip", "hashlib", "heapq", "html", "http", "importlib",
    "inspect", "io", "itertools", "json", "logging", "math", "multiprocessing", "os", "pathlib",
    "pickle", "platform", "pprint", "queue", "random", "re", "shlex", "shutil", "signal",
    "socket", "sqlite3", "statistics", "string", "struct", "subprocess", "sys", "sysconfig",
    "tarfile", "tempfile", "textwrap", "threading", "time", "traceback", "types", "typing",
    "unittest", "urllib", "uuid", "venv", "warnings", "xml", "zipfile",
];

/// Result of scanning one folder for imports.
#[derive(Debug, Clone)]
pub struct DependencyScan {
    pub python_version: String,
    /// Paths relative to the scanned folder.
    pub files: Vec<String>,
    /// Package name to pinned version, "Not available" when unresolved.
    pub packages: BTreeMap<String, String>,
}

/// Scan `folder` for `.py`/`.ipynb` files and resolve their third-party
/// imports against `pip freeze`. Returns `None` when the folder holds no
/// Python sources.
pub async fn scan_folder(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    folder: &Path,
) -> Result<Option<DependencyScan>> {
    let files = collect_source_files(folder)?;
    if files.is_empty() {
        println!("No Python files found in {}.", folder.display());
        return Ok(None);
    }
    tracing::info!("Scanning folder: {}", folder.display());

    let mut imports = BTreeSet::new();
    for file in &files {
        match read_code(file) {
            Ok(code) => imports.extend(extract_imports(&code)),
            // Best-effort static analysis: unreadable or malformed files are
            // reported and skipped, never fatal.
            Err(e) => println!("Skipping {} due to parse error: {}", file.display(), e),
        }
    }

    let script_names: BTreeSet<String> = files
        .iter()
        .filter_map(|f| f.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();

    let installed = pip_freeze(runner, project_dir).await;
    let python_version = python_version(runner, project_dir).await;

    let mut packages = BTreeMap::new();
    for module in imports {
        if PYTHON_STDLIB.contains(&module.as_str()) {
            continue;
        }
        match installed.get(&normalize_package(&module)) {
            Some(version) => {
                packages.insert(module, version.clone());
            }
            None => {
                // Local scripts import each other; those are not packages.
                if !script_names.contains(&module) {
                    packages.insert(module, "Not available".to_string());
                }
            }
        }
    }

    let mut relative: Vec<String> = files
        .iter()
        .map(|f| {
            f.strip_prefix(folder)
                .unwrap_or(f)
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    relative.sort();

    Ok(Some(DependencyScan {
        python_version,
        files: relative,
        packages,
    }))
}

/// Write the `dependencies.txt` manifest for one scan.
pub fn write_manifest(scan: &DependencyScan, out_file: &Path, install_cmd: Option<&str>) -> Result<()> {
    let mut content = String::new();
    content.push_str("Software version:\n");
    content.push_str(&format!("{}\n\n", scan.python_version));
    if let Some(cmd) = install_cmd {
        content.push_str("Install Command:\n");
        content.push_str(&format!("{}\n\n", cmd));
    }
    content.push_str(&format!(
        "Timestamp: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    content.push_str("Files checked:\n");
    content.push_str(&scan.files.join("\n"));
    content.push_str("\n\nDependencies:\n");
    for (package, version) in &scan.packages {
        content.push_str(&format!("{}=={}\n", package, version));
    }

    fs::write(out_file, content)?;
    println!("Dependency manifest generated at {}", out_file.display());
    Ok(())
}

/// Pin every resolvable package into `requirements.txt`.
pub fn write_requirements_txt(scans: &[&DependencyScan], path: &Path) -> Result<()> {
    let mut pinned = BTreeMap::new();
    for scan in scans {
        for (package, version) in &scan.packages {
            if version != "Not available" {
                pinned.insert(package.clone(), version.clone());
            }
        }
    }

    let mut content = String::new();
    for (package, version) in pinned {
        content.push_str(&format!("{}=={}\n", package, version));
    }
    fs::write(path, content)?;
    Ok(())
}

/// The `update-dependencies` operation: scan `src/` and `notebooks/`, write
/// their manifests and `requirements.txt`, and patch the README requirements
/// section.
pub async fn update_dependencies(runner: &dyn CommandRunner, project_dir: &Path) -> Result<()> {
    let mut manifests = Vec::new();

    for (folder, heading) in [("src", "src"), ("notebooks", "notebooks")] {
        let folder_path = project_dir.join(folder);
        if !folder_path.is_dir() {
            continue;
        }
        println!("Screening './{}' for dependencies", folder);
        if let Some(scan) = scan_folder(runner, project_dir, &folder_path).await? {
            let manifest_path = folder_path.join("dependencies.txt");
            write_manifest(&scan, &manifest_path, Some("pip install -r requirements.txt"))?;
            manifests.push((scan, heading, manifest_path));
        }
    }

    if manifests.is_empty() {
        println!("Nothing to scan; requirements left unchanged.");
        return Ok(());
    }

    let scans: Vec<&DependencyScan> = manifests.iter().map(|(s, _, _)| s).collect();
    write_requirements_txt(&scans, &project_dir.join("requirements.txt"))?;

    // The README section is rendered from the manifests on disk, not the
    // in-memory scans.
    let mut groups: Vec<(Vec<readme::SoftwareGroup>, &str)> = Vec::new();
    for (_, heading, manifest_path) in &manifests {
        let content = fs::read_to_string(manifest_path)?;
        groups.push((readme::parse_dependencies_manifest(&content), *heading));
    }
    let section = readme::render_requirements_section(&groups);
    readme::update_requirements_section(&project_dir.join("README.md"), &section)?;

    Ok(())
}

fn collect_source_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(folder, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if name != "__pycache__" && name != ".ipynb_checkpoints" {
                walk(&path, files)?;
            }
        } else if matches!(path.extension().and_then(|e| e.to_str()), Some("py" | "ipynb")) {
            files.push(path);
        }
    }
    Ok(())
}

fn read_code(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("ipynb") {
        return extract_code_from_notebook(&raw);
    }
    Ok(raw)
}

/// Notebooks are JSON; only code cells carry imports.
fn extract_code_from_notebook(raw: &str) -> Result<String> {
    let notebook: serde_json::Value = serde_json::from_str(raw)?;
    let mut code = String::new();
    if let Some(cells) = notebook["cells"].as_array() {
        for cell in cells {
            if cell["cell_type"].as_str() != Some("code") {
                continue;
            }
            match &cell["source"] {
                serde_json::Value::Array(lines) => {
                    for line in lines {
                        if let Some(text) = line.as_str() {
                            code.push_str(text);
                        }
                    }
                    code.push('\n');
                }
                serde_json::Value::String(text) => {
                    code.push_str(text);
                    code.push('\n');
                }
                _ => {}
            }
        }
    }
    Ok(code)
}

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+(.+)$").expect("pattern is valid"));
static FROM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import\s").expect("pattern is valid")
});

/// Top-level module names from `import a.b as c, d` and `from x.y import z`.
pub fn extract_imports(code: &str) -> BTreeSet<String> {
    let mut modules = BTreeSet::new();
    for line in code.lines() {
        if let Some(caps) = FROM_LINE.captures(line) {
            modules.insert(top_level(&caps[1]));
        } else if let Some(caps) = IMPORT_LINE.captures(line) {
            for part in caps[1].split(',') {
                let name = part.split_whitespace().next().unwrap_or("");
                if !name.is_empty()
                    && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                {
                    modules.insert(top_level(name));
                }
            }
        }
    }
    modules
}

fn top_level(module: &str) -> String {
    module.split('.').next().unwrap_or(module).to_string()
}

/// Distribution names differ from import names in dash/underscore and case.
fn normalize_package(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

async fn pip_freeze(runner: &dyn CommandRunner, cwd: &Path) -> BTreeMap<String, String> {
    let Some(python) = find_python(runner) else {
        println!("Python was not found; versions will be reported as 'Not available'.");
        return BTreeMap::new();
    };

    match runner.run(&python, &["-m", "pip", "freeze"], cwd).await {
        Ok(output) if output.success() => output
            .stdout
            .lines()
            .filter_map(|line| line.split_once("=="))
            .map(|(name, version)| (normalize_package(name.trim()), version.trim().to_string()))
            .collect(),
        _ => {
            println!("'pip freeze' failed; versions will be reported as 'Not available'.");
            BTreeMap::new()
        }
    }
}

async fn python_version(runner: &dyn CommandRunner, cwd: &Path) -> String {
    if let Some(python) = find_python(runner) {
        if let Ok(output) = runner.run(&python, &["--version"], cwd).await {
            if output.success() {
                // Old interpreters print the version banner to stderr.
                let text = if output.stdout.trim().is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                return text.trim().to_string();
            }
        }
    }
    "Python (version unknown)".to_string()
}

fn find_python(runner: &dyn CommandRunner) -> Option<String> {
    for candidate in ["python3", "python"] {
        if runner.is_installed(candidate) {
            return Some(candidate.to_string());
        }
    }
    None
}
