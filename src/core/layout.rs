use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Directories every scaffolded project starts with.
pub const PROJECT_DIRS: &[&str] = &[
    "data/raw",
    "data/interim",
    "data/processed",
    "data/external",
    "src",
    "notebooks",
    "docs",
    "reports/figures",
    "setup",
];

const GITIGNORE: &str = "\
# Environment and state files
.env
bin/
__pycache__/
*.pyc
.ipynb_checkpoints/

# Environment managers
env/
venv/
.venv/

# Data is tracked by dvc/datalad, not git
data/interim/
data/processed/
";

/// Create the project layout. Existing directories are left alone; data
/// directories get a `.gitkeep` so empty folders survive a git clone.
pub fn create_layout(project_dir: &Path) -> Result<()> {
    for dir in PROJECT_DIRS {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)?;
        if dir.starts_with("data/") || *dir == "reports/figures" {
            let keep = path.join(".gitkeep");
            if !keep.exists() {
                fs::write(keep, "")?;
            }
        }
    }

    let gitignore = project_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(gitignore, GITIGNORE)?;
    }

    tracing::info!("Project layout created under {}", project_dir.display());
    Ok(())
}
