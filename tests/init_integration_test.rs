mod common;

use common::{ScriptedPrompter, ScriptedRunner};
use repro_scaffold::{ProjectAnswers, SetupEngine};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn answers_from_toml(scratch: &Path, code_platform: &str) -> ProjectAnswers {
    let path = scratch.join("answers.toml");
    fs::write(
        &path,
        format!(
            r#"
project_name = "Ocean Survey"
repo_name = "ocean-survey"
description = "Wave height analysis"
authors = "Ada Lovelace"
orcids = "0000-0002-1825-0097"
license = "MIT"
version_control = "Git"
code_platform = "{}"
"#,
            code_platform
        ),
    )
    .unwrap();
    ProjectAnswers::from_toml_file(&path).unwrap()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn init_scaffolds_layout_state_and_git_history() {
    let scratch = TempDir::new().unwrap();
    let project = scratch.path().join("ocean-survey");
    fs::create_dir_all(&project).unwrap();

    let runner = ScriptedRunner::new(&["git"]);
    // No global git identity is scripted, so the engine falls back to prompts.
    let prompter = ScriptedPrompter::new(&["Ada Lovelace", "ada@example.org"], &[]);
    let answers = answers_from_toml(scratch.path(), "None");

    SetupEngine::new(&runner, &prompter, project.clone(), answers)
        .run()
        .await
        .unwrap();

    for dir in [
        "data/raw",
        "data/interim",
        "data/processed",
        "data/external",
        "src",
        "notebooks",
        "docs",
        "reports/figures",
        "setup",
    ] {
        assert!(project.join(dir).is_dir(), "missing directory {}", dir);
    }
    assert!(project.join("data/raw/.gitkeep").is_file());
    assert!(project.join(".gitignore").is_file());
    assert!(project.join("src/data_collection.py").is_file());
    assert!(project.join("src/workflow.py").is_file());
    assert!(project.join("notebooks/workbook.ipynb").is_file());
    assert!(project.join("CITATION.cff").is_file());
    assert!(project.join("setup/file_descriptions.json").is_file());

    let cookiecutter = read(&project.join(".cookiecutter"));
    assert!(cookiecutter.contains("PROJECT_NAME=Ocean Survey"));
    assert!(cookiecutter.contains("VERSION_CONTROL=Git"));

    let dotenv = read(&project.join(".env"));
    assert!(dotenv.contains("PROJECT_PATH="));
    assert!(dotenv.contains("GIT_USER=Ada Lovelace"));
    assert!(dotenv.contains("GIT_EMAIL=ada@example.org"));

    let readme = read(&project.join("README.md"));
    assert!(readme.starts_with("# Ocean Survey"));
    assert!(readme.contains("## Project Tree"));
    assert!(readme.contains("src <- Source code for use in this project.<br>"));

    assert!(runner.ran("git config --global user.name Ada Lovelace"));
    assert!(runner.ran("git init"));
    assert!(runner.ran("git add -A"));
    assert!(runner.ran("git commit -m Initial commit"));
}

#[tokio::test]
async fn init_creates_platform_repo_when_cli_is_authenticated() {
    let scratch = TempDir::new().unwrap();
    let project = scratch.path().join("ocean-survey");
    // A pre-existing history stands in for the `git init` the scripted
    // runner cannot perform.
    fs::create_dir_all(project.join(".git")).unwrap();

    let runner = ScriptedRunner::new(&["git", "gh"])
        .with_response("git branch --show-current", 0, "master\n", "");
    let prompter = ScriptedPrompter::new(&["Ada Lovelace", "ada@example.org", "ada-lab"], &[]);
    let answers = answers_from_toml(scratch.path(), "GitHub");

    SetupEngine::new(&runner, &prompter, project.clone(), answers)
        .run()
        .await
        .unwrap();

    assert!(runner.ran("gh auth status"));
    assert!(runner.ran("git branch -m master main"));
    assert!(runner.ran("gh repo create ada-lab/ocean-survey --private"));
    assert!(runner.ran("git commit -m Update generated files"));

    let dotenv = read(&project.join(".env"));
    assert!(dotenv.contains("GITHUB_USER=ada-lab"));
    assert!(dotenv.contains("GITHUB_REPO=ocean-survey"));

    let citation = read(&project.join("CITATION.cff"));
    assert!(citation.contains("cff-version"));
    assert!(citation.contains("https://github.com/ada-lab/ocean-survey"));
    assert!(citation.contains("Lovelace"));
}

#[tokio::test]
async fn init_records_skipped_platform_when_cli_is_missing() {
    let scratch = TempDir::new().unwrap();
    let project = scratch.path().join("ocean-survey");
    fs::create_dir_all(project.join(".git")).unwrap();

    // gh is absent, so repository creation is skipped without failing init.
    let runner = ScriptedRunner::new(&["git"]);
    let prompter = ScriptedPrompter::new(&["Ada Lovelace", "ada@example.org"], &[]);
    let answers = answers_from_toml(scratch.path(), "GitHub");

    SetupEngine::new(&runner, &prompter, project.clone(), answers)
        .run()
        .await
        .unwrap();

    assert!(!runner.ran("gh"));
    let cookiecutter = read(&project.join(".cookiecutter"));
    assert!(cookiecutter.contains("CODE_REPO=None"));
}

#[tokio::test]
async fn init_is_idempotent_over_an_existing_readme() {
    let scratch = TempDir::new().unwrap();
    let project = scratch.path().join("ocean-survey");
    fs::create_dir_all(&project).unwrap();

    let runner = ScriptedRunner::new(&["git"]);
    let prompter = ScriptedPrompter::new(
        &["Ada Lovelace", "ada@example.org", "Ada Lovelace", "ada@example.org"],
        &[],
    );
    let answers = answers_from_toml(scratch.path(), "None");

    SetupEngine::new(&runner, &prompter, project.clone(), answers.clone())
        .run()
        .await
        .unwrap();

    let readme = project.join("README.md");
    let mut content = read(&readme);
    content = content.replace("Wave height analysis", "Hand-edited description");
    fs::write(&readme, &content).unwrap();

    SetupEngine::new(&runner, &prompter, project.clone(), answers)
        .run()
        .await
        .unwrap();

    // The second run refreshes the tree but leaves the edited prose alone.
    let after = read(&readme);
    assert!(after.contains("Hand-edited description"));
    assert!(!after.contains("Wave height analysis"));
    assert!(after.contains("## Project Tree"));
}
