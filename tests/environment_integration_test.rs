mod common;

use common::{ScriptedPrompter, ScriptedRunner};
use repro_scaffold::core::environment;
use repro_scaffold::{
    CodePlatform, EnvManager, Language, ProjectAnswers, RemoteStorage, ScaffoldError,
    VersionControl,
};
use tempfile::TempDir;

fn answers(environment_manager: EnvManager, version_control: VersionControl) -> ProjectAnswers {
    ProjectAnswers {
        project_name: "Ocean Survey".to_string(),
        repo_name: "ocean-survey".to_string(),
        description: "Wave height analysis".to_string(),
        authors: "Ada Lovelace".to_string(),
        orcids: String::new(),
        version: "0.1.0".to_string(),
        license: "MIT".to_string(),
        programming_language: Language::Python,
        environment_manager,
        version_control,
        code_platform: CodePlatform::None,
        remote_storage: RemoteStorage::None,
    }
}

#[tokio::test]
async fn venv_is_created_and_seeded_with_notebook_tooling() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&["python3", "git", "ocean-survey/bin/pip"]);
    let prompter = ScriptedPrompter::new(&[], &[true]);

    let name = environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::Venv, VersionControl::Git),
    )
    .await
    .unwrap();

    assert_eq!(name.as_deref(), Some("ocean-survey"));
    assert!(runner.ran("python3 -m venv ocean-survey"));
    assert!(runner.ran("ocean-survey/bin/pip install jupyterlab"));
}

#[tokio::test]
async fn venv_installs_dvc_when_it_is_not_on_path() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&["python3", "ocean-survey/bin/pip"]);
    let prompter = ScriptedPrompter::new(&[], &[true]);

    environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::Venv, VersionControl::Dvc),
    )
    .await
    .unwrap();

    assert!(runner.ran("ocean-survey/bin/pip install jupyterlab dvc[all]"));
}

#[tokio::test]
async fn conda_environment_is_created_and_pip_seeded() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&["conda", "git"]);
    // Confirm creation, decline seeding from an environment file.
    let prompter = ScriptedPrompter::new(&[], &[true, false]);

    let name = environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::Conda, VersionControl::Git),
    )
    .await
    .unwrap();

    assert_eq!(name.as_deref(), Some("ocean-survey"));
    assert!(runner.ran("conda create -y -n ocean-survey python"));
    assert!(runner.ran("conda run -n ocean-survey pip install jupyterlab"));
}

#[tokio::test]
async fn declined_confirmation_skips_environment_creation() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&["python3"]);
    let prompter = ScriptedPrompter::new(&[], &[false]);

    let name = environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::Venv, VersionControl::Git),
    )
    .await
    .unwrap();

    assert_eq!(name, None);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn no_environment_manager_is_a_silent_skip() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&[]);
    let prompter = ScriptedPrompter::new(&[], &[]);

    let name = environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::None, VersionControl::Git),
    )
    .await
    .unwrap();

    assert_eq!(name, None);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn missing_virtualenv_tool_is_reported() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(&["python3"]);
    let prompter = ScriptedPrompter::new(&[], &[true]);

    let err = environment::setup_environment(
        &runner,
        &prompter,
        dir.path(),
        &answers(EnvManager::Virtualenv, VersionControl::Git),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScaffoldError::ToolMissing { tool } if tool == "virtualenv"));
}
