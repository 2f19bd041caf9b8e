use crate::config::answers::ProjectAnswers;
use crate::config::env_store::EnvStore;
use crate::domain::model::{CodePlatform, RemoteStorage, VersionControl};
use crate::domain::ports::{CommandRunner, Prompter};
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::validate_path;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Paths annexed repos keep in plain git so code and docs stay editable.
const DATALAD_UNLOCKED: &[&str] = &[
    "src/**",
    "setup/**",
    "notebooks/**",
    "docs/**",
    "README.md",
    "CITATION.cff",
    "requirements.txt",
    "datasets.json",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// Dispatch on the chosen version-control system. `None` is a logged skip.
pub async fn setup_version_control(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
) -> Result<()> {
    match answers.version_control {
        VersionControl::Git => setup_git(runner, prompter, project_dir, answers, dotenv).await,
        VersionControl::Dvc => setup_dvc(runner, prompter, project_dir, answers, dotenv).await,
        VersionControl::Datalad => {
            setup_datalad(runner, prompter, project_dir, answers, dotenv).await
        }
        VersionControl::None => {
            tracing::info!("No version control selected; skipping");
            Ok(())
        }
    }
}

pub async fn setup_git(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
) -> Result<()> {
    if !runner.is_installed("git") {
        return Err(ScaffoldError::ToolMissing {
            tool: "git".to_string(),
        });
    }

    let identity = resolve_git_identity(runner, prompter, project_dir, dotenv).await?;
    dotenv.save("GIT_USER", &identity.name)?;
    dotenv.save("GIT_EMAIL", &identity.email)?;

    git_init(runner, project_dir, answers.code_platform).await?;
    git_commit(runner, project_dir, "Initial commit").await?;
    println!("Created the following commit : Initial commit");
    Ok(())
}

/// Resolve user.name/user.email: prefer the `.env` echo, then the existing
/// global config (confirmed interactively), then a prompt. Whatever wins is
/// written back to the global git config.
pub async fn resolve_git_identity(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    dotenv: &EnvStore,
) -> Result<GitIdentity> {
    if let (Some(name), Some(email)) = (dotenv.load("GIT_USER")?, dotenv.load("GIT_EMAIL")?) {
        let identity = GitIdentity { name, email };
        configure_git_identity(runner, project_dir, &identity).await?;
        return Ok(identity);
    }

    let current_name = git_config_get(runner, project_dir, "user.name").await;
    let current_email = git_config_get(runner, project_dir, "user.email").await;

    if let (Some(name), Some(email)) = (current_name, current_email) {
        println!(
            "Git is configured with user.name: {} and user.email: {}",
            name, email
        );
        let keep = prompter.ask_yes_no(&format!(
            "Do you want to keep the current Git user.name: {} and user.email: {}",
            name, email
        ))?;
        if keep {
            return Ok(GitIdentity { name, email });
        }
    }

    let name = prompter.ask_required("Enter your Git user.name:")?;
    let email = prompter.ask_required("Enter your Git user.email:")?;
    let identity = GitIdentity { name, email };
    configure_git_identity(runner, project_dir, &identity).await?;
    println!(
        "Git configured with name: {} and email: {}",
        identity.name, identity.email
    );
    Ok(identity)
}

async fn configure_git_identity(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    identity: &GitIdentity,
) -> Result<()> {
    runner
        .run_checked(
            "git",
            &["config", "--global", "user.name", &identity.name],
            project_dir,
        )
        .await?;
    runner
        .run_checked(
            "git",
            &["config", "--global", "user.email", &identity.email],
            project_dir,
        )
        .await?;
    Ok(())
}

async fn git_config_get(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    key: &str,
) -> Option<String> {
    let output = runner
        .run("git", &["config", "--global", key], project_dir)
        .await
        .ok()?;
    let value = output.stdout.trim();
    if output.success() && !value.is_empty() {
        Some(value.to_string())
    } else {
        None
    }
}

/// `git init` unless `.git` exists; GitHub repos get the `main` default
/// branch when git still initialized `master`.
pub async fn git_init(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    platform: CodePlatform,
) -> Result<()> {
    if !project_dir.join(".git").is_dir() {
        runner.run_checked("git", &["init"], project_dir).await?;
        println!("Initialized a new Git repository.");
    }

    if platform == CodePlatform::GitHub {
        let branch = runner
            .run("git", &["branch", "--show-current"], project_dir)
            .await?;
        if branch.stdout.trim() == "master" {
            runner
                .run_checked("git", &["branch", "-m", "master", "main"], project_dir)
                .await?;
            tracing::debug!("Renamed default branch master -> main");
        }
    }
    Ok(())
}

/// Stage everything and commit; an empty tree ("nothing to commit") is fine.
pub async fn git_commit(runner: &dyn CommandRunner, project_dir: &Path, msg: &str) -> Result<()> {
    runner.run_checked("git", &["add", "-A"], project_dir).await?;
    let output = runner
        .run("git", &["commit", "-m", msg], project_dir)
        .await?;
    if !output.success() {
        let text = format!("{}{}", output.stdout, output.stderr);
        if text.contains("nothing to commit") {
            tracing::debug!("Nothing to commit");
            return Ok(());
        }
        return Err(ScaffoldError::CommandFailed {
            program: "git".to_string(),
            status: output.status,
            stderr: output.stderr,
        });
    }
    Ok(())
}

/// Commit and push outstanding work; used after manifests are regenerated.
pub async fn git_push(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    has_remote: bool,
    msg: &str,
) -> Result<()> {
    if !project_dir.join(".git").is_dir() {
        return Ok(());
    }
    git_commit(runner, project_dir, msg).await?;
    if has_remote {
        let output = runner.run("git", &["push"], project_dir).await?;
        if !output.success() {
            println!("'git push' failed: {}", output.stderr.trim());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DVC

pub async fn setup_dvc(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
) -> Result<()> {
    setup_git(runner, prompter, project_dir, answers, dotenv).await?;

    if !runner.is_installed("dvc") {
        return Err(ScaffoldError::ToolMissing {
            tool: "dvc".to_string(),
        });
    }

    if project_dir.join(".dvc").is_dir() {
        println!("This is already a DVC project.");
        return Ok(());
    }
    runner.run_checked("dvc", &["init"], project_dir).await?;

    match answers.remote_storage {
        RemoteStorage::LocalPath => {
            if let Some(remote) = prompt_remote_path(prompter, &answers.repo_name, "DVC remote storage")? {
                runner
                    .run_checked(
                        "dvc",
                        &["remote", "add", "-d", "remote_storage", &remote.to_string_lossy()],
                        project_dir,
                    )
                    .await?;
            }
        }
        RemoteStorage::DeicStorage | RemoteStorage::Dropbox => {
            dvc_deic_storage(runner, prompter, project_dir).await?;
        }
        RemoteStorage::None => {}
    }

    for folder in ["data", "reports", "docs"] {
        runner.run_checked("dvc", &["add", folder], project_dir).await?;
    }

    git_commit(runner, project_dir, "Initial commit").await?;
    println!("Created an initial commit.");
    Ok(())
}

/// Deic Storage is an SFTP endpoint; the password lives in DVC's remote
/// config, not in the URL.
async fn dvc_deic_storage(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
) -> Result<()> {
    let email = prompter.ask_required("Please enter email to Deic Storage:")?;
    let password = prompter.ask_required("Please enter password to Deic Storage:")?;

    let url = format!("ssh://{}@sftp.storage.deic.dk:2222", email);
    runner
        .run_checked(
            "dvc",
            &["remote", "add", "-d", "deic_storage", &url],
            project_dir,
        )
        .await?;
    println!("DVC remote 'deic_storage' added successfully.");

    runner
        .run_checked(
            "dvc",
            &["remote", "modify", "deic_storage", "password", &password],
            project_dir,
        )
        .await?;
    println!("Password for DVC remote 'deic_storage' set successfully.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Datalad

pub async fn setup_datalad(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
) -> Result<()> {
    setup_git(runner, prompter, project_dir, answers, dotenv).await?;

    for tool in ["datalad", "git-annex", "rclone"] {
        if !runner.is_installed(tool) {
            return Err(ScaffoldError::ToolMissing {
                tool: tool.to_string(),
            });
        }
    }

    if project_dir.join(".datalad").is_dir() {
        println!("This is already a Datalad project.");
        return Ok(());
    }

    runner
        .run_checked("datalad", &["create", "--force"], project_dir)
        .await?;
    unlock_files(project_dir, DATALAD_UNLOCKED)?;
    runner
        .run_checked("datalad", &["save", "-m", "Initial commit"], project_dir)
        .await?;

    match answers.remote_storage {
        RemoteStorage::LocalPath => {
            if let Some(remote) =
                prompt_remote_path(prompter, &answers.repo_name, "Datalad remote storage (ria)")?
            {
                let store = format!("ria+file://{}", remote.to_string_lossy());
                runner
                    .run_checked(
                        "datalad",
                        &[
                            "create-sibling-ria",
                            "-s",
                            &answers.repo_name,
                            "--new-store-ok",
                            &store,
                        ],
                        project_dir,
                    )
                    .await?;
            }
        }
        RemoteStorage::DeicStorage | RemoteStorage::Dropbox => {
            let target = match answers.remote_storage {
                RemoteStorage::Dropbox => "dropbox",
                _ => "deic-storage",
            };
            runner
                .run_checked(
                    "git",
                    &[
                        "annex",
                        "initremote",
                        "storage",
                        "type=external",
                        "externaltype=rclone",
                        "chunk=50MiB",
                        "encryption=none",
                        &format!("target={}", target),
                        &format!("prefix={}", answers.repo_name),
                    ],
                    project_dir,
                )
                .await?;
            println!("git annex remote 'storage' created successfully.");
        }
        RemoteStorage::None => {}
    }

    Ok(())
}

fn unlock_files(project_dir: &Path, patterns: &[&str]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(project_dir.join(".gitattributes"))?;
    for pattern in patterns {
        writeln!(file, "{} annex.largefiles=nothing", pattern)?;
    }
    Ok(())
}

/// Ask for a remote-storage folder and make sure it ends with the repo name.
/// A pre-existing `<path>/<repo>` is rejected to avoid clobbering another
/// project's store.
fn prompt_remote_path(
    prompter: &dyn Prompter,
    repo_name: &str,
    label: &str,
) -> Result<Option<PathBuf>> {
    let answer = prompter.ask_required(&format!("Please enter the path to {}:", label))?;
    validate_path(label, answer.trim())?;
    let mut path = PathBuf::from(answer.trim());

    if path.file_name().map(|n| n.to_string_lossy() == repo_name) == Some(true) {
        if path.is_dir() {
            println!(
                "The path '{}' already exists with '{}' as the final folder.",
                path.display(),
                repo_name
            );
            return Ok(None);
        }
    } else {
        path = path.join(repo_name);
    }

    match std::fs::create_dir_all(&path) {
        Ok(()) => {
            println!("Created directory: {}", path.display());
            Ok(Some(path))
        }
        Err(e) => {
            println!("Failed to create the path '{}': {}", path.display(), e);
            Ok(None)
        }
    }
}
