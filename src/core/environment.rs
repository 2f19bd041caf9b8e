use crate::config::answers::ProjectAnswers;
use crate::domain::model::{EnvManager, Language, VersionControl};
use crate::domain::ports::{CommandRunner, Prompter};
use crate::utils::error::{Result, ScaffoldError};
use std::path::{Path, PathBuf};

/// Create the language environment named after the repo. Returns the
/// environment name, or `None` when creation was skipped or declined.
pub async fn setup_environment(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
) -> Result<Option<String>> {
    if answers.environment_manager == EnvManager::None {
        return Ok(None);
    }

    let confirm = prompter.ask_yes_no(&format!(
        "Do you want to create a virtual environment named '{}' using {}?",
        answers.repo_name, answers.environment_manager
    ))?;
    if !confirm {
        println!("Virtual environment creation canceled.");
        return Ok(None);
    }

    let packages = pip_packages(runner, answers);

    match answers.environment_manager {
        EnvManager::Conda => setup_conda(runner, prompter, project_dir, answers, &packages).await?,
        EnvManager::Venv => {
            let python = find_python(runner)?;
            runner
                .run_checked(&python, &["-m", "venv", &answers.repo_name], project_dir)
                .await?;
            println!(
                "Venv environment \"{}\" created successfully.",
                answers.repo_name
            );
            pip_install_into(runner, project_dir, &answers.repo_name, &packages).await?;
        }
        EnvManager::Virtualenv => {
            if !runner.is_installed("virtualenv") {
                return Err(ScaffoldError::ToolMissing {
                    tool: "virtualenv".to_string(),
                });
            }
            runner
                .run_checked("virtualenv", &[&answers.repo_name], project_dir)
                .await?;
            println!(
                "Virtualenv environment \"{}\" created successfully.",
                answers.repo_name
            );
            pip_install_into(runner, project_dir, &answers.repo_name, &packages).await?;
        }
        EnvManager::None => unreachable!("handled above"),
    }

    Ok(Some(answers.repo_name.clone()))
}

/// Pip packages the answers imply: notebooks for Python work, plus the data
/// versioning tool when it is not already on PATH.
pub fn pip_packages(runner: &dyn CommandRunner, answers: &ProjectAnswers) -> Vec<String> {
    let mut packages = Vec::new();
    if answers.programming_language == Language::Python {
        packages.push("jupyterlab".to_string());
    }
    match answers.version_control {
        VersionControl::Dvc if !runner.is_installed("dvc") => {
            packages.push("dvc[all]".to_string());
        }
        VersionControl::Datalad if !runner.is_installed("datalad") => {
            packages.push("datalad".to_string());
        }
        _ => {}
    }
    packages
}

/// Conda packages the answers imply; tools already on PATH are not repeated
/// inside the environment.
pub fn conda_packages(runner: &dyn CommandRunner, answers: &ProjectAnswers) -> Vec<String> {
    let mut packages = vec!["python".to_string()];
    if answers.programming_language == Language::R {
        packages.push("r-base".to_string());
    }
    if answers.version_control != VersionControl::None && !runner.is_installed("git") {
        packages.push("git".to_string());
    }
    if answers.version_control == VersionControl::Datalad {
        if !runner.is_installed("rclone") {
            packages.push("rclone".to_string());
        }
        if !runner.is_installed("git-annex") {
            packages.push("git-annex".to_string());
        }
    }
    packages
}

async fn setup_conda(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    pip_packages: &[String],
) -> Result<()> {
    if !runner.is_installed("conda") {
        return Err(ScaffoldError::ToolMissing {
            tool: "conda".to_string(),
        });
    }

    if let Some(env_file) = ask_env_file(prompter)? {
        let file = env_file.to_string_lossy().into_owned();
        let args: Vec<&str> = if file.ends_with(".yml") || file.ends_with(".yaml") {
            vec!["env", "create", "-f", &file, "-n", &answers.repo_name]
        } else {
            vec!["create", "-y", "-n", &answers.repo_name, "--file", &file]
        };
        runner.run_checked("conda", &args, project_dir).await?;
        println!(
            "Conda environment \"{}\" created from {}.",
            answers.repo_name, file
        );
        return Ok(());
    }

    let conda_packages = conda_packages(runner, answers);
    let mut args = vec!["create", "-y", "-n", &answers.repo_name];
    args.extend(conda_packages.iter().map(String::as_str));
    runner.run_checked("conda", &args, project_dir).await?;
    println!("Conda environment \"{}\" created successfully.", answers.repo_name);

    if !pip_packages.is_empty() {
        let mut args = vec!["run", "-n", &answers.repo_name, "pip", "install"];
        args.extend(pip_packages.iter().map(String::as_str));
        runner.run_checked("conda", &args, project_dir).await?;
        println!("Packages {:?} installed successfully in the conda environment.", pip_packages);
    }
    Ok(())
}

/// Optionally seed the environment from a pre-existing `environment.yml` or
/// `requirements.txt`, re-asking while the given path does not check out.
fn ask_env_file(prompter: &dyn Prompter) -> Result<Option<PathBuf>> {
    let wants_file = prompter.ask_yes_no(
        "Do you want to create the environment from a pre-existing 'environment.yml' or 'requirements.txt' file?",
    )?;
    if !wants_file {
        return Ok(None);
    }

    let answer = prompter.ask_required("Please enter the path to a .yml or .txt file:")?;
    let path = PathBuf::from(answer.trim());
    if !path.is_file() {
        println!("The file does not exist; continuing without an environment file.");
        return Ok(None);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("yml" | "yaml" | "txt") => Ok(Some(path)),
        _ => {
            println!("Invalid file format; the file must be .yml or .txt.");
            Ok(None)
        }
    }
}

async fn pip_install_into(
    runner: &dyn CommandRunner,
    project_dir: &Path,
    env_name: &str,
    packages: &[String],
) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let pip = if cfg!(windows) {
        format!("{}\\Scripts\\pip", env_name)
    } else {
        format!("{}/bin/pip", env_name)
    };
    let mut args = vec!["install"];
    args.extend(packages.iter().map(String::as_str));
    runner.run_checked(&pip, &args, project_dir).await?;
    println!("Packages {:?} installed successfully in the environment.", packages);
    Ok(())
}

fn find_python(runner: &dyn CommandRunner) -> Result<String> {
    for candidate in ["python3", "python"] {
        if runner.is_installed(candidate) {
            return Ok(candidate.to_string());
        }
    }
    Err(ScaffoldError::ToolMissing {
        tool: "python".to_string(),
    })
}
