use crate::config::answers::ProjectAnswers;
use crate::config::env_store::EnvStore;
use crate::domain::model::{CodePlatform, VersionControl};
use crate::domain::ports::{CommandRunner, Prompter};
use crate::utils::error::Result;
use std::path::Path;

/// Create the platform repository with `gh`/`glab` and push the initial
/// history. Best-effort: any failure records `CODE_REPO=None` in the answer
/// echo and returns false rather than aborting the scaffold.
pub async fn setup_remote_repository(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
    cookiecutter: &EnvStore,
) -> Result<bool> {
    if answers.version_control == VersionControl::None || !project_dir.join(".git").is_dir() {
        return Ok(false);
    }

    let created = match answers.code_platform {
        CodePlatform::GitHub => {
            create_platform_repo(runner, prompter, project_dir, answers, dotenv, "gh", "GitHub").await?
        }
        CodePlatform::GitLab => {
            create_platform_repo(runner, prompter, project_dir, answers, dotenv, "glab", "GitLab").await?
        }
        CodePlatform::None => {
            println!("No repository platform selected; skipping repository creation.");
            false
        }
    };

    if !created && answers.code_platform != CodePlatform::None {
        cookiecutter.save("CODE_REPO", "None")?;
    }
    Ok(created)
}

async fn create_platform_repo(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    project_dir: &Path,
    answers: &ProjectAnswers,
    dotenv: &EnvStore,
    cli: &str,
    platform: &str,
) -> Result<bool> {
    if !runner.is_installed(cli) {
        println!("{} CLI ('{}') is not installed; skipping repository creation.", platform, cli);
        return Ok(false);
    }

    let auth = runner.run(cli, &["auth", "status"], project_dir).await?;
    if !auth.success() {
        println!(
            "Not logged into {}. Run '{} auth login' and re-run init.",
            platform, cli
        );
        return Ok(false);
    }

    let user_key = format!("{}_USER", platform.to_uppercase());
    let username = match dotenv.load(&user_key)? {
        Some(user) => user,
        None => prompter.ask_required(&format!("Enter your {} username:", platform))?,
    };

    let slug = format!("{}/{}", username, answers.repo_name);
    let output = runner
        .run(
            cli,
            &[
                "repo",
                "create",
                &slug,
                "--private",
                "--description",
                &answers.description,
                "--source",
                ".",
                "--push",
            ],
            project_dir,
        )
        .await?;

    if !output.success() {
        println!(
            "Failed to create {} repository '{}': {}",
            platform,
            slug,
            output.stderr.trim()
        );
        return Ok(false);
    }

    dotenv.save(&user_key, &username)?;
    dotenv.save(
        &format!("{}_REPO", platform.to_uppercase()),
        &answers.repo_name,
    )?;
    println!("✅ {} repository '{}' created and pushed.", platform, slug);
    Ok(true)
}
