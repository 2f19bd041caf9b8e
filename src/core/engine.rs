use crate::config::answers::ProjectAnswers;
use crate::config::env_store::EnvStore;
use crate::core::{citation, environment, layout, readme, remote_repo, templates, version_control};
use crate::domain::ports::{CommandRunner, Prompter};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Runs the `init` phases in order. Layout, state persistence and the
/// generated files are fatal when they fail; version control, the remote
/// repository and the environment are best-effort and downgrade to warnings.
pub struct SetupEngine<'a, R: CommandRunner> {
    runner: &'a R,
    prompter: &'a dyn Prompter,
    project_dir: PathBuf,
    answers: ProjectAnswers,
}

impl<'a, R: CommandRunner> SetupEngine<'a, R> {
    pub fn new(
        runner: &'a R,
        prompter: &'a dyn Prompter,
        project_dir: PathBuf,
        answers: ProjectAnswers,
    ) -> Self {
        Self {
            runner,
            prompter,
            project_dir,
            answers,
        }
    }

    pub async fn run(&self) -> Result<()> {
        println!("Starting project scaffold...");
        let dotenv = EnvStore::dotenv(&self.project_dir);
        let cookiecutter = EnvStore::cookiecutter(&self.project_dir);

        tracing::info!("Creating project layout");
        layout::create_layout(&self.project_dir)?;

        tracing::info!("Creating script and notebook stubs");
        templates::create_scripts(
            self.answers.programming_language,
            &self.project_dir.join("src"),
        )?;
        templates::create_notebooks(
            self.answers.programming_language,
            &self.project_dir.join("notebooks"),
        )?;

        tracing::info!("Persisting answers");
        self.answers.persist(&cookiecutter)?;
        let project_path = self
            .project_dir
            .canonicalize()
            .unwrap_or_else(|_| self.project_dir.clone());
        dotenv.save("PROJECT_PATH", &project_path.to_string_lossy())?;

        tracing::info!("Generating README");
        let descriptions =
            readme::FileDescriptions::load_or_seed(&self.project_dir.join("setup/file_descriptions.json"))?;
        readme::generate_readme(&self.answers, &self.project_dir.join("README.md"))?;

        tracing::info!("Setting up version control");
        if let Err(e) = version_control::setup_version_control(
            self.runner,
            self.prompter,
            &self.project_dir,
            &self.answers,
            &dotenv,
        )
        .await
        {
            tracing::warn!("Version control setup failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
        }

        tracing::info!("Setting up remote repository");
        if let Err(e) = remote_repo::setup_remote_repository(
            self.runner,
            self.prompter,
            &self.project_dir,
            &self.answers,
            &dotenv,
            &cookiecutter,
        )
        .await
        {
            tracing::warn!("Remote repository setup failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
        }

        tracing::info!("Writing citation file");
        citation::CitationFile::from_answers(&self.answers, &dotenv)?.write(&self.project_dir)?;

        tracing::info!("Setting up language environment");
        match environment::setup_environment(
            self.runner,
            self.prompter,
            &self.project_dir,
            &self.answers,
        )
        .await
        {
            Ok(Some(env_name)) => {
                cookiecutter.save("ENVIRONMENT_NAME", &env_name)?;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Environment setup failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
            }
        }

        // The tree is rendered last so every generated file shows up in it.
        readme::update_tree_section(
            &self.project_dir.join("README.md"),
            &self.project_dir,
            readme::DEFAULT_IGNORES,
            &descriptions,
        )?;

        if self.project_dir.join(".git").is_dir() {
            version_control::git_commit(self.runner, &self.project_dir, "Update generated files")
                .await?;
        }

        println!("✅ Project '{}' scaffolded successfully!", self.answers.repo_name);
        println!("📁 Location: {}", project_path.display());
        Ok(())
    }
}
