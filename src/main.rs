use clap::Parser;
use repro_scaffold::core::{dataset, dependencies, readme, version_control};
use repro_scaffold::utils::error::ErrorSeverity;
use repro_scaffold::utils::{logger, validation};
use repro_scaffold::{
    AssumeYesPrompter, Cli, Command, CommandRunner, EnvStore, Prompter, ProjectAnswers, Result,
    ScaffoldError, SetupEngine, ShellRunner, TerminalPrompter,
};
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting repro-scaffold");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let runner = ShellRunner::new();
    let prompter: Box<dyn Prompter> = if cli.yes {
        Box::new(AssumeYesPrompter::new())
    } else {
        Box::new(TerminalPrompter::new())
    };

    if let Err(e) = run(&cli, &runner, prompter.as_ref()).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &Cli, runner: &ShellRunner, prompter: &dyn Prompter) -> Result<()> {
    let project_dir = cli.project_dir.as_path();

    // Everything except init maintains an existing project.
    if !matches!(cli.command, Command::Init { .. }) && !project_dir.is_dir() {
        return Err(ScaffoldError::ProjectStateError {
            message: format!(
                "project directory '{}' does not exist",
                project_dir.display()
            ),
        });
    }

    match &cli.command {
        Command::Init { answers } => {
            std::fs::create_dir_all(project_dir)?;
            let answers = match answers {
                Some(path) => ProjectAnswers::from_toml_file(path)?,
                None => ProjectAnswers::collect_interactive(prompter)?,
            };
            let engine = SetupEngine::new(runner, prompter, project_dir.to_path_buf(), answers);
            engine.run().await
        }

        Command::SetDataset {
            name,
            source,
            command,
            destination,
            doi,
            citation,
            license,
        } => {
            let no_flags = [name, source, command, destination, doi, citation, license]
                .iter()
                .all(|v| v.is_none());
            if no_flags {
                let count = dataset::register_all_raw(runner, project_dir).await?;
                println!("Registered {} dataset(s) from data/raw/.", count);
                return Ok(());
            }

            let name = validation::validate_required_field("name", name)?.clone();
            let entry = dataset::set_dataset(
                runner,
                project_dir,
                dataset::SetDatasetParams {
                    name,
                    source: source.clone(),
                    run_command: command.clone(),
                    destination: destination.clone(),
                    doi: doi.clone(),
                    citation: citation.clone(),
                    license: license.clone(),
                },
            )
            .await?;
            println!(
                "✅ Dataset '{}' registered ({} files, {} MB).",
                entry.data_name, entry.number_of_files, entry.total_size_mb
            );
            let msg = format!("Set dataset {}", entry.data_name);
            version_control::git_push(runner, project_dir, has_platform_remote(project_dir)?, &msg)
                .await?;
            Ok(())
        }

        Command::UpdateDependencies => {
            println!("Updating dependency manifests...");
            dependencies::update_dependencies(runner, project_dir).await?;
            println!("✅ Dependency manifests updated.");
            Ok(())
        }

        Command::UpdateReadme => update_readme(runner, project_dir).await,
    }
}

/// Regenerate the Project Tree and dataset table, keeping hand-written
/// `<- description` annotations via the descriptions file.
async fn update_readme(runner: &dyn CommandRunner, project_dir: &Path) -> Result<()> {
    let readme_path = project_dir.join("README.md");
    let descriptions_path = project_dir.join("setup/file_descriptions.json");

    let mut descriptions = readme::FileDescriptions::load_or_seed(&descriptions_path)?;
    if !readme_path.exists() {
        // A deleted README is rebuilt from the .cookiecutter answer echo.
        let cookiecutter = EnvStore::cookiecutter(project_dir);
        if cookiecutter.path().exists() {
            let answers = ProjectAnswers::from_store(&cookiecutter)?;
            readme::generate_readme(&answers, &readme_path)?;
        }
    }
    if readme_path.exists() {
        let harvested = descriptions.harvest_from_readme(&std::fs::read_to_string(&readme_path)?);
        if harvested > 0 {
            tracing::debug!("Harvested {} description(s) from the README tree", harvested);
            descriptions.save(&descriptions_path)?;
        }
    }

    dataset::refresh_dataset_outputs(project_dir)?;
    readme::update_tree_section(
        &readme_path,
        project_dir,
        readme::DEFAULT_IGNORES,
        &descriptions,
    )?;

    version_control::git_push(
        runner,
        project_dir,
        has_platform_remote(project_dir)?,
        "Update README.md",
    )
    .await?;
    println!("✅ README.md refreshed.");
    Ok(())
}

/// A platform repo was created when its user/repo pair is echoed in `.env`.
fn has_platform_remote(project_dir: &Path) -> Result<bool> {
    let dotenv = EnvStore::dotenv(project_dir);
    Ok(dotenv.load("GITHUB_REPO")?.is_some() || dotenv.load("GITLAB_REPO")?.is_some())
}
