use crate::config::env_store::EnvStore;
use crate::domain::model::{CodePlatform, EnvManager, Language, RemoteStorage, VersionControl};
use crate::domain::ports::Prompter;
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::{
    validate_non_empty_string, validate_orcid, validate_repo_name, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The template answers a new project is instantiated from. Loadable from a
/// TOML answers file, collected interactively, and echoed to `.cookiecutter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnswers {
    pub project_name: String,
    pub repo_name: String,
    #[serde(default)]
    pub description: String,
    /// Semicolon-separated author names.
    #[serde(default)]
    pub authors: String,
    /// Semicolon-separated ORCID iDs, aligned with `authors`.
    #[serde(default)]
    pub orcids: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub license: String,
    #[serde(default = "Language::default_answer")]
    pub programming_language: Language,
    #[serde(default = "EnvManager::default_answer")]
    pub environment_manager: EnvManager,
    #[serde(default = "VersionControl::default_answer")]
    pub version_control: VersionControl,
    #[serde(default = "CodePlatform::default_answer")]
    pub code_platform: CodePlatform,
    #[serde(default = "RemoteStorage::default_answer")]
    pub remote_storage: RemoteStorage,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Language {
    fn default_answer() -> Self {
        Language::Python
    }
}
impl EnvManager {
    fn default_answer() -> Self {
        EnvManager::None
    }
}
impl VersionControl {
    fn default_answer() -> Self {
        VersionControl::Git
    }
}
impl CodePlatform {
    fn default_answer() -> Self {
        CodePlatform::None
    }
}
impl RemoteStorage {
    fn default_answer() -> Self {
        RemoteStorage::None
    }
}

impl ProjectAnswers {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let answers: ProjectAnswers = toml::from_str(&content)?;
        answers.validate()?;
        Ok(answers)
    }

    /// Ask for every answer on the terminal, re-asking until valid.
    pub fn collect_interactive(prompter: &dyn Prompter) -> Result<Self> {
        let project_name = prompter.ask_required("Project name:")?;

        let suggested = sanitize_repo_name(&project_name);
        let repo_name = {
            let given = prompter.ask_line(&format!("Repository name [{}]:", suggested))?;
            if given.trim().is_empty() {
                suggested
            } else {
                given.trim().to_string()
            }
        };
        validate_repo_name("repo_name", &repo_name)?;

        let description = prompter.ask_line("Short description:")?;
        let authors = prompter.ask_line("Author names (separate with ';'):")?;
        let orcids = prompter.ask_line("ORCID iDs (separate with ';', blank to skip):")?;
        let license = prompter.ask_line("License (e.g. MIT, blank for none):")?;

        let programming_language = ask_choice(prompter, "Programming language", "Python")?;
        let environment_manager = ask_choice(prompter, "Environment manager", "None")?;
        let version_control = ask_choice(prompter, "Version control", "Git")?;
        let code_platform = ask_choice(prompter, "Code repository platform", "None")?;
        let remote_storage = ask_choice(prompter, "Remote data storage", "None")?;

        let answers = ProjectAnswers {
            project_name,
            repo_name,
            description,
            authors,
            orcids,
            version: default_version(),
            license,
            programming_language,
            environment_manager,
            version_control,
            code_platform,
            remote_storage,
        };
        answers.validate()?;
        Ok(answers)
    }

    /// Echo every answer to the `.cookiecutter` store.
    pub fn persist(&self, store: &EnvStore) -> Result<()> {
        store.save("PROJECT_NAME", &self.project_name)?;
        store.save("REPO_NAME", &self.repo_name)?;
        store.save("PROJECT_DESCRIPTION", &self.description)?;
        store.save("VERSION", &self.version)?;
        store.save("AUTHORS", &self.authors)?;
        store.save("ORCIDS", &self.orcids)?;
        store.save("LICENSE", &self.license)?;
        store.save("PROGRAMMING_LANGUAGE", &self.programming_language.to_string())?;
        store.save("ENVIRONMENT_MANAGER", &self.environment_manager.to_string())?;
        store.save("VERSION_CONTROL", &self.version_control.to_string())?;
        store.save("REMOTE_STORAGE", &self.remote_storage.to_string())?;
        store.save("CODE_REPO", &self.code_platform.to_string())?;
        Ok(())
    }

    /// Rebuild answers from a `.cookiecutter` echo; later subcommands
    /// (`set-dataset`, `update-dependencies`) run against an existing project.
    pub fn from_store(store: &EnvStore) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            store.load(key)?.ok_or_else(|| ScaffoldError::MissingConfigError {
                field: key.to_string(),
            })
        };
        let parse_or = |key: &str, fallback: &str| -> Result<String> {
            Ok(store.load(key)?.unwrap_or_else(|| fallback.to_string()))
        };

        Ok(ProjectAnswers {
            project_name: get("PROJECT_NAME")?,
            repo_name: get("REPO_NAME")?,
            description: parse_or("PROJECT_DESCRIPTION", "")?,
            authors: parse_or("AUTHORS", "")?,
            orcids: parse_or("ORCIDS", "")?,
            version: parse_or("VERSION", "0.1.0")?,
            license: parse_or("LICENSE", "")?,
            programming_language: parse_enum(store, "PROGRAMMING_LANGUAGE", Language::Python)?,
            environment_manager: parse_enum(store, "ENVIRONMENT_MANAGER", EnvManager::None)?,
            version_control: parse_enum(store, "VERSION_CONTROL", VersionControl::None)?,
            code_platform: parse_enum(store, "CODE_REPO", CodePlatform::None)?,
            remote_storage: parse_enum(store, "REMOTE_STORAGE", RemoteStorage::None)?,
        })
    }

    pub fn author_list(&self) -> Vec<String> {
        self.authors
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn orcid_list(&self) -> Vec<String> {
        self.orcids
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Validate for ProjectAnswers {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("project_name", &self.project_name)?;
        validate_repo_name("repo_name", &self.repo_name)?;
        validate_non_empty_string("version", &self.version)?;
        for orcid in self.orcid_list() {
            validate_orcid("orcids", &orcid)?;
        }
        // A platform repo without version control cannot be pushed anywhere.
        if self.code_platform != CodePlatform::None
            && self.version_control == VersionControl::None
        {
            return Err(ScaffoldError::ConfigError {
                message: format!(
                    "code platform {} requires version control (Git, DVC or Datalad)",
                    self.code_platform
                ),
            });
        }
        Ok(())
    }
}

fn parse_enum<T>(store: &EnvStore, key: &str, fallback: T) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    match store.load(key)? {
        Some(text) => text.parse().map_err(|e: String| {
            ScaffoldError::InvalidConfigValueError {
                field: key.to_string(),
                value: text,
                reason: e,
            }
        }),
        None => Ok(fallback),
    }
}

fn ask_choice<T>(prompter: &dyn Prompter, label: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    loop {
        let answer = prompter.ask_line(&format!("{} [{}]:", label, default))?;
        let text = if answer.trim().is_empty() {
            default
        } else {
            answer.trim()
        };
        match text.parse() {
            Ok(value) => return Ok(value),
            Err(e) => println!("Invalid choice: {}", e),
        }
    }
}

pub fn sanitize_repo_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
