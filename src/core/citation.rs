use crate::config::answers::ProjectAnswers;
use crate::config::env_store::EnvStore;
use crate::domain::model::CodePlatform;
use crate::utils::error::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct CitationFile {
    #[serde(rename = "cff-version")]
    pub cff_version: String,
    pub title: String,
    pub message: String,
    pub version: String,
    pub authors: Vec<CitationAuthor>,
    pub doi: String,
    #[serde(rename = "date-released")]
    pub date_released: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CitationAuthor {
    #[serde(rename = "given-names")]
    pub given_names: String,
    #[serde(rename = "family-names", skip_serializing_if = "Option::is_none")]
    pub family_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl CitationFile {
    /// Build citation metadata from the answers: authors split on ';',
    /// given/family names from the last whitespace split, ORCID iDs
    /// normalized to URLs. The repository URL comes from the platform
    /// user/repo echoed in `.env` when the remote repo was created.
    pub fn from_answers(answers: &ProjectAnswers, dotenv: &EnvStore) -> Result<Self> {
        let orcids = answers.orcid_list();
        let authors = answers
            .author_list()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let (given, family) = split_name(name);
                CitationAuthor {
                    given_names: given,
                    family_names: family,
                    orcid: orcids.get(i).map(|o| normalize_orcid(o)),
                }
            })
            .collect();

        let url = match answers.code_platform {
            CodePlatform::GitHub => repo_url(dotenv, "GITHUB_USER", "GITHUB_REPO", "https://github.com")?,
            CodePlatform::GitLab => repo_url(dotenv, "GITLAB_USER", "GITLAB_REPO", "https://gitlab.com")?,
            CodePlatform::None => String::new(),
        };

        Ok(CitationFile {
            cff_version: "1.2.0".to_string(),
            title: answers.project_name.clone(),
            message: "If you use this software, please cite it as below.".to_string(),
            version: answers.version.clone(),
            authors,
            doi: String::new(),
            date_released: String::new(),
            url,
        })
    }

    pub fn write(&self, project_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(project_dir.join("CITATION.cff"), yaml)?;
        tracing::info!("CITATION.cff written");
        Ok(())
    }
}

fn split_name(name: &str) -> (String, Option<String>) {
    let name = name.trim();
    match name.rsplit_once(char::is_whitespace) {
        Some((given, family)) => (given.trim().to_string(), Some(family.to_string())),
        None => (name.to_string(), None),
    }
}

fn normalize_orcid(orcid: &str) -> String {
    let orcid = orcid.trim();
    if orcid.starts_with("https://orcid.org/") {
        orcid.to_string()
    } else {
        format!("https://orcid.org/{}", orcid)
    }
}

fn repo_url(dotenv: &EnvStore, user_key: &str, repo_key: &str, base: &str) -> Result<String> {
    match (dotenv.load(user_key)?, dotenv.load(repo_key)?) {
        (Some(user), Some(repo)) => Ok(format!("{}/{}/{}", base, user, repo)),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnvManager, Language, RemoteStorage, VersionControl};
    use tempfile::TempDir;

    fn answers() -> ProjectAnswers {
        ProjectAnswers {
            project_name: "Ocean Survey".to_string(),
            repo_name: "ocean-survey".to_string(),
            description: String::new(),
            authors: "Ada Lovelace;Grace".to_string(),
            orcids: "0000-0002-1825-0097".to_string(),
            version: "1.0.0".to_string(),
            license: "MIT".to_string(),
            programming_language: Language::Python,
            environment_manager: EnvManager::None,
            version_control: VersionControl::Git,
            code_platform: CodePlatform::GitHub,
            remote_storage: RemoteStorage::None,
        }
    }

    #[test]
    fn test_author_and_orcid_normalization() {
        let dir = TempDir::new().unwrap();
        let dotenv = EnvStore::dotenv(dir.path());

        let citation = CitationFile::from_answers(&answers(), &dotenv).unwrap();
        assert_eq!(citation.authors.len(), 2);
        assert_eq!(citation.authors[0].given_names, "Ada");
        assert_eq!(citation.authors[0].family_names.as_deref(), Some("Lovelace"));
        assert_eq!(
            citation.authors[0].orcid.as_deref(),
            Some("https://orcid.org/0000-0002-1825-0097")
        );
        // Single-word author keeps only given names; no second ORCID given.
        assert_eq!(citation.authors[1].given_names, "Grace");
        assert_eq!(citation.authors[1].family_names, None);
        assert_eq!(citation.authors[1].orcid, None);
    }

    #[test]
    fn test_url_from_env_echo_and_yaml_shape() {
        let dir = TempDir::new().unwrap();
        let dotenv = EnvStore::dotenv(dir.path());
        dotenv.save("GITHUB_USER", "ada").unwrap();
        dotenv.save("GITHUB_REPO", "ocean-survey").unwrap();

        let citation = CitationFile::from_answers(&answers(), &dotenv).unwrap();
        assert_eq!(citation.url, "https://github.com/ada/ocean-survey");

        citation.write(dir.path()).unwrap();
        let yaml = std::fs::read_to_string(dir.path().join("CITATION.cff")).unwrap();
        assert!(yaml.contains("cff-version: 1.2.0"));
        assert!(yaml.contains("given-names: Ada"));
        assert!(yaml.contains("date-released:"));
    }
}
