use crate::utils::error::{Result, ScaffoldError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Repo names become directory names, git repo names and environment names,
/// so they are restricted to a conservative character set.
pub fn validate_repo_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if !ok || value.starts_with('.') {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Only ASCII letters, digits, '-', '_' and '.' are allowed".to_string(),
        });
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "ssh" | "sftp" | "ftp" | "file" => Ok(()),
            scheme => Err(ScaffoldError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// ORCID iDs are 16 digits in four dash-separated groups; the last character
/// may be an 'X' checksum. Full URLs are accepted as well.
pub fn validate_orcid(field_name: &str, value: &str) -> Result<()> {
    let bare = value
        .trim()
        .strip_prefix("https://orcid.org/")
        .unwrap_or(value.trim());

    let groups: Vec<&str> = bare.split('-').collect();
    let shape_ok = groups.len() == 4
        && groups.iter().enumerate().all(|(i, g)| {
            g.len() == 4
                && g.chars().enumerate().all(|(j, c)| {
                    c.is_ascii_digit() || (i == 3 && j == 3 && c.eq_ignore_ascii_case(&'X'))
                })
        });

    if !shape_ok {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected an ORCID iD like 0000-0002-1825-0097".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ScaffoldError::MissingConfigError {
        field: field_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo_name() {
        assert!(validate_repo_name("repo_name", "my-project_2").is_ok());
        assert!(validate_repo_name("repo_name", "").is_err());
        assert!(validate_repo_name("repo_name", "my project").is_err());
        assert!(validate_repo_name("repo_name", ".hidden").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source", "https://example.com/data.zip").is_ok());
        assert!(validate_url("source", "ssh://user@sftp.storage.deic.dk:2222").is_ok());
        assert!(validate_url("source", "").is_err());
        assert!(validate_url("source", "not a url").is_err());
    }

    #[test]
    fn test_validate_orcid() {
        assert!(validate_orcid("orcid", "0000-0002-1825-0097").is_ok());
        assert!(validate_orcid("orcid", "https://orcid.org/0000-0002-1825-009X").is_ok());
        assert!(validate_orcid("orcid", "0000-0002-1825").is_err());
        assert!(validate_orcid("orcid", "abcd-0002-1825-0097").is_err());
    }
}
