use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! answer_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        // Enums round-trip through their display text ("Local Path", "DVC")
        // so answer files and `.cookiecutter` echoes read naturally.
        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $(x if x == $text.to_lowercase() => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of: {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($name::$variant => write!(f, $text)),+
                }
            }
        }
    };
}

answer_enum!(Language {
    Python => "Python",
    R => "R",
    None => "None",
});

answer_enum!(EnvManager {
    Conda => "Conda",
    Venv => "Venv",
    Virtualenv => "Virtualenv",
    None => "None",
});

answer_enum!(VersionControl {
    Git => "Git",
    Dvc => "DVC",
    Datalad => "Datalad",
    None => "None",
});

answer_enum!(CodePlatform {
    GitHub => "GitHub",
    GitLab => "GitLab",
    None => "None",
});

answer_enum!(RemoteStorage {
    None => "None",
    LocalPath => "Local Path",
    DeicStorage => "Deic Storage",
    Dropbox => "Dropbox",
});

/// One record of `datasets.json`. Field names follow the on-disk format that
/// downstream tooling (dataset tables, replication packages) already reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub data_name: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub number_of_files: usize,
    pub total_size_mb: u64,
    pub file_formats: Vec<String>,
    pub data_files: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_command: Option<String>,
    #[serde(rename = "DOI", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl DatasetEntry {
    /// Two entries describe the same dataset when name and destination agree;
    /// when both carry a hash it must agree as well.
    pub fn same_dataset(&self, other: &DatasetEntry) -> bool {
        if self.data_name != other.data_name || self.destination != other.destination {
            return false;
        }
        match (&self.hash, &other.hash) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Captured result of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
