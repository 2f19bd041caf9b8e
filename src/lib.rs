pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{AssumeYesPrompter, ShellRunner, TerminalPrompter};
pub use config::{Cli, Command, EnvStore, ProjectAnswers};
pub use core::SetupEngine;
pub use domain::model::{CodePlatform, DatasetEntry, EnvManager, Language, RemoteStorage, VersionControl};
pub use domain::ports::{CommandRunner, Prompter};
pub use utils::error::{Result, ScaffoldError};
