use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "repro-scaffold")]
#[command(about = "Scaffold and maintain reproducible research repositories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root directory the command operates on.
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Enable verbose output.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Assume "yes" for confirmations; fail instead of prompting for input.
    #[arg(long, global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scaffold a new project: layout, stubs, version control, remote
    /// repository and language environment.
    Init {
        /// TOML answers file; omit to answer interactively.
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Register or refresh a raw dataset in datasets.json and the README.
    SetDataset {
        /// Name of the dataset. Omit every flag to re-register all of data/raw/.
        #[arg(long)]
        name: Option<String>,

        /// Remote URL or path the dataset comes from.
        #[arg(long)]
        source: Option<String>,

        /// Download command; the source and destination are appended to it.
        #[arg(long)]
        command: Option<String>,

        /// Where the data is stored. Defaults to data/raw/<name>.
        #[arg(long)]
        destination: Option<String>,

        #[arg(long)]
        doi: Option<String>,

        #[arg(long)]
        citation: Option<String>,

        #[arg(long)]
        license: Option<String>,
    },

    /// Scan sources and notebooks for imports and refresh dependencies.txt,
    /// requirements.txt and the README requirements section.
    UpdateDependencies,

    /// Regenerate the Project Tree section and dataset table of README.md.
    UpdateReadme,
}
