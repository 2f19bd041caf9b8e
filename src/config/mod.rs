pub mod answers;
pub mod cli;
pub mod env_store;

pub use answers::ProjectAnswers;
pub use cli::{Cli, Command};
pub use env_store::EnvStore;
