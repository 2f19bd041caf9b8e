// Adapters layer: concrete implementations for external systems (processes,
// terminal input).

pub mod shell;
pub mod terminal;

pub use shell::ShellRunner;
pub use terminal::{AssumeYesPrompter, TerminalPrompter};
