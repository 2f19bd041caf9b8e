pub mod citation;
pub mod dataset;
pub mod dependencies;
pub mod engine;
pub mod environment;
pub mod layout;
pub mod readme;
pub mod remote_repo;
pub mod templates;
pub mod version_control;

pub use engine::SetupEngine;
