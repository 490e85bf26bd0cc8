#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use env::{resolve_port, ProcessEnv};
pub use toml_config::LauncherConfig;
