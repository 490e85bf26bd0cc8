pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use config::{LauncherConfig, ProcessEnv};
pub use core::{launcher::Launcher, runner::SystemRunner};
pub use domain::model::{Invocation, LaunchOutcome, Port};
pub use utils::error::{LaunchError, Result};
