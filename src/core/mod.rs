pub mod launcher;
pub mod runner;

pub use crate::domain::model::{Invocation, LaunchOutcome};
pub use crate::domain::ports::{Environment, ProcessRunner};
pub use crate::utils::error::Result;
