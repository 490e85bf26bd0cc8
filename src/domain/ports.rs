use crate::domain::model::{Invocation, LaunchOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 環境變數來源；測試注入 map，正式執行讀取行程環境
pub trait Environment: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawns the invocation with inherited stdio and waits for it to exit.
    async fn run(&self, invocation: &Invocation) -> Result<LaunchOutcome>;
}
