use crate::config::env::resolve_port;
use crate::config::toml_config::LauncherConfig;
use crate::domain::model::{
    Invocation, LaunchOutcome, PortSource, ServerOptions, DEFAULT_ENTRY, DEFAULT_PORT,
};
use crate::domain::ports::{Environment, ProcessRunner};
use crate::utils::error::Result;

pub struct Launcher<E: Environment, R: ProcessRunner> {
    env: E,
    runner: R,
    config: LauncherConfig,
}

impl<E: Environment, R: ProcessRunner> Launcher<E, R> {
    pub fn new(env: E, runner: R, config: LauncherConfig) -> Self {
        Self {
            env,
            runner,
            config,
        }
    }

    /// 解析 PORT 並組出完整的 invocation，不啟動任何行程
    ///
    /// 預設 port 與 entry 固定為 8501 / `app.py`，設定檔只能換 runner 與追加選項
    pub fn plan(&self) -> Result<Invocation> {
        let resolved = resolve_port(&self.env, DEFAULT_PORT)?;
        if resolved.source == PortSource::Default {
            tracing::debug!("PORT defaulted to {}", resolved.port);
        }

        let mut options = ServerOptions::new(resolved.port);
        for (key, value) in self.config.extra_options() {
            options.push(&key, &value)?;
        }

        Ok(Invocation::new(self.config.program(), DEFAULT_ENTRY, &options))
    }

    pub async fn launch(&self) -> Result<LaunchOutcome> {
        let invocation = self.plan()?;

        tracing::info!("🚀 Launching: {}", invocation.command_line());

        let outcome = self.runner.run(&invocation).await?;
        tracing::debug!(
            "{} ran for {:?}, exit code {}",
            invocation.program,
            outcome.runtime,
            outcome.code
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LaunchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockRunner {
        exit_code: i32,
        calls: Mutex<Vec<Invocation>>,
    }

    impl MockRunner {
        fn new(exit_code: i32) -> Self {
            Self {
                exit_code,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockRunner {
        async fn run(&self, invocation: &Invocation) -> Result<LaunchOutcome> {
            self.calls.lock().unwrap().push(invocation.clone());
            Ok(LaunchOutcome {
                code: self.exit_code,
                runtime: Duration::from_millis(1),
            })
        }
    }

    struct MissingBinaryRunner;

    #[async_trait]
    impl ProcessRunner for MissingBinaryRunner {
        async fn run(&self, invocation: &Invocation) -> Result<LaunchOutcome> {
            Err(LaunchError::LaunchFailure {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            })
        }
    }

    fn env(port: Option<&str>) -> HashMap<String, String> {
        let mut env = HashMap::new();
        if let Some(port) = port {
            env.insert("PORT".to_string(), port.to_string());
        }
        env
    }

    #[test]
    fn test_plan_without_port() {
        let launcher = Launcher::new(env(None), MockRunner::new(0), LauncherConfig::default());
        let invocation = launcher.plan().unwrap();

        assert_eq!(invocation.program, "streamlit");
        assert_eq!(
            invocation.args_line(),
            "run app.py --server.port=8501 --server.enableCORS=true --server.enableXsrfProtection=false"
        );
    }

    #[test]
    fn test_plan_with_port_3000() {
        let launcher = Launcher::new(env(Some("3000")), MockRunner::new(0), LauncherConfig::default());
        let invocation = launcher.plan().unwrap();

        assert_eq!(
            invocation.args_line(),
            "run app.py --server.port=3000 --server.enableCORS=true --server.enableXsrfProtection=false"
        );
        assert_eq!(invocation.env, vec![("PORT".to_string(), "3000".to_string())]);
    }

    #[test]
    fn test_plan_is_repeatable() {
        let launcher = Launcher::new(env(Some("9000")), MockRunner::new(0), LauncherConfig::default());
        assert_eq!(launcher.plan().unwrap(), launcher.plan().unwrap());
    }

    #[test]
    fn test_config_cannot_move_default_port_or_entry() {
        let config = LauncherConfig::from_toml_str(
            r#"
[runner]
entry = "other.py"

[server]
default_port = 8080

[server.options]
headless = true
"#,
        )
        .unwrap();

        let launcher = Launcher::new(env(None), MockRunner::new(0), config);
        let invocation = launcher.plan().unwrap();

        assert_eq!(
            invocation.args,
            vec![
                "run",
                "app.py",
                "--server.port=8501",
                "--server.enableCORS=true",
                "--server.enableXsrfProtection=false",
                "--server.headless=true",
            ]
        );
    }

    #[test]
    fn test_port_value_is_passed_through_verbatim() {
        for value in ["1", "80", "3000", "65535"] {
            let launcher = Launcher::new(env(Some(value)), MockRunner::new(0), LauncherConfig::default());
            let invocation = launcher.plan().unwrap();
            assert!(invocation.args.contains(&format!("--server.port={}", value)));
            assert_eq!(invocation.env, vec![("PORT".to_string(), value.to_string())]);
        }
    }

    #[test]
    fn test_non_canonical_port_is_rejected() {
        for value in ["+3000", "03000", " 3000 ", "   "] {
            let launcher = Launcher::new(env(Some(value)), MockRunner::new(0), LauncherConfig::default());
            let err = launcher.plan().unwrap_err();
            assert!(
                matches!(err, LaunchError::InvalidConfigValueError { .. }),
                "PORT={:?} should be rejected",
                value
            );
        }
    }

    #[tokio::test]
    async fn test_launch_propagates_exit_code() {
        let launcher = Launcher::new(env(None), MockRunner::new(3), LauncherConfig::default());
        let outcome = launcher.launch().await.unwrap();

        assert_eq!(outcome.exit_code(), 3);
        assert_eq!(launcher.runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_port_never_spawns() {
        let launcher = Launcher::new(env(Some("abc")), MockRunner::new(0), LauncherConfig::default());
        let err = launcher.launch().await.unwrap_err();

        assert!(matches!(err, LaunchError::InvalidConfigValueError { .. }));
        assert!(launcher.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_launch_failure_surfaces() {
        let launcher = Launcher::new(env(None), MissingBinaryRunner, LauncherConfig::default());
        let err = launcher.launch().await.unwrap_err();

        assert!(matches!(err, LaunchError::LaunchFailure { .. }));
        assert_ne!(err.exit_code(), 0);
    }
}
