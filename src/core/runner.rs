use crate::domain::model::{Invocation, LaunchOutcome};
use crate::domain::ports::ProcessRunner;
use crate::utils::error::{LaunchError, Result};
use crate::utils::monitor::ProcessMonitor;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::Interval;

/// 以子行程執行 invocation：繼承 stdio、等待結束、回傳其 exit code
#[derive(Debug, Clone)]
pub struct SystemRunner {
    monitor_enabled: bool,
    monitor_interval: Duration,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            monitor_enabled: false,
            monitor_interval: Duration::from_secs(30),
        }
    }

    /// 取樣間隔至少 1 秒
    pub fn with_monitoring(mut self, enabled: bool, interval: Duration) -> Result<Self> {
        crate::utils::validation::validate_positive_number(
            "monitor.interval_seconds",
            interval.as_secs(),
            1,
        )?;
        self.monitor_enabled = enabled;
        self.monitor_interval = interval;
        Ok(self)
    }

    fn build_command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<LaunchOutcome> {
        // 先註冊訊號，避免子行程啟動後才失敗而無人看管
        let mut signals = ShutdownSignals::new()?;

        let started = Instant::now();
        let mut child = Self::build_command(invocation).spawn().map_err(|source| {
            LaunchError::LaunchFailure {
                program: invocation.program.clone(),
                source,
            }
        })?;

        let pid = child.id();
        tracing::info!("✅ {} started (PID: {:?})", invocation.program, pid);

        let monitor = ProcessMonitor::new(pid.unwrap_or(0), self.monitor_enabled && pid.is_some());
        let mut ticker = if monitor.is_enabled() {
            let mut ticker = tokio::time::interval(self.monitor_interval);
            ticker.tick().await;
            Some(ticker)
        } else {
            None
        };

        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.map_err(|source| LaunchError::WaitFailure {
                        program: invocation.program.clone(),
                        source,
                    })?;
                }
                received = signals.recv() => match received {
                    ShutdownKind::Terminate => {
                        tracing::warn!("🛑 SIGTERM received, forwarding to {} (PID: {:?})", invocation.program, pid);
                        forward_terminate(&mut child);
                    }
                    // 前景 process group 已由終端機送出 SIGINT，只需繼續等待
                    ShutdownKind::Interrupt => {
                        tracing::debug!("Interrupt received, waiting for {} to exit", invocation.program);
                    }
                },
                _ = next_tick(&mut ticker) => {
                    monitor.log_stats("Running");
                }
            }
        };

        monitor.log_final_stats();

        let code = exit_code_of(status);
        if status.success() {
            tracing::info!("{} exited successfully", invocation.program);
        } else {
            tracing::warn!("{} exited with code {}", invocation.program, code);
        }

        Ok(LaunchOutcome {
            code,
            runtime: started.elapsed(),
        })
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// 子行程被訊號終止時，依 shell 慣例回傳 128 + signal
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(feature = "cli")]
fn forward_terminate(child: &mut Child) {
    use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

    if let Some(pid) = child.id() {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        if let Some(true) = system.process(pid).and_then(|p| p.kill_with(Signal::Term)) {
            return;
        }
    }

    // SIGTERM 不可用 (非 unix) 時直接終止
    if let Err(e) = child.start_kill() {
        tracing::error!("Failed to stop child process: {}", e);
    }
}

#[cfg(not(feature = "cli"))]
fn forward_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::error!("Failed to stop child process: {}", e);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownKind {
    Interrupt,
    Terminate,
}

#[cfg(unix)]
struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn new() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> ShutdownKind {
        tokio::select! {
            Some(()) = self.interrupt.recv() => ShutdownKind::Interrupt,
            Some(()) = self.terminate.recv() => ShutdownKind::Terminate,
            else => std::future::pending().await,
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    /// Ctrl+C 在 Windows 上不會自動傳到子行程
    async fn recv(&mut self) -> ShutdownKind {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownKind::Terminate,
            Err(_) => std::future::pending().await,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: vec![("PORT".to_string(), "3000".to_string())],
        }
    }

    #[tokio::test]
    async fn test_exit_code_is_propagated() {
        let runner = SystemRunner::new();

        let ok = runner.run(&sh("exit 0")).await.unwrap();
        assert!(ok.success());

        let failed = runner.run(&sh("exit 7")).await.unwrap();
        assert_eq!(failed.exit_code(), 7);
    }

    #[tokio::test]
    async fn test_child_sees_port() {
        let runner = SystemRunner::new();
        let outcome = runner.run(&sh("test \"$PORT\" = 3000")).await.unwrap();
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_killed_child_maps_to_128_plus_signal() {
        let runner = SystemRunner::new();
        let outcome = runner.run(&sh("kill -TERM $$")).await.unwrap();
        assert_eq!(outcome.exit_code(), 128 + 15);
    }

    #[test]
    fn test_monitor_interval_below_one_second_is_rejected() {
        let err = SystemRunner::new()
            .with_monitoring(false, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, LaunchError::InvalidConfigValueError { .. }));
        assert!(SystemRunner::new()
            .with_monitoring(true, Duration::from_millis(500))
            .is_err());
    }

    #[tokio::test]
    async fn test_monitored_run_still_propagates_exit_code() {
        let runner = SystemRunner::new()
            .with_monitoring(true, Duration::from_secs(1))
            .unwrap();
        let outcome = runner.run(&sh("exit 6")).await.unwrap();
        assert_eq!(outcome.exit_code(), 6);
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_failure() {
        let runner = SystemRunner::new();
        let invocation = Invocation {
            program: "/nonexistent/aoi-launcher-test/streamlit".to_string(),
            args: vec![],
            env: vec![],
        };

        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, LaunchError::LaunchFailure { .. }));
        assert_eq!(err.exit_code(), 127);
    }
}
