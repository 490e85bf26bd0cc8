use crate::utils::error::{LaunchError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const PORT_VAR: &str = "PORT";
pub const DEFAULT_PORT: Port = Port(8501);
pub const DEFAULT_ENTRY: &str = "app.py";

/// 由 launcher 固定寫入、設定檔不可覆蓋的 server 選項
pub const FIXED_SERVER_KEYS: [&str; 3] = ["port", "enableCORS", "enableXsrfProtection"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    pub fn new(value: u16) -> Result<Self> {
        crate::utils::validation::validate_range(PORT_VAR, value, 1, u16::MAX)?;
        Ok(Self(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for Port {
    type Err = LaunchError;

    /// 只接受純十進位寫法，確保 `--server.port=N` 與 PORT 原值一致
    fn from_str(s: &str) -> Result<Self> {
        let value: u16 = s.parse().map_err(|e| LaunchError::InvalidConfigValueError {
            field: PORT_VAR.to_string(),
            value: s.to_string(),
            reason: format!("Not a valid TCP port: {}", e),
        })?;

        if value.to_string() != s {
            return Err(LaunchError::InvalidConfigValueError {
                field: PORT_VAR.to_string(),
                value: s.to_string(),
                reason: "Port must be a plain decimal number without sign, padding or leading zeros"
                    .to_string(),
            });
        }

        Port::new(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSource {
    Environment,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPort {
    pub port: Port,
    pub source: PortSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerOptions {
    entries: Vec<(String, String)>,
}

impl ServerOptions {
    /// port、CORS 開啟、XSRF 關閉，順序固定
    pub fn new(port: Port) -> Self {
        Self {
            entries: vec![
                (FIXED_SERVER_KEYS[0].to_string(), port.to_string()),
                (FIXED_SERVER_KEYS[1].to_string(), "true".to_string()),
                (FIXED_SERVER_KEYS[2].to_string(), "false".to_string()),
            ],
        }
    }

    /// Appends an extra option after the fixed ones. Fixed keys are rejected.
    pub fn push(&mut self, key: &str, value: &str) -> Result<()> {
        crate::utils::validation::validate_option_key("server.options", key, &FIXED_SERVER_KEYS)?;
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, value)| format!("--server.{}={}", key, value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: &str, entry: &str, options: &ServerOptions) -> Self {
        let mut args = vec!["run".to_string(), entry.to_string()];
        args.extend(options.to_args());

        let env = options
            .get(FIXED_SERVER_KEYS[0])
            .map(|port| vec![(PORT_VAR.to_string(), port.to_string())])
            .unwrap_or_default();

        Self {
            program: program.to_string(),
            args,
            env,
        }
    }

    /// 不含 program 的參數列，例如 `run app.py --server.port=8501 ...`
    pub fn args_line(&self) -> String {
        self.args.join(" ")
    }

    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args_line())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub code: i32,
    pub runtime: Duration,
}

impl LaunchOutcome {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn exit_code(&self) -> i32 {
        self.code
    }
}
