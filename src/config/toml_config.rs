use crate::domain::model::FIXED_SERVER_KEYS;
use crate::utils::error::{LaunchError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "launcher.toml";
pub const DEFAULT_PROGRAM: &str = "streamlit";
pub const DEFAULT_MONITOR_INTERVAL_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub monitor: Option<MonitorConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub program: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 額外的 `--server.<key>=<value>`，依 key 排序輸出
    pub options: Option<BTreeMap<String, toml::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub interval_seconds: Option<u64>,
}

impl LauncherConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 載入 `path`；若檔案不存在且 `required` 為 false，回傳預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if required {
                return Err(LaunchError::MissingConfigError {
                    field: format!("config file {}", path.display()),
                });
            }
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LaunchError::ConfigParseError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STREAMLIT_BIN})，未定義者保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LaunchError::ConfigParseError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn program(&self) -> &str {
        self.runner.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    /// 額外的 server 選項，值以字串呈現 (`true`, `200`, `"wide"` → `wide`)
    pub fn extra_options(&self) -> Vec<(String, String)> {
        self.server
            .options
            .as_ref()
            .map(|options| {
                options
                    .iter()
                    .map(|(key, value)| {
                        let rendered = match value {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), rendered)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn monitor_interval_seconds(&self) -> u64 {
        self.monitor
            .as_ref()
            .and_then(|m| m.interval_seconds)
            .unwrap_or(DEFAULT_MONITOR_INTERVAL_SECONDS)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("runner.program", self.program())?;
        validate_path("runner.program", self.program())?;

        for (key, _) in self.extra_options() {
            validate_option_key("server.options", &key, &FIXED_SERVER_KEYS)?;
        }

        validate_positive_number("monitor.interval_seconds", self.monitor_interval_seconds(), 1)?;

        Ok(())
    }
}

impl Validate for LauncherConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
