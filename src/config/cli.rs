use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use crate::utils::logger::LogFormat;
use clap::Parser;

/// Starts the AOI soil-moisture viewer with `streamlit run app.py`.
///
/// The listening port comes from the `PORT` environment variable (default 8501).
/// CORS is always enabled and XSRF protection always disabled.
#[derive(Debug, Clone, Parser)]
#[command(name = "aoi-launcher")]
#[command(about = "Launch the AOI viewer web app on $PORT")]
pub struct CliArgs {
    /// Path to TOML configuration file (skipped if the default path is absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Print the command that would be run and exit
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the invocation as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Periodically log CPU and memory usage of the app process
    #[arg(long)]
    pub monitor: bool,
}

impl CliArgs {
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }

    /// 明確指定的設定檔必須存在
    pub fn config_required(&self) -> bool {
        self.config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = CliArgs::try_parse_from(["aoi-launcher"]).unwrap();
        assert_eq!(args.config_path(), "launcher.toml");
        assert!(!args.config_required());
        assert!(!args.dry_run);
        assert!(!args.monitor);
        assert_eq!(args.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_explicit_config_is_required() {
        let args =
            CliArgs::try_parse_from(["aoi-launcher", "-c", "deploy/launcher.toml"]).unwrap();
        assert_eq!(args.config_path(), "deploy/launcher.toml");
        assert!(args.config_required());
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(CliArgs::try_parse_from(["aoi-launcher", "--json"]).is_err());
        let args = CliArgs::try_parse_from(["aoi-launcher", "--dry-run", "--json"]).unwrap();
        assert!(args.json);
    }

    #[test]
    fn test_log_format_json() {
        let args = CliArgs::try_parse_from(["aoi-launcher", "--log-format", "json"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
