use aoi_launcher::utils::{logger, validation::Validate};
use aoi_launcher::{CliArgs, LaunchError, Launcher, LauncherConfig, ProcessEnv, SystemRunner};
use clap::Parser;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_format);
    tracing::debug!("CLI args: {:?}", args);

    let code = match run(&args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "❌ Launch failed: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(args: &CliArgs) -> Result<i32, LaunchError> {
    let config = LauncherConfig::load_or_default(args.config_path(), args.config_required())?;
    config.validate()?;
    tracing::debug!("✅ Configuration loaded and validated");

    let runner = SystemRunner::new().with_monitoring(
        args.monitor,
        Duration::from_secs(config.monitor_interval_seconds()),
    )?;
    if args.monitor {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let launcher = Launcher::new(ProcessEnv, runner, config);

    if args.dry_run {
        let invocation = launcher.plan()?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&invocation)?);
        } else {
            println!("{}", invocation.command_line());
        }
        return Ok(0);
    }

    let outcome = launcher.launch().await?;
    Ok(outcome.exit_code())
}
