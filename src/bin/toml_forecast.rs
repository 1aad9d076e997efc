use clap::Parser;
use football_forecast::config::mask_credential;
use football_forecast::core::clock::{tomorrow_in, SystemClock};
use football_forecast::core::fetcher::PredictionFetcher;
use football_forecast::core::ConfigProvider;
use football_forecast::utils::error::ErrorSeverity;
use football_forecast::utils::{logger, validation::Validate};
use football_forecast::{ForecastEngine, LocalStorage, PredictionPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "Football forecast renderer driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forecast.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the output file name from config
    #[arg(long)]
    output_file: Option<String>,

    /// Dry run - show the request without fetching or writing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based forecast tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(output_file) = args.output_file.clone() {
        tracing::info!("🔧 Output file overridden to: {}", output_file);
        config.output.file = output_file;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_dir().to_string());
    let pipeline = PredictionPipeline::new(storage, config)?;
    let engine = ForecastEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Forecast document updated!");
            println!("✅ Forecast document updated!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Forecast run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.endpoint());
    println!("  Federation: {}", config.federation());
    println!("  Market: {}", config.market());
    println!(
        "  Timezones: {} -> {}",
        config.source_timezone().name(),
        config.display_timezone().name()
    );
    println!("  Output: {}/{}", config.output_dir(), config.output_file());

    if let Some(timeout) = config.timeout_seconds() {
        println!("  Timeout: {}s", timeout);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let target_date = tomorrow_in(&SystemClock, config.source_timezone());
    let url = PredictionFetcher::request_url(config, target_date)?;

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📡 Request:");
    println!("  GET {}", url);
    println!("  API key: {}", mask_credential(config.credential()));
    println!();
    println!("📅 Target date: {} ({})", target_date, config.source_timezone().name());
    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
