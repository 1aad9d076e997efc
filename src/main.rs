use clap::Parser;
use football_forecast::config::mask_credential;
use football_forecast::core::clock::{tomorrow_in, SystemClock};
use football_forecast::core::fetcher::PredictionFetcher;
use football_forecast::core::ConfigProvider;
use football_forecast::utils::error::ErrorSeverity;
use football_forecast::utils::{logger, validation::Validate};
use football_forecast::{CliConfig, ForecastEngine, LocalStorage, PredictionPipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在時忽略
    dotenvy::dotenv().ok();

    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting football-forecast CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        let target_date = tomorrow_in(&SystemClock, config.source_timezone());
        let url = PredictionFetcher::request_url(&config, target_date)?;

        println!("🔍 Dry Run Analysis:");
        println!("  Target date: {} ({})", target_date, config.source_timezone().name());
        println!("  Request: GET {}", url);
        println!("  API key: {}", mask_credential(config.credential()));
        println!("  Display timezone: {}", config.display_timezone().name());
        println!("  Output: {}/{}", config.output_dir(), config.output_file());
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_dir.clone());
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
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
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
