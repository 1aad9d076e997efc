pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};

pub const DEFAULT_ENDPOINT: &str = "https://football-prediction-api.p.rapidapi.com/api/v2/predictions";
pub const DEFAULT_SOURCE_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_FEDERATION: &str = "UEFA";
pub const DEFAULT_MARKET: &str = "classic";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_FILE: &str = "README.md";
pub const CREDENTIAL_ENV: &str = "FOOTBALLPREDICT_API_KEY";

/// 共用的設定檢查，CLI 與 TOML 都走這裡
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("endpoint", config.endpoint())?;
    validate_non_empty_string("federation", config.federation())?;
    validate_non_empty_string("market", config.market())?;
    validate_path("output_dir", config.output_dir())?;
    validate_path("output_file", config.output_file())?;
    Ok(())
}

/// 日誌與 dry run 用，只保留末四碼
pub fn mask_credential(credential: Option<&str>) -> String {
    match credential {
        None => "<not set>".to_string(),
        Some(key) if key.chars().count() <= 4 => "****".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::*;
    use crate::utils::validation::parse_timezone;
    use chrono_tz::Tz;
    use clap::Parser;
    use std::fmt;

    fn source_tz_arg(value: &str) -> Result<Tz> {
        parse_timezone("source_timezone", value)
    }

    fn display_tz_arg(value: &str) -> Result<Tz> {
        parse_timezone("display_timezone", value)
    }

    #[derive(Clone, Parser)]
    #[command(name = "football-forecast")]
    #[command(about = "Render tomorrow's football predictions into a Markdown document")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, env = CREDENTIAL_ENV, hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = DEFAULT_SOURCE_TIMEZONE, value_parser = source_tz_arg)]
        pub source_timezone: Tz,

        #[arg(long, default_value = DEFAULT_DISPLAY_TIMEZONE, value_parser = display_tz_arg)]
        pub display_timezone: Tz,

        #[arg(long, default_value = DEFAULT_FEDERATION)]
        pub federation: String,

        #[arg(long, default_value = DEFAULT_MARKET)]
        pub market: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        pub output_dir: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        pub output_file: String,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Show the request that would be sent without fetching or writing")]
        pub dry_run: bool,
    }

    impl fmt::Debug for CliConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("CliConfig")
                .field("endpoint", &self.endpoint)
                .field("api_key", &mask_credential(self.credential()))
                .field("source_timezone", &self.source_timezone)
                .field("display_timezone", &self.display_timezone)
                .field("federation", &self.federation)
                .field("market", &self.market)
                .field("output_dir", &self.output_dir)
                .field("output_file", &self.output_file)
                .field("verbose", &self.verbose)
                .field("monitor", &self.monitor)
                .field("dry_run", &self.dry_run)
                .finish()
        }
    }

    impl ConfigProvider for CliConfig {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn credential(&self) -> Option<&str> {
            self.api_key.as_deref().filter(|k| !k.trim().is_empty())
        }

        fn source_timezone(&self) -> Tz {
            self.source_timezone
        }

        fn display_timezone(&self) -> Tz {
            self.display_timezone
        }

        fn federation(&self) -> &str {
            &self.federation
        }

        fn market(&self) -> &str {
            &self.market
        }

        fn output_dir(&self) -> &str {
            &self.output_dir
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

}
