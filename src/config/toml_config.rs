use crate::config::{
    validate_provider, DEFAULT_ENDPOINT, DEFAULT_FEDERATION, DEFAULT_MARKET, DEFAULT_OUTPUT_DIR,
    DEFAULT_OUTPUT_FILE,
};
use crate::core::ConfigProvider;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub timezones: TimezoneConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_federation")]
    pub federation: String,
    #[serde(default = "default_market")]
    pub market: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    #[serde(default = "default_source_tz")]
    pub source: Tz,
    #[serde(default = "default_display_tz")]
    pub display: Tz,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_output_file")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_federation() -> String {
    DEFAULT_FEDERATION.to_string()
}

fn default_market() -> String {
    DEFAULT_MARKET.to_string()
}

fn default_source_tz() -> Tz {
    chrono_tz::Europe::London
}

fn default_display_tz() -> Tz {
    chrono_tz::Asia::Seoul
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            federation: default_federation(),
            market: default_market(),
            timeout_seconds: None,
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            source: default_source_tz(),
            display: default_display_tz(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file: default_output_file(),
        }
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder regex"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FOOTBALLPREDICT_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        placeholder_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn credential(&self) -> Option<&str> {
        // 未替換的 ${VAR} 視為沒有設定
        self.source
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !placeholder_pattern().is_match(k))
    }

    fn source_timezone(&self) -> Tz {
        self.timezones.source
    }

    fn display_timezone(&self) -> Tz {
        self.timezones.display
    }

    fn federation(&self) -> &str {
        &self.source.federation
    }

    fn market(&self) -> &str {
        &self.source.market
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn output_file(&self) -> &str {
        &self.output.file
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }

        Ok(())
    }
}
