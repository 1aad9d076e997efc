use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid timestamp '{value}': {source}")]
    TimestampError {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::ApiError(_) => ErrorCategory::Network,
            ForecastError::IoError(_) => ErrorCategory::Io,
            ForecastError::TimestampError { .. } => ErrorCategory::Data,
            ForecastError::InvalidConfigValueError { .. }
            | ForecastError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重跑即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ForecastError::ApiError(_) => {
                "Check network connectivity and the API endpoint, then run again".to_string()
            }
            ForecastError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            ForecastError::TimestampError { .. } => {
                "The API returned a start_date not in YYYY-MM-DDTHH:MM:SS format".to_string()
            }
            ForecastError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            ForecastError::ConfigValidationError { .. } => {
                "Review the configuration flags or TOML file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the prediction API: {}", self),
            ErrorCategory::Io => format!("Could not write the forecast document: {}", self),
            ErrorCategory::Data => format!("Prediction data could not be rendered: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_error_is_high_severity_data_error() {
        let source = chrono::NaiveDateTime::parse_from_str("tomorrow", "%Y-%m-%dT%H:%M:%S")
            .unwrap_err();
        let err = ForecastError::TimestampError {
            value: "tomorrow".to_string(),
            source,
        };

        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("tomorrow"));
    }

    #[test]
    fn test_config_errors_mention_field() {
        let err = ForecastError::InvalidConfigValueError {
            field: "source.endpoint".to_string(),
            value: "nope".to_string(),
            reason: "Invalid URL format".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("source.endpoint"));
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: ForecastError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
