use crate::core::{ConfigProvider, FetchOutcome, FetchResult, PredictionSet, PredictionsResponse};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use url::Url;

pub const API_KEY_HEADER: &str = "X-RapidAPI-Key";
pub const CLIENT_ID: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct PredictionFetcher {
    client: Client,
}

impl PredictionFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(CLIENT_ID).build()?;
        Ok(Self { client })
    }

    /// 查詢指定日期的預測。遠端失敗不會回傳 Err，而是 `FetchResult::Failed`
    pub async fn fetch<C: ConfigProvider>(
        &self,
        config: &C,
        target_date: NaiveDate,
    ) -> FetchOutcome {
        let iso_date = target_date.format("%Y-%m-%d").to_string();

        let mut request = self.client.get(config.endpoint()).query(&[
            ("iso_date", iso_date.as_str()),
            ("federation", config.federation()),
            ("market", config.market()),
        ]);

        match config.credential() {
            Some(key) => request = request.header(API_KEY_HEADER, key),
            None => {
                tracing::warn!("⚠️ No API credential configured, request will be unauthenticated")
            }
        }

        if let Some(timeout) = config.timeout_seconds() {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!(
            "Requesting predictions from {} for {} ({} / {})",
            config.endpoint(),
            iso_date,
            config.federation(),
            config.market()
        );

        let result = match request.send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!("API response status: {}", status);

                // 讀取失敗時當作空 body，交給下面的解析處理
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::error!("❌ Failed to read response body: {}", e);
                        String::new()
                    }
                };

                if status.is_success() {
                    Self::parse_body(status.as_u16(), body)
                } else {
                    tracing::error!(
                        "❌ Bad response from server, status-code: {}",
                        status.as_u16()
                    );
                    tracing::error!("{}", body);
                    FetchResult::Failed {
                        status: Some(status.as_u16()),
                        body,
                    }
                }
            }
            Err(e) => {
                tracing::error!("❌ Prediction request failed: {}", e);
                FetchResult::Failed {
                    status: e.status().map(|s| s.as_u16()),
                    body: e.to_string(),
                }
            }
        };

        FetchOutcome {
            target_date,
            result,
        }
    }

    /// 組出實際會送出的 URL (dry run 用)
    pub fn request_url<C: ConfigProvider>(config: &C, target_date: NaiveDate) -> Result<Url> {
        let iso_date = target_date.format("%Y-%m-%d").to_string();
        Url::parse_with_params(
            config.endpoint(),
            &[
                ("iso_date", iso_date.as_str()),
                ("federation", config.federation()),
                ("market", config.market()),
            ],
        )
        .map_err(|e| ForecastError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: config.endpoint().to_string(),
            reason: format!("Invalid URL format: {}", e),
        })
    }

    fn parse_body(status: u16, body: String) -> FetchResult {
        match serde_json::from_str::<PredictionsResponse>(&body) {
            Ok(response) => {
                let set = PredictionSet::from_unsorted(response.data);
                tracing::info!("📊 Received {} predictions", set.len());
                FetchResult::Ok(set)
            }
            Err(e) => {
                tracing::error!("❌ Malformed prediction payload (status {}): {}", status, e);
                tracing::error!("{}", body);
                FetchResult::Failed {
                    status: Some(status),
                    body,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockConfig;
    use httpmock::prelude::*;

    fn target() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_credential() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/predictions")
                    .query_param("iso_date", "2024-03-11")
                    .query_param("federation", "UEFA")
                    .query_param("market", "classic")
                    .header(API_KEY_HEADER, "secret-key")
                    .header("user-agent", CLIENT_ID);
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({ "data": [] }));
            })
            .await;

        let config = MockConfig::new(server.url("/api/v2/predictions"));
        let fetcher = PredictionFetcher::new().unwrap();

        let outcome = fetcher.fetch(&config, target()).await;

        api_mock.assert_async().await;
        assert_eq!(outcome.target_date, target());
        assert_eq!(outcome.result, FetchResult::Ok(PredictionSet::default()));
    }

    #[tokio::test]
    async fn test_fetch_sorts_matches() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions");
                then.status(200).json_body(serde_json::json!({
                    "data": [
                        {"start_date": "2024-03-11T20:00:00", "home_team": "Inter", "away_team": "Atletico", "prediction": "1"},
                        {"start_date": "2024-03-11T17:45:00", "home_team": "Dortmund", "away_team": "PSV", "prediction": "X"}
                    ]
                }));
            })
            .await;

        let config = MockConfig::new(server.url("/predictions"));
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        api_mock.assert_async().await;
        let homes: Vec<&str> = outcome.matches().iter().map(|m| m.home_team.as_str()).collect();
        assert_eq!(homes, vec!["Dortmund", "Inter"]);
    }

    #[tokio::test]
    async fn test_fetch_keeps_matches_when_odds_are_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions");
                then.status(200).json_body(serde_json::json!({
                    "data": [
                        {"start_date": "2024-03-11T20:00:00", "home_team": "Inter", "away_team": "Atletico", "prediction": "1", "odds": {"1": 1.9}},
                        {"start_date": "2024-03-11T17:45:00", "home_team": "Dortmund", "away_team": "PSV", "prediction": "X", "odds": null}
                    ]
                }));
            })
            .await;

        let config = MockConfig::new(server.url("/predictions"));
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        assert!(!outcome.is_failed());
        let matches = outcome.matches();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].home_team, "Dortmund");
        assert_eq!(matches[0].predicted_odds(), None);
        assert_eq!(matches[1].predicted_odds(), Some("1.9".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_server_error() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions");
                then.status(500).body("upstream exploded");
            })
            .await;

        let config = MockConfig::new(server.url("/predictions"));
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        api_mock.assert_async().await;
        assert_eq!(
            outcome.result,
            FetchResult::Failed {
                status: Some(500),
                body: "upstream exploded".to_string(),
            }
        );
        assert!(outcome.matches().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions");
                then.status(200).body("{\"message\": \"quota exceeded\"}");
            })
            .await;

        let config = MockConfig::new(server.url("/predictions"));
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        assert!(matches!(
            outcome.result,
            FetchResult::Failed { status: Some(200), .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_without_credential_omits_header() {
        let server = MockServer::start_async().await;
        let keyed = server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions").header_exists(API_KEY_HEADER);
                then.status(200).json_body(serde_json::json!({ "data": [] }));
            })
            .await;
        let anonymous = server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions");
                then.status(401).body("{\"message\": \"You are not subscribed to this API.\"}");
            })
            .await;

        let mut config = MockConfig::new(server.url("/predictions"));
        config.credential = None;
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        keyed.assert_hits_async(0).await;
        anonymous.assert_async().await;
        assert!(matches!(
            outcome.result,
            FetchResult::Failed { status: Some(401), .. }
        ));
    }

    #[test]
    fn test_request_url_carries_query_parameters() {
        let config = MockConfig::new("https://api.example.com/api/v2/predictions".to_string());
        let url = PredictionFetcher::request_url(&config, target()).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v2/predictions?iso_date=2024-03-11&federation=UEFA&market=classic"
        );
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_transport_error() {
        // 沒有服務在監聽的埠
        let config = MockConfig::new("http://127.0.0.1:9/predictions".to_string());
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        assert!(matches!(
            outcome.result,
            FetchResult::Failed { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_truncated_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // 宣告的 Content-Length 比實際送出的長，讀 body 會失敗
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"data\": [")
                .await
                .unwrap();
        });

        let config = MockConfig::new(format!("http://{}/predictions", addr));
        let outcome = PredictionFetcher::new().unwrap().fetch(&config, target()).await;

        assert_eq!(
            outcome.result,
            FetchResult::Failed {
                status: Some(200),
                body: String::new(),
            }
        );
    }
}
