use crate::core::clock::{tomorrow_in, SystemClock};
use crate::core::fetcher::PredictionFetcher;
use crate::core::render::Renderer;
use crate::core::{Clock, ConfigProvider, FetchOutcome, Pipeline, RenderedReport, Storage};
use crate::utils::error::Result;
use std::path::Path;

/// 預測資料管道：抓取明日預測、轉成 Markdown、覆寫輸出檔
pub struct PredictionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: PredictionFetcher,
    renderer: Renderer,
    clock: Box<dyn Clock>,
}

impl<S: Storage, C: ConfigProvider> PredictionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let renderer = Renderer::new(
            config.source_timezone(),
            config.display_timezone(),
            config.federation(),
        );

        Ok(Self {
            storage,
            config,
            fetcher: PredictionFetcher::new()?,
            renderer,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PredictionPipeline<S, C> {
    async fn extract(&self) -> Result<FetchOutcome> {
        let target_date = tomorrow_in(self.clock.as_ref(), self.config.source_timezone());
        tracing::info!(
            "🚀 Fetching {} predictions for {} ({})",
            self.config.federation(),
            target_date,
            self.config.source_timezone().name()
        );

        Ok(self.fetcher.fetch(&self.config, target_date).await)
    }

    async fn transform(&self, outcome: FetchOutcome) -> Result<RenderedReport> {
        tracing::debug!("Rendering {} matches", outcome.matches().len());
        self.renderer.render(&outcome, self.clock.now())
    }

    async fn load(&self, report: RenderedReport) -> Result<String> {
        let file_name = self.config.output_file();
        let output_path = Path::new(self.config.output_dir())
            .join(file_name)
            .display()
            .to_string();

        tracing::debug!(
            "Writing {} bytes ({} rows) to storage",
            report.markdown.len(),
            report.row_count
        );
        self.storage
            .write_file(file_name, report.markdown.as_bytes())
            .await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::render::EMPTY_ROW;
    use crate::core::test_support::{MockConfig, MockStorage};
    use chrono::{NaiveDate, TimeZone, Utc};
    use httpmock::prelude::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_extract_queries_tomorrow_in_source_timezone() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/predictions")
                    .query_param("iso_date", "2024-03-11");
                then.status(200).json_body(serde_json::json!({
                    "data": [{
                        "start_date": "2024-03-11T20:00:00",
                        "home_team": "Real Madrid",
                        "away_team": "Leipzig",
                        "prediction": "1",
                        "odds": {"1": 1.3, "X": 5.5, "2": 9.0}
                    }]
                }));
            })
            .await;

        let pipeline = PredictionPipeline::new(
            MockStorage::new(),
            MockConfig::new(server.url("/predictions")),
        )
        .unwrap()
        .with_clock(clock());

        let outcome = pipeline.extract().await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(outcome.target_date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(outcome.matches().len(), 1);
    }

    #[tokio::test]
    async fn test_transform_uses_clock_for_generation_time() {
        let pipeline = PredictionPipeline::new(
            MockStorage::new(),
            MockConfig::new("http://test.invalid/predictions".to_string()),
        )
        .unwrap()
        .with_clock(clock());

        let outcome = FetchOutcome {
            target_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            result: crate::core::FetchResult::Failed {
                status: Some(503),
                body: String::new(),
            },
        };

        let report = pipeline.transform(outcome).await.unwrap();

        assert!(report.markdown.contains("2024-03-10 15:00:00 (Asia/Seoul)"));
        assert!(report.markdown.contains(EMPTY_ROW));
    }

    #[tokio::test]
    async fn test_load_overwrites_output_file() {
        let storage = MockStorage::new();
        let pipeline = PredictionPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.invalid/predictions".to_string()),
        )
        .unwrap();

        let report = |markdown: &str| RenderedReport {
            target_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            markdown: markdown.to_string(),
            row_count: 0,
            placeholder: true,
        };

        pipeline.load(report("first run")).await.unwrap();
        let path = pipeline.load(report("second run")).await.unwrap();

        assert!(path.ends_with("README.md"));
        assert_eq!(
            storage.get_file("README.md").await.unwrap(),
            b"second run".to_vec()
        );
    }
}
