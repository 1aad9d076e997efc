use crate::domain::model::{FetchOutcome, RenderedReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn credential(&self) -> Option<&str>;
    fn source_timezone(&self) -> Tz;
    fn display_timezone(&self) -> Tz;
    fn federation(&self) -> &str;
    fn market(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn output_file(&self) -> &str;

    /// 預設沿用 HTTP client 的逾時設定
    fn timeout_seconds(&self) -> Option<u64> {
        None
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FetchOutcome>;
    async fn transform(&self, outcome: FetchOutcome) -> Result<RenderedReport>;
    async fn load(&self, report: RenderedReport) -> Result<String>;
}
