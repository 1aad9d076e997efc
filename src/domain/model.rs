use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// 單場比賽的預測資料，`start_date` 為來源時區的本地時間
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub start_date: String,
    pub home_team: String,
    pub away_team: String,
    pub prediction: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub odds: HashMap<String, serde_json::Value>,
}

// API 對沒有賠率的比賽會送 `"odds": null`
fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Match {
    /// 預測結果對應的賠率，沒有或為 null 時回傳 None
    pub fn predicted_odds(&self) -> Option<String> {
        match self.odds.get(&self.prediction)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// 依 `start_date` 字串排序的比賽列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    matches: Vec<Match>,
}

impl PredictionSet {
    pub fn from_unsorted(mut matches: Vec<Match>) -> Self {
        // stable sort，同時間的比賽保留 API 的順序
        matches.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Self { matches }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// API 回應的外層結構
#[derive(Debug, Deserialize)]
pub struct PredictionsResponse {
    pub data: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Ok(PredictionSet),
    /// `status` 為 None 表示請求沒有得到 HTTP 回應
    Failed { status: Option<u16>, body: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub target_date: NaiveDate,
    pub result: FetchResult,
}

impl FetchOutcome {
    /// 失敗時視為沒有比賽
    pub fn matches(&self) -> &[Match] {
        match &self.result {
            FetchResult::Ok(set) => set.matches(),
            FetchResult::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.result, FetchResult::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub target_date: NaiveDate,
    pub markdown: String,
    pub row_count: usize,
    pub placeholder: bool,
}
