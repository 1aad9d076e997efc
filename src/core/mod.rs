pub mod clock;
pub mod etl;
pub mod fetcher;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{
    FetchOutcome, FetchResult, Match, PredictionSet, PredictionsResponse, RenderedReport,
};
pub use crate::domain::ports::{Clock, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
