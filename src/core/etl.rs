use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ForecastEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ForecastEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting forecast run...");

        // Extract
        let outcome = self.pipeline.extract().await?;
        if outcome.is_failed() {
            tracing::warn!(
                "⚠️ No predictions for {}, the document will show a placeholder",
                outcome.target_date
            );
        } else {
            tracing::info!(
                "Fetched {} matches for {}",
                outcome.matches().len(),
                outcome.target_date
            );
        }
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(outcome).await?;
        tracing::info!("Rendered {} rows", report.row_count);
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
