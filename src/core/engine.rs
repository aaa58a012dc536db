use crate::domain::model::LoadSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct RelayEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> RelayEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        tracing::info!("🚀 Starting RPScrape relay...");
        self.monitor.log_stats("Start");

        let artifact = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        let transformed = self.pipeline.transform(artifact).await?;
        tracing::info!("Prepared {} records", transformed.records.len());
        self.monitor.log_stats("Transform");

        let summary = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!("✓ RPScrape relay completed successfully!");
        Ok(summary)
    }
}
