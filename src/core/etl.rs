use crate::core::report::format_money;
use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct SplitEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SplitEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<String> {
        tracing::info!("Starting receipt split...");

        // Extract
        tracing::info!("Parsing receipt...");
        let (items, diagnostics) = self.pipeline.extract()?;
        tracing::info!(
            "Parsed {} items ({} entries skipped)",
            items.len(),
            diagnostics.skipped().len()
        );

        // Transform
        tracing::info!("Splitting items between buyers...");
        let report = self.pipeline.transform(items, diagnostics)?;
        for (buyer, amount) in report.summary.split.iter() {
            tracing::info!("  {}: £{}", buyer, format_money(amount));
        }
        tracing::info!(
            "Order total £{}, assigned £{}, remaining £{}",
            format_money(report.summary.total_order_value),
            format_money(report.summary.total_assigned),
            format_money(report.summary.total_remaining)
        );

        // Load
        tracing::info!("Writing reports...");
        let output_path = self.pipeline.load(report)?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
