use claims_simulation::{generate_from_catalogs, seeded_rng, Claim, Dataset};
use rand::Rng;

use crate::analyzer::{analyze_dataset, DatasetAnalysis};
use crate::config::PipelineConfig;
use crate::error::AnalyticsResult;
use crate::report::{generate_report, AnalysisReport};

/// Everything a pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: Dataset,
    pub analysis: DatasetAnalysis,
    pub report: AnalysisReport,
}

impl PipelineOutput {
    pub fn claims(&self) -> &[Claim] {
        &self.dataset.claims
    }
}

/// Run generation, analysis and reporting from a stream seeded with
/// `config.simulation.seed`. The same configuration always yields the same
/// report.
pub fn run_pipeline(config: &PipelineConfig) -> AnalyticsResult<PipelineOutput> {
    let mut rng = seeded_rng(config.simulation.seed);
    run_pipeline_with(config, &mut rng)
}

/// Run the pipeline on a caller-owned stream. Draw order is fixed: base
/// rates, claims in id order, confusion-matrix predictions, risk predictions.
#[tracing::instrument(skip_all, fields(total_claims = config.simulation.total_claims))]
pub fn run_pipeline_with<R: Rng + ?Sized>(
    config: &PipelineConfig,
    rng: &mut R,
) -> AnalyticsResult<PipelineOutput> {
    let catalogs = config.validate()?;

    let dataset = generate_from_catalogs(&config.simulation, catalogs, rng)?;
    let analysis = analyze_dataset(
        &dataset.claims,
        &config.analytics.confusion_prediction,
        rng,
    );
    let report = generate_report(config, &dataset, &analysis, rng)?;

    tracing::info!(
        claims = report.dataset_summary.total_claims,
        denied = report.dataset_summary.status_breakdown.denied,
        "analysis pipeline complete"
    );

    Ok(PipelineOutput {
        dataset,
        analysis,
        report,
    })
}

/// Denial analytics service
#[derive(Default)]
pub struct DenialAnalyticsService {
    config: PipelineConfig,
}

impl DenialAnalyticsService {
    /// Create a service from a validated configuration
    pub fn new(config: PipelineConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full run, keeping the claim population alongside the report
    pub fn run(&self) -> AnalyticsResult<PipelineOutput> {
        run_pipeline(&self.config)
    }

    /// Report only
    pub fn report(&self) -> AnalyticsResult<AnalysisReport> {
        Ok(self.run()?.report)
    }

    /// Report serialized as pretty JSON
    pub fn report_json(&self) -> AnalyticsResult<String> {
        self.report()?.to_json_pretty()
    }
}
