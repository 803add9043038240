use anyhow::{Context, Result};
use colored::Colorize;
use denial_analytics::{AnalysisReport, MetricValue};
use std::fmt::{self, Write};

fn pct(value: MetricValue) -> String {
    match value {
        MetricValue::Defined(_) => format!("{}%", value),
        MetricValue::Undefined => value.to_string(),
    }
}

struct Styler {
    color: bool,
}

impl Styler {
    fn title(&self, text: &str) -> String {
        if self.color {
            text.bright_cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bright_white().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: String) -> String {
        if self.color {
            text.bright_yellow().to_string()
        } else {
            text
        }
    }
}

/// Human-readable digest of a report. Undefined metrics print as `N/A`.
pub fn render_summary(report: &AnalysisReport, color: bool) -> Result<String> {
    let mut out = String::new();
    write_summary(&mut out, report, &Styler { color }).context("Failed to render report summary")?;
    Ok(out)
}

fn write_summary<W: Write>(out: &mut W, report: &AnalysisReport, s: &Styler) -> fmt::Result {
    let summary = &report.dataset_summary;
    let conclusion = &report.conclusion_validation;

    writeln!(out, "{}", s.title("Healthcare Claims Dataset Analysis"))?;
    writeln!(out, "=================================")?;
    writeln!(out, "Total Claims: {}", s.value(summary.total_claims.to_string()))?;
    writeln!(out, "Date Range: {}", summary.date_range)?;

    writeln!(out, "\n{}", s.heading("Status Breakdown:"))?;
    let breakdown = &summary.status_breakdown;
    let percentages = &summary.percentages;
    writeln!(out, "- Paid: {} ({})", breakdown.paid, pct(percentages.paid))?;
    writeln!(out, "- Denied: {} ({})", breakdown.denied, pct(percentages.denied))?;
    writeln!(
        out,
        "- No Response: {} ({})",
        breakdown.no_response,
        pct(percentages.no_response)
    )?;

    let range = match conclusion.denial_rate_range {
        Some(r) => format!("{:.1}% - {:.1}%", r.min, r.max),
        None => MetricValue::Undefined.to_string(),
    };
    writeln!(out, "\nDenial Rate Range (Monthly): {}", s.value(range))?;
    writeln!(out, "No Response Claims Rate: {}", pct(conclusion.no_response_rate))?;

    writeln!(out, "\n{}", s.heading("Top Denial Factors:"))?;
    for factor in &conclusion.top_denial_factors {
        writeln!(out, "- {}", factor)?;
    }

    let metrics = &conclusion.model_performance;
    writeln!(out, "\n{}", s.heading("Model Performance Metrics:"))?;
    writeln!(out, "- Accuracy: {}", pct(metrics.accuracy))?;
    writeln!(out, "- Precision: {}", pct(metrics.precision))?;
    writeln!(out, "- Recall: {}", pct(metrics.recall))?;
    writeln!(out, "- F1 Score: {}", pct(metrics.f1_score))?;

    let high_risk = &conclusion.high_risk_identification;
    writeln!(out, "\n{}", s.heading("High Risk Claims Identification:"))?;
    writeln!(
        out,
        "- {} claims identified as high risk (>70% probability)",
        high_risk.count
    )?;
    writeln!(out, "- {} of these were actually denied", high_risk.denied_count)?;
    writeln!(
        out,
        "- Prediction accuracy for high risk claims: {}",
        pct(high_risk.accuracy)
    )?;

    let target = &conclusion.target_check;
    writeln!(out, "\n{}", s.heading("Target Check:"))?;
    writeln!(
        out,
        "- Months inside {:.1}% - {:.1}% band: {} ({} outside)",
        target.target_denial_rate.min,
        target.target_denial_rate.max,
        target.months_inside_target,
        target.months_outside_target
    )?;
    for (name, comparison) in [
        ("Accuracy", target.model_targets.accuracy),
        ("Precision", target.model_targets.precision),
        ("Recall", target.model_targets.recall),
    ] {
        writeln!(
            out,
            "- {} target {:.1}%, realized {}",
            name,
            comparison.target,
            pct(comparison.realized)
        )?;
    }

    let automation = &report.automation_analysis;
    writeln!(out, "\n{}", s.heading("Automation Workflow Performance:"))?;
    for workflow in &automation.workflow_performance {
        writeln!(
            out,
            "- {}: {} claims processed, {:.1}% success rate, {:.1}% time reduction",
            workflow.name, workflow.claims_processed, workflow.success_rate, workflow.time_reduction
        )?;
    }

    let impact = &automation.financial_impact;
    writeln!(out, "\n{}", s.heading("Financial Impact of Automation:"))?;
    writeln!(out, "- Labor Cost Savings: ${:.2}", impact.total_labor_saved)?;
    writeln!(out, "- Revenue Protected: ${:.2}", impact.total_revenue_saved)?;
    writeln!(
        out,
        "- Total Financial Impact: {}",
        s.value(format!("${:.2}", impact.total_impact))
    )?;

    Ok(())
}
