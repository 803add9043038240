use claims_simulation::{Claim, ReferenceCatalogs};
use serde::Serialize;

use crate::analyzer::DatasetAnalysis;
use crate::error::AnalyticsResult;
use crate::metrics::{percent, MetricValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleImportance {
    pub rule_id: u32,
    pub rule_name: String,
    pub violation_count: usize,
    pub percent_of_violations: MetricValue,
    pub denial_rate: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerAnalysis {
    pub payer_name: String,
    pub total_claims: usize,
    pub denial_rate: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyAnalysis {
    pub specialty_name: String,
    pub total_claims: usize,
    pub denial_rate: MetricValue,
}

/// Rankings, each sorted by denial rate, highest first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureImportance {
    pub rule_importance: Vec<RuleImportance>,
    pub payer_analysis: Vec<PayerAnalysis>,
    pub specialty_analysis: Vec<SpecialtyAnalysis>,
}

fn denial_rate_where<F>(claims: &[Claim], mut predicate: F) -> (usize, MetricValue)
where
    F: FnMut(&Claim) -> bool,
{
    let (total, denied) = claims
        .iter()
        .filter(|c| predicate(c))
        .fold((0, 0), |(total, denied), c| {
            (total + 1, denied + usize::from(c.is_denied()))
        });
    (total, percent(denied, total))
}

/// Violated rules in ascending id order before sorting, so ties keep id order
pub fn rank_rules(
    claims: &[Claim],
    analysis: &DatasetAnalysis,
    catalogs: &ReferenceCatalogs,
) -> AnalyticsResult<Vec<RuleImportance>> {
    let total_violations = analysis.total_violations();
    let mut ranking = Vec::with_capacity(analysis.rule_violations.len());

    for (&rule_id, &violation_count) in &analysis.rule_violations {
        let rule = catalogs.rule(rule_id)?;
        let (_, denial_rate) = denial_rate_where(claims, |c| c.violates(rule_id));
        ranking.push(RuleImportance {
            rule_id,
            rule_name: rule.name.clone(),
            violation_count,
            percent_of_violations: percent(violation_count, total_violations),
            denial_rate,
        });
    }

    ranking.sort_by(|a, b| a.denial_rate.cmp_desc(&b.denial_rate));
    Ok(ranking)
}

/// Every catalog payer, including ones with no claims (undefined rate)
pub fn rank_payers(claims: &[Claim], catalogs: &ReferenceCatalogs) -> Vec<PayerAnalysis> {
    let mut ranking: Vec<PayerAnalysis> = catalogs
        .payers()
        .iter()
        .map(|payer| {
            let (total_claims, denial_rate) =
                denial_rate_where(claims, |c| c.attributes.payer == payer.name);
            PayerAnalysis {
                payer_name: payer.name.clone(),
                total_claims,
                denial_rate,
            }
        })
        .collect();
    ranking.sort_by(|a, b| a.denial_rate.cmp_desc(&b.denial_rate));
    ranking
}

pub fn rank_specialties(claims: &[Claim], catalogs: &ReferenceCatalogs) -> Vec<SpecialtyAnalysis> {
    let mut ranking: Vec<SpecialtyAnalysis> = catalogs
        .specialties()
        .iter()
        .map(|specialty| {
            let (total_claims, denial_rate) =
                denial_rate_where(claims, |c| c.attributes.specialty == specialty.name);
            SpecialtyAnalysis {
                specialty_name: specialty.name.clone(),
                total_claims,
                denial_rate,
            }
        })
        .collect();
    ranking.sort_by(|a, b| a.denial_rate.cmp_desc(&b.denial_rate));
    ranking
}

#[tracing::instrument(skip_all)]
pub fn analyze_feature_importance(
    claims: &[Claim],
    analysis: &DatasetAnalysis,
    catalogs: &ReferenceCatalogs,
) -> AnalyticsResult<FeatureImportance> {
    Ok(FeatureImportance {
        rule_importance: rank_rules(claims, analysis, catalogs)?,
        payer_analysis: rank_payers(claims, catalogs),
        specialty_analysis: rank_specialties(claims, catalogs),
    })
}
