//! Evaluator results and the output document returned to callers

use serde::{Deserialize, Serialize};

use crate::tristate::TriState;
use crate::types::{AggregatedTotals, Bucket, ResolvedComponent};

/// A priced line item whose origin is a designated entity-of-concern country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeocLineItem {
    pub name: String,
    pub matched_sku: Option<String>,
    pub origin_country: String,
    pub line_total: f64,
    pub bucket: Bucket,
}

/// Outcome of the prohibited-origin regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeocAssessment {
    /// Always concrete: concern detection never depends on unknown origin
    pub compliant: bool,
    pub detected: bool,
    pub total_concern_percent: f64,
    pub max_allowed_percent: f64,
    pub steel_iron_concern_percent: f64,
    pub manufactured_concern_percent: f64,
    /// Distinct concern countries, sorted
    pub countries: Vec<String>,
    pub items: Vec<FeocLineItem>,
}

/// Domestic-content determination for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAssessment {
    pub bucket: Bucket,
    pub domestic_percent: Option<f64>,
    pub required_percent: f64,
    pub compliant: TriState,
    /// Zero means the bucket is empty, not that its origin is unknown
    pub item_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReasons {
    pub small_project: TriState,
    pub early_construction: TriState,
    pub prevailing_wage: TriState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: TriState,
    pub reasons: EligibilityReasons,
}

/// Outcome of the domestic-content bonus regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomesticContentAssessment {
    pub steel_iron: BucketAssessment,
    pub manufactured: BucketAssessment,
    pub content_compliant: TriState,
    pub eligibility: EligibilityResult,
    /// `content_compliant AND eligible`
    pub qualified: TriState,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalsReport {
    pub steel_iron_total: f64,
    pub steel_iron_domestic_total: f64,
    pub steel_iron_foreign_total: f64,
    pub steel_iron_feoc_total: f64,
    pub steel_iron_unknown_total: f64,
    pub steel_iron_item_count: usize,
    pub steel_iron_unknown_items: usize,
    pub manufactured_total: f64,
    pub manufactured_domestic_total: f64,
    pub manufactured_foreign_total: f64,
    pub manufactured_feoc_total: f64,
    pub manufactured_unknown_total: f64,
    pub manufactured_item_count: usize,
    pub manufactured_unknown_items: usize,
    pub total_cost: f64,
    pub unpriced_items: usize,
}

impl From<&AggregatedTotals> for TotalsReport {
    fn from(totals: &AggregatedTotals) -> Self {
        let steel = &totals.steel_iron;
        let manufactured = &totals.manufactured;
        Self {
            steel_iron_total: steel.total,
            steel_iron_domestic_total: steel.domestic_total,
            steel_iron_foreign_total: steel.foreign_total,
            steel_iron_feoc_total: steel.concern_origin_total,
            steel_iron_unknown_total: steel.unknown_origin_total,
            steel_iron_item_count: steel.item_count,
            steel_iron_unknown_items: steel.unknown_item_count,
            manufactured_total: manufactured.total,
            manufactured_domestic_total: manufactured.domestic_total,
            manufactured_foreign_total: manufactured.foreign_total,
            manufactured_feoc_total: manufactured.concern_origin_total,
            manufactured_unknown_total: manufactured.unknown_origin_total,
            manufactured_item_count: manufactured.item_count,
            manufactured_unknown_items: manufactured.unknown_item_count,
            total_cost: totals.total(),
            unpriced_items: totals.unpriced_items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentagesReport {
    pub steel_iron_domestic_percent: Option<f64>,
    pub steel_iron_foreign_percent: Option<f64>,
    pub manufactured_domestic_percent: Option<f64>,
    pub manufactured_foreign_percent: Option<f64>,
    pub feoc_percent: f64,
}

impl From<&AggregatedTotals> for PercentagesReport {
    fn from(totals: &AggregatedTotals) -> Self {
        Self {
            steel_iron_domestic_percent: totals.steel_iron.domestic_percent(),
            steel_iron_foreign_percent: totals.steel_iron.foreign_percent(),
            manufactured_domestic_percent: totals.manufactured.domestic_percent(),
            manufactured_foreign_percent: totals.manufactured.foreign_percent(),
            feoc_percent: crate::types::percent_of(
                totals.concern_origin_total(),
                totals.total(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSection {
    pub feoc_compliant: bool,
    pub max_allowed_feoc_percent: f64,
    pub steel_iron_compliant: TriState,
    pub manufactured_compliant: TriState,
    pub required_manufactured_percent: f64,
    pub domestic_content_compliant: TriState,
    pub domestic_content_bonus_qualified: TriState,
    pub feoc_detected: bool,
    pub feoc_countries: Vec<String>,
    pub feoc_items: Vec<FeocLineItem>,
}

/// The full output document for one project evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub totals: TotalsReport,
    pub percentages: PercentagesReport,
    pub compliance: ComplianceSection,
    pub eligibility: EligibilityResult,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ResolvedComponent>>,
}

impl ComplianceReport {
    pub fn assemble(
        totals: &AggregatedTotals,
        feoc: &FeocAssessment,
        domestic: &DomesticContentAssessment,
    ) -> Self {
        Self {
            totals: TotalsReport::from(totals),
            percentages: PercentagesReport::from(totals),
            compliance: ComplianceSection {
                feoc_compliant: feoc.compliant,
                max_allowed_feoc_percent: feoc.max_allowed_percent,
                steel_iron_compliant: domestic.steel_iron.compliant,
                manufactured_compliant: domestic.manufactured.compliant,
                required_manufactured_percent: domestic.manufactured.required_percent,
                domestic_content_compliant: domestic.content_compliant,
                domestic_content_bonus_qualified: domestic.qualified,
                feoc_detected: feoc.detected,
                feoc_countries: feoc.countries.clone(),
                feoc_items: feoc.items.clone(),
            },
            eligibility: domestic.eligibility,
            recommendations: domestic.recommendations.clone(),
            components: None,
        }
    }

    pub fn with_components(mut self, components: Vec<ResolvedComponent>) -> Self {
        self.components = Some(components);
        self
    }
}
