//! Domestic-content bonus regime
//!
//! Steel/iron must be 100% domestic; manufactured products must meet the
//! year's escalating threshold. A bucket holding any unknown-origin item is
//! `Unknown`, never pass or fail. A bucket with no priced items passes with
//! a `null` percentage; its `item_count` of zero tells it apart from unknown.

use shared_types::{
    AggregatedTotals, Bucket, BucketAssessment, BucketTotals, ComplianceConfiguration,
    DomesticContentAssessment, TriState,
};

use super::eligibility::evaluate_eligibility;
use super::recommendations::recommendations_for;
use crate::config::{DomesticContentConfig, EligibilityConfig};

/// Tolerance for accumulated floating-point error in percentage comparisons
const PERCENT_EPSILON: f64 = 1e-9;

pub fn assess_bucket(bucket: Bucket, totals: &BucketTotals, required_percent: f64) -> BucketAssessment {
    let domestic_percent = totals.domestic_percent();
    let compliant = if totals.has_unknown_origin() {
        TriState::Unknown
    } else if totals.is_empty() {
        // Nothing to certify
        TriState::Yes
    } else {
        // A zero total over priced items leaves the share undefined
        domestic_percent
            .map(|percent| percent + PERCENT_EPSILON >= required_percent)
            .into()
    };

    BucketAssessment {
        bucket,
        domestic_percent,
        required_percent,
        compliant,
        item_count: totals.item_count,
    }
}

pub fn evaluate_domestic_content(
    totals: &AggregatedTotals,
    project: &ComplianceConfiguration,
    content: &DomesticContentConfig,
    eligibility_config: &EligibilityConfig,
) -> DomesticContentAssessment {
    let steel_iron = assess_bucket(
        Bucket::SteelIron,
        &totals.steel_iron,
        content.steel_iron_required_percent,
    );
    let manufactured = assess_bucket(
        Bucket::Manufactured,
        &totals.manufactured,
        content.required_domestic_percent(project.installation_year),
    );

    let content_compliant = steel_iron.compliant.and(manufactured.compliant);
    let eligibility = evaluate_eligibility(project, eligibility_config);
    let qualified = content_compliant.and(eligibility.eligible);

    let recommendations = recommendations_for(
        &steel_iron,
        &manufactured,
        &eligibility,
        qualified,
        eligibility_config,
    )
    .into_iter()
    .map(|(_, text)| text)
    .collect();

    DomesticContentAssessment {
        steel_iron,
        manufactured,
        content_compliant,
        eligibility,
        qualified,
        recommendations,
    }
}
