//! Prohibited-origin (foreign entity of concern) regime
//!
//! Concern-origin content is uncapped before the effective year and capped
//! at 0% from it on. The verdict is always concrete: items of unknown origin
//! simply contribute nothing to the concern total.

use shared_types::{
    percent_of, AggregatedTotals, ComplianceConfiguration, FeocAssessment, FeocLineItem,
    OriginClass, ResolvedComponent,
};
use std::collections::BTreeSet;

use crate::aggregation::OriginPolicy;
use crate::config::FeocConfig;

/// Evaluate concern-origin content against the year's cap
pub fn evaluate_feoc(
    totals: &AggregatedTotals,
    components: &[ResolvedComponent],
    project: &ComplianceConfiguration,
    config: &FeocConfig,
    policy: &OriginPolicy,
) -> FeocAssessment {
    let max_allowed_percent = config.max_allowed_concern_percent(project.installation_year);
    let total_concern_percent = percent_of(totals.concern_origin_total(), totals.total());

    let items: Vec<FeocLineItem> = components
        .iter()
        .filter(|c| policy.classify(c) == OriginClass::Concern)
        .filter_map(|c| {
            Some(FeocLineItem {
                name: c.item.name.clone(),
                matched_sku: c.matched_sku.clone(),
                origin_country: c.resolved_origin_country.clone()?,
                line_total: c.resolved_line_total.filter(|amount| amount.is_finite())?,
                bucket: c.bucket,
            })
        })
        .collect();

    let countries: Vec<String> = items
        .iter()
        .map(|item| item.origin_country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    FeocAssessment {
        // Credit lines can push the share past 100%; before the effective
        // year there is no cap at all
        compliant: !config.is_restricted(project.installation_year)
            || total_concern_percent <= max_allowed_percent,
        detected: totals.concern_origin_total() > 0.0,
        total_concern_percent,
        max_allowed_percent,
        steel_iron_concern_percent: totals.steel_iron.concern_percent(),
        manufactured_concern_percent: totals.manufactured.concern_percent(),
        countries,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use pretty_assertions::assert_eq;
    use shared_types::{Bucket, RawLineItem, TriState};

    fn priced(name: &str, bucket: Bucket, total: Option<f64>, origin: Option<&str>) -> ResolvedComponent {
        ResolvedComponent {
            item: RawLineItem::new(name),
            matched_sku: None,
            resolved_unit_price: None,
            resolved_line_total: total,
            resolved_origin_country: origin.map(str::to_string),
            resolved_is_domestic: TriState::Unknown,
            bucket,
            price_source: None,
            origin_source: None,
            domestic_source: None,
        }
    }

    fn evaluate(components: &[ResolvedComponent], year: i32) -> FeocAssessment {
        let policy = OriginPolicy::default();
        let totals = aggregate(components, &policy);
        evaluate_feoc(
            &totals,
            components,
            &ComplianceConfiguration::for_year(year),
            &FeocConfig::default(),
            &policy,
        )
    }

    #[test]
    fn test_concern_content_fails_after_effective_year() {
        let components = vec![
            priced("Rail", Bucket::SteelIron, Some(1000.0), Some("US")),
            priced("Module", Bucket::Manufactured, Some(9000.0), Some("CN")),
        ];
        let result = evaluate(&components, 2026);

        assert!(!result.compliant);
        assert!(result.detected);
        assert_eq!(result.total_concern_percent, 90.0);
        assert_eq!(result.max_allowed_percent, 0.0);
        assert_eq!(result.countries, vec!["CN".to_string()]);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.manufactured_concern_percent, 100.0);
    }

    #[test]
    fn test_no_restriction_before_effective_year() {
        let components = vec![priced("Module", Bucket::Manufactured, Some(9000.0), Some("CN"))];
        let result = evaluate(&components, 2025);

        assert!(result.compliant);
        assert!(result.detected);
    }

    #[test]
    fn test_unknown_origin_does_not_block_verdict() {
        let components = vec![priced("Module", Bucket::Manufactured, Some(9000.0), None)];
        let result = evaluate(&components, 2027);

        assert!(result.compliant);
        assert!(!result.detected);
        assert!(result.countries.is_empty());
    }

    #[test]
    fn test_unpriced_concern_items_are_not_listed() {
        let components = vec![
            priced("Module", Bucket::Manufactured, None, Some("CN")),
            priced("Inverter", Bucket::Manufactured, Some(100.0), Some("KR")),
        ];
        let result = evaluate(&components, 2027);

        assert!(result.compliant);
        assert!(!result.detected);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_countries_are_distinct_and_sorted() {
        let components = vec![
            priced("A", Bucket::Manufactured, Some(1.0), Some("RU")),
            priced("B", Bucket::Manufactured, Some(1.0), Some("CN")),
            priced("C", Bucket::SteelIron, Some(1.0), Some("CN")),
        ];
        let result = evaluate(&components, 2026);
        assert_eq!(result.countries, vec!["CN".to_string(), "RU".to_string()]);
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn test_empty_project_is_compliant() {
        let result = evaluate(&[], 2030);
        assert!(result.compliant);
        assert_eq!(result.total_concern_percent, 0.0);
    }

    #[test]
    fn test_credit_lines_do_not_fail_unrestricted_years() {
        let components = vec![
            priced("Module", Bucket::Manufactured, Some(9000.0), Some("CN")),
            priced("Rebate", Bucket::Manufactured, Some(-8000.0), Some("VN")),
        ];
        let result = evaluate(&components, 2025);
        assert_eq!(result.total_concern_percent, 900.0);
        assert!(result.compliant);

        assert!(!evaluate(&components, 2026).compliant);
    }
}
