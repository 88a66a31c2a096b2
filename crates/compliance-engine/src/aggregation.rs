//! Reduction of resolved components into per-bucket cost totals
//!
//! Unknown origin is tracked as its own sub-total and never folded into
//! domestic or foreign. Components without a finite price are excluded from
//! every total; they only bump `unpriced_items`. Negative amounts (credits)
//! are summed like any other line.

use shared_types::{AggregatedTotals, OriginClass, ResolvedComponent, TriState};

use crate::config::EngineConfig;
use crate::country::normalize_country;

/// Attribution rules for a component's cost
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    domestic_country: String,
    concern_countries: Vec<String>,
}

impl OriginPolicy {
    pub fn new(domestic_country: &str, concern_countries: &[String]) -> Self {
        Self {
            domestic_country: normalize_country(domestic_country)
                .unwrap_or_else(|| domestic_country.to_uppercase()),
            concern_countries: concern_countries
                .iter()
                .filter_map(|c| normalize_country(c))
                .collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.domestic_code(), &config.feoc.countries)
    }

    pub fn is_concern_country(&self, code: &str) -> bool {
        self.concern_countries.iter().any(|c| c == code)
    }

    /// Domestic if flagged or from the domestic country; concern if from a
    /// designated country; foreign if explicitly non-domestic; else unknown.
    pub fn classify(&self, component: &ResolvedComponent) -> OriginClass {
        let country = component.resolved_origin_country.as_deref();

        if component.resolved_is_domestic == TriState::Yes
            || country == Some(self.domestic_country.as_str())
        {
            return OriginClass::Domestic;
        }
        match country {
            Some(code) if self.is_concern_country(code) => OriginClass::Concern,
            Some(_) => OriginClass::Foreign,
            None if component.resolved_is_domestic == TriState::No => OriginClass::Foreign,
            None => OriginClass::Unknown,
        }
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Sum resolved components into bucket totals. Order-independent.
pub fn aggregate(components: &[ResolvedComponent], policy: &OriginPolicy) -> AggregatedTotals {
    components
        .iter()
        .fold(AggregatedTotals::default(), |mut totals, component| {
            match component.resolved_line_total.filter(|amount| amount.is_finite()) {
                Some(amount) => totals
                    .bucket_mut(component.bucket)
                    .record(amount, policy.classify(component)),
                None => totals.unpriced_items += 1,
            }
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{Bucket, RawLineItem};

    fn component(
        bucket: Bucket,
        total: Option<f64>,
        origin: Option<&str>,
        domestic: TriState,
    ) -> ResolvedComponent {
        ResolvedComponent {
            item: RawLineItem::new("part"),
            matched_sku: None,
            resolved_unit_price: None,
            resolved_line_total: total,
            resolved_origin_country: origin.map(str::to_string),
            resolved_is_domestic: domestic,
            bucket,
            price_source: None,
            origin_source: None,
            domestic_source: None,
        }
    }

    #[test]
    fn test_origin_classes() {
        let policy = OriginPolicy::default();
        let class = |origin, domestic| {
            policy.classify(&component(Bucket::Manufactured, Some(1.0), origin, domestic))
        };

        assert_eq!(class(None, TriState::Yes), OriginClass::Domestic);
        assert_eq!(class(Some("US"), TriState::Unknown), OriginClass::Domestic);
        assert_eq!(class(Some("CN"), TriState::Unknown), OriginClass::Concern);
        assert_eq!(class(Some("CN"), TriState::No), OriginClass::Concern);
        assert_eq!(class(Some("VN"), TriState::Unknown), OriginClass::Foreign);
        assert_eq!(class(None, TriState::No), OriginClass::Foreign);
        assert_eq!(class(None, TriState::Unknown), OriginClass::Unknown);
    }

    #[test]
    fn test_totals_balance_per_bucket() {
        let components = vec![
            component(Bucket::SteelIron, Some(1000.0), None, TriState::Yes),
            component(Bucket::SteelIron, Some(200.0), Some("MX"), TriState::Unknown),
            component(Bucket::Manufactured, Some(9000.0), Some("CN"), TriState::Unknown),
            component(Bucket::Manufactured, Some(300.0), None, TriState::Unknown),
        ];
        let totals = aggregate(&components, &OriginPolicy::default());

        assert_eq!(totals.steel_iron.total, 1200.0);
        assert_eq!(totals.steel_iron.domestic_total, 1000.0);
        assert_eq!(totals.steel_iron.foreign_total, 200.0);
        assert_eq!(totals.manufactured.total, 9300.0);
        assert_eq!(totals.manufactured.concern_origin_total, 9000.0);
        assert_eq!(totals.manufactured.foreign_total, 9000.0);
        assert_eq!(totals.manufactured.unknown_origin_total, 300.0);
        assert_eq!(totals.manufactured.domestic_percent(), None);
        assert_eq!(totals.total(), 10500.0);
    }

    #[test]
    fn test_unpriced_components_are_excluded() {
        let components = vec![
            component(Bucket::Manufactured, Some(500.0), Some("US"), TriState::Unknown),
            component(Bucket::Manufactured, None, None, TriState::Unknown),
        ];
        let totals = aggregate(&components, &OriginPolicy::default());

        assert_eq!(totals.manufactured.total, 500.0);
        assert_eq!(totals.manufactured.unknown_origin_total, 0.0);
        assert_eq!(totals.manufactured.item_count, 1);
        assert_eq!(totals.unpriced_items, 1);
        assert_eq!(totals.manufactured.domestic_percent(), Some(100.0));
    }

    #[test]
    fn test_unknown_origin_credit_keeps_percentage_null() {
        let components = vec![
            component(Bucket::SteelIron, Some(1000.0), None, TriState::Yes),
            component(Bucket::SteelIron, Some(-100.0), None, TriState::Unknown),
        ];
        let totals = aggregate(&components, &OriginPolicy::default());

        assert_eq!(totals.steel_iron.total, 900.0);
        assert_eq!(totals.steel_iron.unknown_origin_total, -100.0);
        assert_eq!(totals.steel_iron.unknown_item_count, 1);
        assert_eq!(totals.steel_iron.domestic_percent(), None);
    }

    #[test]
    fn test_non_finite_amounts_are_unpriced() {
        let components = vec![
            component(Bucket::Manufactured, Some(f64::NAN), Some("US"), TriState::Unknown),
            component(Bucket::Manufactured, Some(f64::INFINITY), None, TriState::Unknown),
            component(Bucket::Manufactured, Some(200.0), Some("US"), TriState::Unknown),
        ];
        let totals = aggregate(&components, &OriginPolicy::default());

        assert_eq!(totals.unpriced_items, 2);
        assert_eq!(totals.manufactured.total, 200.0);
        assert_eq!(totals.manufactured.domestic_percent(), Some(100.0));
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut components = vec![
            component(Bucket::SteelIron, Some(10.0), Some("US"), TriState::Unknown),
            component(Bucket::Manufactured, Some(20.0), Some("KR"), TriState::Unknown),
            component(Bucket::Manufactured, Some(30.0), None, TriState::Unknown),
        ];
        let forward = aggregate(&components, &OriginPolicy::default());
        components.reverse();
        let backward = aggregate(&components, &OriginPolicy::default());
        assert_eq!(forward, backward);
    }
}
