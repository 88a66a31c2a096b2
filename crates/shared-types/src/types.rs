use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tristate::TriState;

/// One component as reported by the pricing source or a user-entered record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub name: String,
    /// Free-text hint used for classification and matching
    #[serde(default, rename = "type", alias = "item_type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default, alias = "unitPrice")]
    pub unit_price: Option<f64>,
    #[serde(default, alias = "lineTotal")]
    pub line_total: Option<f64>,
    #[serde(default, alias = "originCountry")]
    pub origin_country: Option<String>,
    #[serde(default, alias = "isDomestic")]
    pub is_domestic: Option<bool>,
}

impl RawLineItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Explicit line total, else `unit_price * quantity` when both are present.
    /// Never defaults to zero.
    pub fn effective_line_total(&self) -> Option<f64> {
        self.line_total.or(match (self.unit_price, self.quantity) {
            (Some(price), Some(qty)) => Some(price * qty),
            _ => None,
        })
    }

    /// Lower-cased `name` and `type` joined for keyword matching
    pub fn classification_text(&self) -> String {
        match &self.item_type {
            Some(t) => format!("{} {}", self.name, t).to_lowercase(),
            None => self.name.to_lowercase(),
        }
    }
}

/// Regulatory cost bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Structural steel and iron hardware
    SteelIron,
    /// Panels, inverters, batteries, electronics and anything uncategorised
    Manufactured,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::SteelIron, Bucket::Manufactured];

    pub fn key(&self) -> &'static str {
        match self {
            Bucket::SteelIron => "steel_iron",
            Bucket::Manufactured => "manufactured",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Bucket::SteelIron => "Steel/iron",
            Bucket::Manufactured => "Manufactured products",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Where a resolved fact came from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSource {
    LineItem,
    CatalogBySku,
    MaterialsBySku,
    CatalogFuzzy,
    MaterialsByName,
}

/// A raw line item plus its resolution outcome. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    pub item: RawLineItem,
    pub matched_sku: Option<String>,
    pub resolved_unit_price: Option<f64>,
    pub resolved_line_total: Option<f64>,
    /// Normalised two-letter code where recognised
    pub resolved_origin_country: Option<String>,
    pub resolved_is_domestic: TriState,
    pub bucket: Bucket,
    pub price_source: Option<FactSource>,
    /// Where `resolved_origin_country` came from
    pub origin_source: Option<FactSource>,
    /// Where `resolved_is_domestic` came from
    pub domestic_source: Option<FactSource>,
}

/// How a priced component's cost is attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    Domestic,
    /// Foreign, from a designated entity-of-concern country
    Concern,
    Foreign,
    Unknown,
}

/// Cost totals for one bucket.
///
/// `total == domestic_total + foreign_total + unknown_origin_total`, and
/// `concern_origin_total` is a subset of `foreign_total`. Amounts may be
/// negative (credit lines), so unknown origin is tracked by item count as
/// well as by cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub total: f64,
    pub domestic_total: f64,
    pub foreign_total: f64,
    pub concern_origin_total: f64,
    pub unknown_origin_total: f64,
    pub item_count: usize,
    /// Priced items whose origin could not be determined
    pub unknown_item_count: usize,
}

impl BucketTotals {
    pub fn record(&mut self, amount: f64, class: OriginClass) {
        self.total += amount;
        self.item_count += 1;
        match class {
            OriginClass::Domestic => self.domestic_total += amount,
            OriginClass::Concern => {
                self.concern_origin_total += amount;
                self.foreign_total += amount;
            }
            OriginClass::Foreign => self.foreign_total += amount,
            OriginClass::Unknown => {
                self.unknown_origin_total += amount;
                self.unknown_item_count += 1;
            }
        }
    }

    /// No priced item landed in this bucket
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// True for any unknown-origin item, whatever the sign of its amount
    pub fn has_unknown_origin(&self) -> bool {
        self.unknown_item_count > 0
    }

    /// Domestic share in percent; `None` while any item has unknown origin
    /// or the bucket's total is zero.
    pub fn domestic_percent(&self) -> Option<f64> {
        self.known_share(self.domestic_total)
    }

    /// Foreign share in percent; same definedness rule as `domestic_percent`.
    pub fn foreign_percent(&self) -> Option<f64> {
        self.known_share(self.foreign_total)
    }

    /// Concern-origin share in percent. Defined regardless of unknown cost;
    /// zero for an empty bucket.
    pub fn concern_percent(&self) -> f64 {
        percent_of(self.concern_origin_total, self.total)
    }

    fn known_share(&self, part: f64) -> Option<f64> {
        if self.has_unknown_origin() || self.total == 0.0 {
            None
        } else {
            Some(percent_of(part, self.total))
        }
    }
}

/// `part / whole * 100`, zero when `whole` is zero
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part * 100.0 / whole
    }
}

/// Per-bucket totals for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTotals {
    pub steel_iron: BucketTotals,
    pub manufactured: BucketTotals,
    /// Items excluded because no price could be determined
    pub unpriced_items: usize,
}

impl AggregatedTotals {
    pub fn bucket(&self, bucket: Bucket) -> &BucketTotals {
        match bucket {
            Bucket::SteelIron => &self.steel_iron,
            Bucket::Manufactured => &self.manufactured,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut BucketTotals {
        match bucket {
            Bucket::SteelIron => &mut self.steel_iron,
            Bucket::Manufactured => &mut self.manufactured,
        }
    }

    pub fn total(&self) -> f64 {
        self.steel_iron.total + self.manufactured.total
    }

    pub fn concern_origin_total(&self) -> f64 {
        self.steel_iron.concern_origin_total + self.manufactured.concern_origin_total
    }

    pub fn unknown_origin_total(&self) -> f64 {
        self.steel_iron.unknown_origin_total + self.manufactured.unknown_origin_total
    }
}

/// Per-call project facts the evaluators need beyond the item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceConfiguration {
    pub installation_year: i32,
    #[serde(default, rename = "maxNetOutputMW", alias = "maxNetOutputMw")]
    pub max_net_output_mw: Option<f64>,
    #[serde(default)]
    pub construction_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub prevailing_wage_compliant: Option<bool>,
}

impl ComplianceConfiguration {
    pub fn for_year(installation_year: i32) -> Self {
        Self {
            installation_year,
            max_net_output_mw: None,
            construction_start_date: None,
            prevailing_wage_compliant: None,
        }
    }
}
