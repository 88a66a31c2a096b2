//! Record resolution: raw line item -> price/origin facts
//!
//! Facts are merged field by field from a prioritised chain of sources. The
//! line item's own values come first; the reference sources fill the gaps:
//!
//! 1. line item
//! 2. catalog record for the alias-mapped SKU
//! 3. materials reference keyed by the alias-mapped SKU
//! 4. catalog fuzzy match on the name (only without a mapped catalog record)
//! 5. materials reference keyed by the name
//!
//! Each field (price, origin country, domestic flag) comes from the first
//! source that states it, independently of the others. A failed sub-lookup
//! leaves that candidate empty and never aborts the item or the batch.

use futures::stream::{self, StreamExt};
use shared_types::{FactSource, RawLineItem, ResolvedComponent, TriState};
use std::future::pending;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::classifier::BucketClassifier;
use crate::country::normalize_country;
use crate::error::{EngineError, LookupError, Result};
use crate::sources::{AliasTable, MaterialFacts, MaterialsReference, PartRecord, PartsCatalog};

/// Default number of items resolved concurrently
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Sender half of a batch cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiver half, cheap to clone into every batch that should observe it
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once cancelled. Never completes if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let outcome = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if outcome.is_err() {
            pending::<()>().await;
        }
    }
}

pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Per-batch controls
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub deadline: Option<Duration>,
    pub cancellation: Option<Cancellation>,
}

impl BatchOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }
}

/// Lookup accounting for one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub attempted: usize,
    pub failed: usize,
}

impl LookupStats {
    fn settle<T>(
        &mut self,
        source: &'static str,
        key: &str,
        result: std::result::Result<Option<T>, LookupError>,
    ) -> Option<T> {
        self.attempted += 1;
        match result {
            Ok(found) => {
                debug!(source, key, found = found.is_some(), "reference lookup");
                found
            }
            Err(error) => {
                self.failed += 1;
                warn!(source, key, %error, "reference lookup failed; field left absent");
                None
            }
        }
    }

    fn merge(self, other: LookupStats) -> LookupStats {
        LookupStats {
            attempted: self.attempted + other.attempted,
            failed: self.failed + other.failed,
        }
    }
}

/// A resolved component plus the lookups spent on it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub component: ResolvedComponent,
    pub stats: LookupStats,
}

/// One source's view of an item
#[derive(Debug, Clone)]
struct Candidate {
    source: FactSource,
    unit_price: Option<f64>,
    origin_country: Option<String>,
    is_domestic: Option<bool>,
}

impl Candidate {
    fn from_item(item: &RawLineItem) -> Self {
        Self {
            source: FactSource::LineItem,
            unit_price: item.unit_price,
            origin_country: item.origin_country.as_deref().and_then(normalize_country),
            is_domestic: item.is_domestic,
        }
    }

    fn from_part(source: FactSource, part: &PartRecord) -> Self {
        Self {
            source,
            unit_price: part.unit_price,
            origin_country: part.origin_country.as_deref().and_then(normalize_country),
            is_domestic: part.is_domestic,
        }
    }

    fn from_material(source: FactSource, facts: &MaterialFacts) -> Self {
        Self {
            source,
            unit_price: facts.unit_price,
            origin_country: facts.origin_country.as_deref().and_then(normalize_country),
            is_domestic: facts.is_domestic,
        }
    }
}

/// Resolves line items against the injected reference sources.
///
/// Every source is optional; a resolver with none simply carries the line
/// item's own facts through.
#[derive(Clone)]
pub struct RecordResolver {
    classifier: Arc<BucketClassifier>,
    aliases: Option<Arc<dyn AliasTable>>,
    catalog: Option<Arc<dyn PartsCatalog>>,
    materials: Option<Arc<dyn MaterialsReference>>,
    concurrency: usize,
}

impl Default for RecordResolver {
    fn default() -> Self {
        Self::new(Arc::new(BucketClassifier::default()))
    }
}

impl RecordResolver {
    pub fn new(classifier: Arc<BucketClassifier>) -> Self {
        Self {
            classifier,
            aliases: None,
            catalog: None,
            materials: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_aliases(mut self, aliases: Arc<dyn AliasTable>) -> Self {
        self.aliases = Some(aliases);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn PartsCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_materials(mut self, materials: Arc<dyn MaterialsReference>) -> Self {
        self.materials = Some(materials);
        self
    }

    /// Values below 1 are raised to 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn classifier(&self) -> &BucketClassifier {
        &self.classifier
    }

    /// Resolve one item. Never fails: unmatched items come back with
    /// `matched_sku = None` and whatever facts any source supplied.
    pub async fn resolve(&self, item: &RawLineItem) -> ResolvedComponent {
        self.resolve_tracked(item).await.component
    }

    pub async fn resolve_tracked(&self, item: &RawLineItem) -> Resolution {
        let mut stats = LookupStats::default();
        let name = item.name.trim();

        let mapped_sku = match (&self.aliases, name.is_empty()) {
            (Some(aliases), false) => stats.settle(
                "alias table",
                name,
                aliases.resolve(name, item.manufacturer.as_deref()).await,
            ),
            _ => None,
        };

        let mapped_part = match (&self.catalog, &mapped_sku) {
            (Some(catalog), Some(sku)) => {
                stats.settle("catalog by sku", sku, catalog.find_by_sku(sku).await)
            }
            _ => None,
        };

        let mapped_material = match (&self.materials, &mapped_sku) {
            (Some(materials), Some(sku)) => {
                stats.settle("materials by sku", sku, materials.lookup(sku).await)
            }
            _ => None,
        };

        let fuzzy_part = match (&self.catalog, &mapped_part, name.is_empty()) {
            (Some(catalog), None, false) => stats.settle(
                "catalog search",
                name,
                catalog.search_by_name_or_sku(name).await,
            ),
            _ => None,
        };

        let name_material = match (&self.materials, name.is_empty()) {
            (Some(materials), false) => {
                stats.settle("materials by name", name, materials.lookup(name).await)
            }
            _ => None,
        };

        let mut candidates = vec![Candidate::from_item(item)];
        candidates.extend(
            mapped_part
                .as_ref()
                .map(|p| Candidate::from_part(FactSource::CatalogBySku, p)),
        );
        candidates.extend(
            mapped_material
                .as_ref()
                .map(|m| Candidate::from_material(FactSource::MaterialsBySku, m)),
        );
        candidates.extend(
            fuzzy_part
                .as_ref()
                .map(|p| Candidate::from_part(FactSource::CatalogFuzzy, p)),
        );
        candidates.extend(
            name_material
                .as_ref()
                .map(|m| Candidate::from_material(FactSource::MaterialsByName, m)),
        );

        let price = candidates
            .iter()
            .find_map(|c| c.unit_price.map(|price| (c.source, price)));
        let origin_country = candidates
            .iter()
            .find_map(|c| c.origin_country.as_ref().map(|code| (c.source, code.clone())));
        let is_domestic = candidates
            .iter()
            .find_map(|c| c.is_domestic.map(|flag| (c.source, flag)));

        let (resolved_line_total, price_source) = match (item.line_total, price, item.quantity) {
            (Some(total), _, _) => (Some(total), Some(FactSource::LineItem)),
            (None, Some((source, unit)), Some(qty)) => (Some(unit * qty), Some(source)),
            _ => (None, None),
        };

        let matched_sku = mapped_part
            .as_ref()
            .or(fuzzy_part.as_ref())
            .map(|p| p.sku.clone())
            .or_else(|| mapped_material.as_ref().and(mapped_sku.clone()));

        let category = mapped_part
            .as_ref()
            .or(fuzzy_part.as_ref())
            .and_then(|p| p.category.as_deref());
        let bucket = match (&item.item_type, category) {
            (None, Some(category)) => self
                .classifier
                .classify_text(&format!("{} {}", item.name, category).to_lowercase()),
            _ => self.classifier.classify(item),
        };

        let component = ResolvedComponent {
            item: item.clone(),
            matched_sku,
            resolved_unit_price: price.map(|(_, unit)| unit),
            resolved_line_total,
            resolved_origin_country: origin_country.as_ref().map(|(_, code)| code.clone()),
            resolved_is_domestic: TriState::from(is_domestic.map(|(_, flag)| flag)),
            bucket,
            price_source,
            origin_source: origin_country.map(|(source, _)| source),
            domestic_source: is_domestic.map(|(source, _)| source),
        };

        Resolution { component, stats }
    }

    /// Resolve a batch with bounded parallelism. Output order matches input
    /// order. A cancelled or timed-out batch yields an error, never a partial
    /// list.
    #[instrument(skip(self, items, options), fields(items = items.len(), concurrency = self.concurrency))]
    pub async fn resolve_batch(
        &self,
        items: &[RawLineItem],
        options: &BatchOptions,
    ) -> Result<Vec<ResolvedComponent>> {
        if options
            .cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
        {
            return Err(EngineError::Cancelled);
        }

        let started = Instant::now();
        let work = stream::iter(items)
            .map(|item| self.resolve_tracked(item))
            .buffered(self.concurrency)
            .collect::<Vec<_>>();

        let cancelled = async {
            match &options.cancellation {
                Some(cancellation) => cancellation.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let deadline = async {
            match options.deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => pending::<()>().await,
            }
        };

        let resolutions = tokio::select! {
            resolutions = work => resolutions,
            _ = cancelled => {
                warn!("batch resolution cancelled; discarding partial results");
                return Err(EngineError::Cancelled);
            }
            _ = deadline => {
                let limit = options.deadline.unwrap_or_default();
                warn!(deadline_ms = limit.as_millis() as u64, "batch resolution deadline exceeded");
                return Err(EngineError::DeadlineExceeded(limit.as_millis()));
            }
        };

        let stats = resolutions
            .iter()
            .fold(LookupStats::default(), |acc, r| acc.merge(r.stats));
        if stats.attempted > 0 && stats.failed == stats.attempted {
            return Err(EngineError::SourcesUnavailable {
                attempted: stats.attempted,
            });
        }

        let components: Vec<ResolvedComponent> =
            resolutions.into_iter().map(|r| r.component).collect();
        let matched = components.iter().filter(|c| c.matched_sku.is_some()).count();
        info!(
            matched,
            lookups = stats.attempted,
            failed_lookups = stats.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch resolved"
        );

        Ok(components)
    }
}
