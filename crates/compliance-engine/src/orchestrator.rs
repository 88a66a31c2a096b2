//! One call per project: resolve, aggregate, evaluate both regimes
//!
//! Aggregation only ever sees a complete batch. If resolution is cancelled,
//! times out, or finds every reference source down, no report is produced.

use shared_types::{ComplianceConfiguration, ComplianceReport, ResolvedComponent};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::aggregation::{aggregate, OriginPolicy};
use crate::cache::{CachedAliasTable, CachedCatalog};
use crate::classifier::BucketClassifier;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::request::EvaluationRequest;
use crate::resolver::{BatchOptions, RecordResolver};
use crate::rules::{evaluate_domestic_content, evaluate_feoc};
use crate::sources::{AliasTable, MaterialsReference, PartsCatalog};

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    config: EngineConfig,
    resolver: RecordResolver,
    policy: OriginPolicy,
}

impl ComplianceEngine {
    /// Engine with an explicitly built resolver. Caching, if any, is the
    /// caller's business. The configuration is validated first.
    pub fn new(config: EngineConfig, resolver: RecordResolver) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, resolver))
    }

    /// Engine with no reference sources yet; add them with `with_*`.
    pub fn from_config(config: EngineConfig, classifier: BucketClassifier) -> Result<Self> {
        let resolver =
            RecordResolver::new(Arc::new(classifier)).with_concurrency(config.resolver.concurrency);
        Self::new(config, resolver)
    }

    fn assemble(config: EngineConfig, resolver: RecordResolver) -> Self {
        let policy = OriginPolicy::from_config(&config);
        Self {
            config,
            resolver,
            policy,
        }
    }

    /// Attach an alias table behind a TTL cache
    pub fn with_aliases<A: AliasTable + 'static>(mut self, aliases: A) -> Self {
        let cached = CachedAliasTable::new(aliases, self.config.resolver.cache_ttl());
        self.resolver = self.resolver.with_aliases(Arc::new(cached));
        self
    }

    /// Attach a parts catalog behind a TTL cache
    pub fn with_catalog<C: PartsCatalog + 'static>(mut self, catalog: C) -> Self {
        let cached = CachedCatalog::new(catalog, self.config.resolver.cache_ttl());
        self.resolver = self.resolver.with_catalog(Arc::new(cached));
        self
    }

    pub fn with_materials<M: MaterialsReference + 'static>(mut self, materials: M) -> Self {
        self.resolver = self.resolver.with_materials(Arc::new(materials));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &RecordResolver {
        &self.resolver
    }

    /// Resolve every item, then evaluate. Errors only on infrastructure
    /// failure; missing facts surface as nulls in the report.
    #[instrument(
        skip_all,
        fields(items = request.items.len(), year = request.project.installation_year)
    )]
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
        options: &BatchOptions,
    ) -> Result<ComplianceReport> {
        let components = self.resolver.resolve_batch(&request.items, options).await?;
        let report = self.evaluate_resolved(&components, &request.project);

        info!(
            items = components.len(),
            unpriced = report.totals.unpriced_items,
            feoc_compliant = report.compliance.feoc_compliant,
            bonus_qualified = %report.compliance.domestic_content_bonus_qualified,
            "project evaluated"
        );

        if request.include_components {
            Ok(report.with_components(components))
        } else {
            Ok(report)
        }
    }

    /// Parse and evaluate a raw JSON request
    pub async fn evaluate_json(
        &self,
        value: serde_json::Value,
        options: &BatchOptions,
    ) -> Result<ComplianceReport> {
        let request = EvaluationRequest::from_json_value(value)?;
        self.evaluate(&request, options).await
    }

    /// Pure half of the pipeline: aggregate and run both regimes
    pub fn evaluate_resolved(
        &self,
        components: &[ResolvedComponent],
        project: &ComplianceConfiguration,
    ) -> ComplianceReport {
        let totals = aggregate(components, &self.policy);
        let feoc = evaluate_feoc(&totals, components, project, &self.config.feoc, &self.policy);
        let domestic = evaluate_domestic_content(
            &totals,
            project,
            &self.config.domestic_content,
            &self.config.eligibility,
        );
        ComplianceReport::assemble(&totals, &feoc, &domestic)
    }
}

impl Default for ComplianceEngine {
    /// Built-in configuration, which always passes validation
    fn default() -> Self {
        let config = EngineConfig::default();
        let resolver = RecordResolver::new(Arc::new(BucketClassifier::default()))
            .with_concurrency(config.resolver.concurrency);
        Self::assemble(config, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::resolver::cancellation;
    use crate::sources::{InMemoryCatalog, PartRecord};
    use serde_json::json;
    use shared_types::{Bucket, TriState};

    #[tokio::test]
    async fn test_engine_reports_both_regimes() {
        let engine = ComplianceEngine::default();
        let report = engine
            .evaluate_json(
                json!({
                    "items": [
                        { "name": "Rail", "type": "racking", "is_domestic": true, "line_total": 1000 },
                        { "name": "Module", "type": "panel", "origin_country": "CN", "line_total": 9000 }
                    ],
                    "installationYear": 2026
                }),
                &BatchOptions::default(),
            )
            .await
            .unwrap();

        assert!(!report.compliance.feoc_compliant);
        assert_eq!(report.compliance.steel_iron_compliant, TriState::Yes);
        assert_eq!(report.compliance.manufactured_compliant, TriState::No);
        assert!(report.components.is_none());
    }

    #[tokio::test]
    async fn test_catalog_fills_missing_facts() {
        let catalog = InMemoryCatalog::new(vec![PartRecord {
            sku: "IQ8-PLUS".into(),
            name: "IQ8PLUS Microinverter".into(),
            manufacturer: Some("Enphase".into()),
            category: Some("inverter".into()),
            unit_price: Some(150.0),
            origin_country: Some("US".into()),
            is_domestic: Some(true),
        }]);
        let engine = ComplianceEngine::default().with_catalog(catalog);
        let mut item = shared_types::RawLineItem::new("IQ8PLUS Microinverter");
        item.quantity = Some(10.0);
        let request = EvaluationRequest::new(vec![item], ComplianceConfiguration::for_year(2026))
            .with_components();

        let report = engine.evaluate(&request, &BatchOptions::default()).await.unwrap();
        assert_eq!(report.totals.manufactured_total, 1500.0);
        assert_eq!(report.percentages.manufactured_domestic_percent, Some(100.0));

        let components = report.components.unwrap();
        assert_eq!(components[0].matched_sku.as_deref(), Some("IQ8-PLUS"));
        assert_eq!(components[0].bucket, Bucket::Manufactured);
    }

    #[tokio::test]
    async fn test_cancelled_batch_yields_no_report() {
        let engine = ComplianceEngine::default();
        let (handle, token) = cancellation();
        handle.cancel();
        let request = EvaluationRequest::new(
            vec![shared_types::RawLineItem::new("Rail")],
            ComplianceConfiguration::for_year(2026),
        );
        let err = engine
            .evaluate(&request, &BatchOptions::default().with_cancellation(token))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_retryable() {
        let engine = ComplianceEngine::default();
        let err = engine
            .evaluate_json(json!({ "items": "none", "installationYear": 2026 }), &BatchOptions::default())
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_constructor_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.domestic_content.schedule.clear();
        let err = ComplianceEngine::from_config(config, BucketClassifier::default())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let mut config = EngineConfig::default();
        config.resolver.concurrency = 0;
        assert!(ComplianceEngine::new(config, RecordResolver::default()).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let engine = ComplianceEngine::default();
        assert!(engine.config().validate().is_ok());
        assert!(ComplianceEngine::from_config(EngineConfig::default(), BucketClassifier::default()).is_ok());
    }

    #[tokio::test]
    async fn test_flag_on_line_item_and_country_in_catalog_detects_concern() {
        let catalog = InMemoryCatalog::new(vec![PartRecord {
            sku: "MOD-400".into(),
            name: "Module 400W".into(),
            manufacturer: None,
            category: None,
            unit_price: Some(100.0),
            origin_country: Some("CN".into()),
            is_domestic: None,
        }]);
        let engine = ComplianceEngine::default().with_catalog(catalog);
        let report = engine
            .evaluate_json(
                json!({
                    "items": [
                        { "name": "Module 400W", "type": "panel", "is_domestic": false, "quantity": 10 }
                    ],
                    "installationYear": 2026
                }),
                &BatchOptions::default(),
            )
            .await
            .unwrap();

        assert!(report.compliance.feoc_detected);
        assert!(!report.compliance.feoc_compliant);
        assert_eq!(report.compliance.feoc_countries, vec!["CN".to_string()]);
        assert_eq!(report.totals.manufactured_feoc_total, 1000.0);
    }
}
