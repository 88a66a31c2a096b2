//! Compliance aggregation and evaluation for solar project bills of materials
//!
//! Pipeline, leaves first:
//! - [`resolver`]: raw line item -> price/origin facts via a fallback chain
//! - [`classifier`]: resolved item -> regulatory cost bucket
//! - [`aggregation`]: per-bucket totals with unknown origin tracked apart
//! - [`rules`]: the prohibited-origin and domestic-content regimes
//! - [`orchestrator`]: one call per project, transport-independent

pub mod aggregation;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod country;
pub mod error;
pub mod orchestrator;
pub mod patterns;
pub mod request;
pub mod resolver;
pub mod rules;
pub mod sources;

pub use aggregation::{aggregate, OriginPolicy};
pub use cache::{CachedAliasTable, CachedCatalog, TtlCache};
pub use classifier::{BucketClassifier, ClassificationRule};
pub use config::EngineConfig;
pub use error::{EngineError, LookupError, Result};
pub use orchestrator::ComplianceEngine;
pub use request::EvaluationRequest;
pub use resolver::{cancellation, BatchOptions, CancelHandle, Cancellation, RecordResolver};
pub use rules::{evaluate_domestic_content, evaluate_eligibility, evaluate_feoc};
pub use sources::{
    AliasMap, AliasTable, InMemoryCatalog, MaterialFacts, MaterialsReference, MaterialsTable,
    PartRecord, PartsCatalog,
};
