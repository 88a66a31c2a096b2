pub mod report;
pub mod tristate;
pub mod types;

pub use report::{
    BucketAssessment, ComplianceReport, ComplianceSection, DomesticContentAssessment,
    EligibilityReasons, EligibilityResult, FeocAssessment, FeocLineItem, PercentagesReport,
    TotalsReport,
};
pub use tristate::TriState;
pub use types::{
    percent_of, AggregatedTotals, Bucket, BucketTotals, ComplianceConfiguration, FactSource,
    OriginClass, RawLineItem, ResolvedComponent,
};
