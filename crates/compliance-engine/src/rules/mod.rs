//! Compliance regimes evaluated over aggregated bucket totals
//!
//! Both regimes are pure functions of totals and configuration and can be
//! called independently:
//! - `feoc`: prohibited-origin content limit
//! - `domestic_content`: escalating domestic-content bonus with eligibility

pub mod domestic_content;
pub mod eligibility;
pub mod feoc;
pub mod recommendations;

pub use domestic_content::evaluate_domestic_content;
pub use eligibility::evaluate_eligibility;
pub use feoc::evaluate_feoc;
