//! Advisory text for the domestic-content regime
//!
//! Recommendations never feed back into a compliance boolean.

use shared_types::{BucketAssessment, EligibilityResult, TriState};

use crate::config::EligibilityConfig;

/// Which condition an advisory is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    InsufficientSteelData,
    SteelNoncompliant,
    ManufacturedNoncompliant,
    ManufacturedInsufficientData,
    Ineligible,
    EligibilityUnverified,
    FullyQualified,
}

impl Recommendation {
    pub fn code(&self) -> &'static str {
        match self {
            Recommendation::InsufficientSteelData => "insufficient-steel-data",
            Recommendation::SteelNoncompliant => "steel-noncompliant",
            Recommendation::ManufacturedNoncompliant => "manufactured-noncompliant",
            Recommendation::ManufacturedInsufficientData => "manufactured-insufficient-data",
            Recommendation::Ineligible => "ineligible",
            Recommendation::EligibilityUnverified => "eligibility-unverified",
            Recommendation::FullyQualified => "fully-qualified",
        }
    }
}

/// Ordered advisories: steel, manufactured, eligibility, then the summary
pub fn recommendations_for(
    steel: &BucketAssessment,
    manufactured: &BucketAssessment,
    eligibility: &EligibilityResult,
    qualified: TriState,
    thresholds: &EligibilityConfig,
) -> Vec<(Recommendation, String)> {
    let mut out = Vec::new();

    match steel.compliant {
        TriState::Unknown => out.push((
            Recommendation::InsufficientSteelData,
            "Origin is unknown for part of the structural steel/iron cost. Obtain mill \
             certifications or supplier origin letters for every steel/iron component."
                .to_string(),
        )),
        TriState::No => out.push((
            Recommendation::SteelNoncompliant,
            format!(
                "Structural steel/iron is {:.1}% domestic; {:.0}% is required. Source racking, \
                 rails and fasteners from domestic mills.",
                steel.domestic_percent.unwrap_or(0.0),
                steel.required_percent
            ),
        )),
        TriState::Yes => {}
    }

    match manufactured.compliant {
        TriState::No => out.push((
            Recommendation::ManufacturedNoncompliant,
            format!(
                "Manufactured products are {:.1}% domestic, below the {:.0}% required for this \
                 installation year. Consider domestically manufactured modules, inverters or \
                 batteries.",
                manufactured.domestic_percent.unwrap_or(0.0),
                manufactured.required_percent
            ),
        )),
        TriState::Unknown => out.push((
            Recommendation::ManufacturedInsufficientData,
            "Origin is unknown for part of the manufactured-products cost. Collect \
             country-of-origin documentation before claiming the bonus."
                .to_string(),
        )),
        TriState::Yes => {}
    }

    match eligibility.eligible {
        TriState::No => out.push((
            Recommendation::Ineligible,
            format!(
                "Project is not eligible: it is {} MW or larger, began construction on or \
                 after {}, and does not meet prevailing wage and apprenticeship requirements.",
                thresholds.small_project_max_mw, thresholds.construction_cutoff
            ),
        )),
        TriState::Unknown => out.push((
            Recommendation::EligibilityUnverified,
            "Eligibility is unverified. Provide net output, construction start date or \
             prevailing wage status."
                .to_string(),
        )),
        TriState::Yes => {}
    }

    if qualified == TriState::Yes {
        out.push((
            Recommendation::FullyQualified,
            "Project meets the domestic content requirements and eligibility criteria for \
             the bonus."
                .to_string(),
        ));
    }

    out
}
