//! Domestic-content bonus eligibility paths
//!
//! A project is eligible through any one of three paths. An explicit `true`
//! on any path decides eligibility; `false` needs all three explicitly false.

use shared_types::{ComplianceConfiguration, EligibilityReasons, EligibilityResult, TriState};

use crate::config::EligibilityConfig;

pub fn evaluate_eligibility(
    project: &ComplianceConfiguration,
    config: &EligibilityConfig,
) -> EligibilityResult {
    let reasons = EligibilityReasons {
        small_project: project
            .max_net_output_mw
            .map(|mw| mw < config.small_project_max_mw)
            .into(),
        early_construction: project
            .construction_start_date
            .map(|date| date < config.construction_cutoff)
            .into(),
        prevailing_wage: project.prevailing_wage_compliant.into(),
    };

    EligibilityResult {
        eligible: TriState::any([
            reasons.small_project,
            reasons.early_construction,
            reasons.prevailing_wage,
        ]),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project(
        mw: Option<f64>,
        start: Option<(i32, u32, u32)>,
        wage: Option<bool>,
    ) -> ComplianceConfiguration {
        ComplianceConfiguration {
            installation_year: 2026,
            max_net_output_mw: mw,
            construction_start_date: start.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            prevailing_wage_compliant: wage,
        }
    }

    fn eligible(p: &ComplianceConfiguration) -> TriState {
        evaluate_eligibility(p, &EligibilityConfig::default()).eligible
    }

    #[test]
    fn test_small_project_alone_is_enough() {
        let p = project(Some(0.5), Some((2024, 1, 1)), Some(false));
        assert_eq!(eligible(&p), TriState::Yes);
    }

    #[test]
    fn test_exactly_one_megawatt_is_not_small() {
        let result = evaluate_eligibility(
            &project(Some(1.0), None, None),
            &EligibilityConfig::default(),
        );
        assert_eq!(result.reasons.small_project, TriState::No);
        assert_eq!(result.eligible, TriState::Unknown);
    }

    #[test]
    fn test_construction_before_cutoff() {
        let p = project(Some(5.0), Some((2023, 1, 28)), Some(false));
        assert_eq!(eligible(&p), TriState::Yes);

        let on_cutoff = project(Some(5.0), Some((2023, 1, 29)), Some(false));
        assert_eq!(eligible(&on_cutoff), TriState::No);
    }

    #[test]
    fn test_prevailing_wage_path() {
        assert_eq!(eligible(&project(None, None, Some(true))), TriState::Yes);
    }

    #[test]
    fn test_all_unknown_is_unknown() {
        assert_eq!(eligible(&project(None, None, None)), TriState::Unknown);
    }

    #[test]
    fn test_one_unresolved_path_keeps_unknown() {
        assert_eq!(
            eligible(&project(Some(5.0), Some((2024, 1, 1)), None)),
            TriState::Unknown
        );
    }
}
