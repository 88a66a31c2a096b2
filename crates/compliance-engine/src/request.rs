//! Evaluation request parsing
//!
//! The request is one JSON object: the item list plus the project facts at
//! the top level. Shape errors are `InvalidRequest`; missing facts on an
//! individual item are not errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ComplianceConfiguration, RawLineItem};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub items: Vec<RawLineItem>,
    #[serde(flatten)]
    pub project: ComplianceConfiguration,
    /// Attach the resolved components to the report
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_components: bool,
}

impl EvaluationRequest {
    pub fn new(items: Vec<RawLineItem>, project: ComplianceConfiguration) -> Self {
        Self {
            items,
            project,
            include_components: false,
        }
    }

    pub fn with_components(mut self) -> Self {
        self.include_components = true;
        self
    }

    /// Parse a request document, rejecting anything that is not an object
    /// with an `items` list.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| EngineError::InvalidRequest("request must be a JSON object".into()))?;

        match object.get("items") {
            Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(EngineError::InvalidRequest(format!(
                    "`items` must be a list, got {}",
                    json_kind(other)
                )))
            }
            None => return Err(EngineError::InvalidRequest("missing `items`".into())),
        }

        serde_json::from_value(value).map_err(|e| EngineError::InvalidRequest(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
        Self::from_json_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parses_items_and_project_facts() {
        let request = EvaluationRequest::from_json_value(json!({
            "items": [
                { "name": "Rail", "type": "racking", "is_domestic": true, "line_total": 1000 },
                { "name": "Module", "type": "panel", "origin_country": "CN", "line_total": 9000 }
            ],
            "installationYear": 2026,
            "maxNetOutputMW": 0.5,
            "constructionStartDate": "2022-11-01",
            "prevailingWageCompliant": null
        }))
        .unwrap();

        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].is_domestic, Some(true));
        assert_eq!(request.items[1].origin_country.as_deref(), Some("CN"));
        assert_eq!(request.project.installation_year, 2026);
        assert_eq!(request.project.max_net_output_mw, Some(0.5));
        assert_eq!(
            request.project.construction_start_date,
            chrono::NaiveDate::from_ymd_opt(2022, 11, 1)
        );
        assert_eq!(request.project.prevailing_wage_compliant, None);
        assert!(!request.include_components);
    }

    #[test]
    fn test_items_must_be_a_list() {
        let err = EvaluationRequest::from_json_value(json!({
            "items": { "name": "Rail" },
            "installationYear": 2026
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(ref m) if m.contains("an object")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_items_is_rejected() {
        let err = EvaluationRequest::from_json_value(json!({ "installationYear": 2026 })).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[test]
    fn test_missing_installation_year_is_rejected() {
        let err = EvaluationRequest::from_json_value(json!({ "items": [] })).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(ref m) if m.contains("installationYear")));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let err = EvaluationRequest::from_json_value(json!({
            "items": [],
            "installationYear": 2026,
            "constructionStartDate": "01/29/2023"
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[test]
    fn test_non_object_request_is_rejected() {
        assert!(EvaluationRequest::from_json_str("[1, 2, 3]").is_err());
        assert!(EvaluationRequest::from_json_str("{ not json").is_err());
    }
}
