//! Boundary parsing of the results endpoints.
//!
//! Every payload is checked field by field before it becomes a typed DTO, so
//! the aggregator never sees a missing or non-numeric weight or score.

use super::aggregator::ResultsError;
use super::dto::{DomainScore, DomainWeight, DomainWeightedScore, WeightedResult};
use crate::shared::validation::{
    as_array, as_object, optional_string, require_count, require_finite, require_id,
    ValidationError,
};
use serde_json::Value;

pub fn parse_domain_weights(payload: &Value) -> Result<Vec<DomainWeight>, ResultsError> {
    let items = as_array(payload, "domain weights")?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| -> Result<DomainWeight, ResultsError> {
            let context = format!("domain weight #{}", index);
            let obj = as_object(item, &context)?;
            Ok(DomainWeight {
                domain_id: require_id(obj, "domain_id", &context)?,
                domain_ar: optional_string(obj, "domain_ar"),
                domain_en: optional_string(obj, "domain_en"),
                indicator_count: require_count(obj, "indicator_count", &context)?,
                domain_weight: require_finite(obj, "domain_weight", &context)?,
            })
        })
        .collect()
}

pub fn parse_domain_scores(payload: &Value) -> Result<Vec<DomainScore>, ResultsError> {
    let items = as_array(payload, "domain scores")?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| -> Result<DomainScore, ResultsError> {
            let context = format!("domain score #{}", index);
            let obj = as_object(item, &context)?;
            Ok(DomainScore {
                domain_id: require_id(obj, "domain_id", &context)?,
                domain_ar: optional_string(obj, "domain_ar"),
                domain_en: optional_string(obj, "domain_en"),
                indicator_count: require_count(obj, "indicator_count", &context)?,
                domain_score: require_finite(obj, "domain_score", &context)?,
            })
        })
        .collect()
}

pub fn parse_weighted_result(payload: &Value) -> Result<WeightedResult, ResultsError> {
    let context = "weighted result";
    let obj = as_object(payload, context)?;
    let program_id = require_id(obj, "program_id", context)?;
    let rows = obj
        .get("result_by_domain")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValidationError::MissingField {
            context: context.to_string(),
            field: "result_by_domain",
        })?;
    let final_program_score = require_finite(obj, "final_program_score", context)?;

    let result_by_domain = as_array(rows, "result_by_domain")?
        .iter()
        .enumerate()
        .map(|(index, item)| -> Result<DomainWeightedScore, ResultsError> {
            let context = format!("result_by_domain #{}", index);
            let row = as_object(item, &context)?;
            Ok(DomainWeightedScore {
                domain_id: require_id(row, "domain_id", &context)?,
                domain_weight: require_finite(row, "domain_weight", &context)?,
                domain_score: require_finite(row, "domain_score", &context)?,
                domain_weighted_score: require_finite(row, "domain_weighted_score", &context)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeightedResult {
        program_id,
        result_by_domain,
        final_program_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_weights_accepts_decimal_strings() {
        let payload = json!([
            { "domain_id": 1, "domain_ar": "التعليم", "domain_en": "Teaching", "indicator_count": 15, "domain_weight": "25.42" },
            { "domain_id": "2", "domain_en": "Research", "indicator_count": 44, "domain_weight": 74.58 }
        ]);
        let weights = parse_domain_weights(&payload).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].domain_weight, 25.42);
        assert_eq!(weights[1].domain_id, 2);
        assert_eq!(weights[1].domain_ar, "");
    }

    #[test]
    fn test_parse_weights_rejects_missing_weight() {
        let payload = json!([{ "domain_id": 1, "indicator_count": 3 }]);
        let err = parse_domain_weights(&payload).unwrap_err();
        assert!(err.to_string().contains("domain_weight"), "{}", err);
    }

    #[test]
    fn test_parse_scores_rejects_non_numeric_score() {
        let payload = json!([{ "domain_id": 1, "indicator_count": 3, "domain_score": "n/a" }]);
        let err = parse_domain_scores(&payload).unwrap_err();
        assert!(matches!(
            err,
            ResultsError::Validation(ValidationError::NotFinite { field: "domain_score", .. })
        ));
    }

    #[test]
    fn test_parse_scores_rejects_non_array() {
        let err = parse_domain_scores(&json!({ "data": [] })).unwrap_err();
        assert!(matches!(
            err,
            ResultsError::Validation(ValidationError::WrongShape { expected: "array", .. })
        ));
    }

    #[test]
    fn test_parse_weighted_result_requires_shape() {
        let missing_rows = json!({ "program_id": 4, "final_program_score": 80.0 });
        assert!(parse_weighted_result(&missing_rows).is_err());

        let missing_program = json!({ "result_by_domain": [], "final_program_score": 80.0 });
        assert!(parse_weighted_result(&missing_program).is_err());

        let missing_final = json!({ "program_id": 4, "result_by_domain": [] });
        assert!(parse_weighted_result(&missing_final).is_err());
    }

    #[test]
    fn test_parse_weighted_result() {
        let payload = json!({
            "program_id": 4,
            "result_by_domain": [
                { "domain_id": 1, "domain_weight": 25.42, "domain_score": 85.33, "domain_weighted_score": 21.69 }
            ],
            "final_program_score": 21.69
        });
        let result = parse_weighted_result(&payload).unwrap();
        assert_eq!(result.program_id, 4);
        assert_eq!(result.result_by_domain[0].domain_weighted_score, 21.69);
    }
}
