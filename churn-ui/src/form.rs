//! Prediction form submitted by the browser
//!
//! All fields arrive together on an explicit submit. Every field is read as
//! text so a blank or malformed entry becomes a message on the page rather
//! than an extractor rejection.

use churn_common::{FeatureVector, FieldError, ValidationError, FEATURE_NAMES};
use serde::Deserialize;

/// Raw form body (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    /// "Sim"/"Não" from the select (also accepts "1"/"0")
    pub international_plan: String,
    pub total_day_charge: String,
    pub total_eve_charge: String,
    pub customer_service_calls: String,
    /// Optional label shown in the history table
    pub display_name: String,
}

/// A complete, validated submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub features: FeatureVector,
    pub display_name: Option<String>,
}

impl PredictionForm {
    /// Parse every field, then apply the shared feature range checks
    pub fn parse(&self) -> Result<Submission, ValidationError> {
        let mut errors = Vec::new();

        let plan = match self.international_plan.trim() {
            "Sim" | "1" => Some(1),
            "Não" | "0" => Some(0),
            "" => {
                errors.push(FieldError::new(FEATURE_NAMES[0], "field required"));
                None
            }
            other => {
                errors.push(FieldError::new(
                    FEATURE_NAMES[0],
                    format!("must be Sim or Não (got {})", other),
                ));
                None
            }
        };
        let day = parse_number(FEATURE_NAMES[1], &self.total_day_charge, &mut errors);
        let eve = parse_number(FEATURE_NAMES[2], &self.total_eve_charge, &mut errors);
        let calls = parse_integer(FEATURE_NAMES[3], &self.customer_service_calls, &mut errors);

        let (Some(plan), Some(day), Some(eve), Some(calls)) = (plan, day, eve, calls) else {
            return Err(ValidationError { fields: errors });
        };

        let features = FeatureVector::new(plan, day, eve, calls)?;
        let name = self.display_name.trim();
        Ok(Submission {
            features,
            display_name: (!name.is_empty()).then(|| name.to_string()),
        })
    }
}

fn parse_number(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(FieldError::new(field, "field required"));
        return None;
    }
    // Accept a decimal comma as typed in pt-BR locales
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, format!("must be a number (got {})", raw)));
            None
        }
    }
}

fn parse_integer(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(FieldError::new(field, "field required"));
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, format!("must be a whole number (got {})", raw)));
            None
        }
    }
}
