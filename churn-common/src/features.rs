//! Feature schema shared by the prediction service, the client and the gate
//!
//! The model was trained on exactly four columns, in the order given by
//! [`FEATURE_NAMES`]. Every path into the model goes through
//! [`FeatureVector`], so a value that reaches `predict` has already been
//! checked for presence, type and range.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Feature columns in the order the model expects them
pub const FEATURE_NAMES: [&str; 4] = [
    "international_plan",
    "total_day_charge",
    "total_eve_charge",
    "customer_service_calls",
];

/// One customer's features, validated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 1 if the customer has an international plan, else 0
    pub international_plan: u8,
    /// Total charge for daytime calls
    pub total_day_charge: f64,
    /// Total charge for evening calls
    pub total_eve_charge: f64,
    /// Number of calls made to customer service
    pub customer_service_calls: u32,
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Input validation failure, listing every offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid features: ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects field errors while the fields are checked one by one
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn plan(&mut self, value: i64) -> u8 {
        match value {
            0 | 1 => value as u8,
            _ => {
                self.push(FEATURE_NAMES[0], format!("must be 0 or 1 (got {})", value));
                0
            }
        }
    }

    fn charge(&mut self, field: &str, value: f64) -> f64 {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < 0.0 {
            self.push(field, format!("must be non-negative (got {})", value));
        }
        value
    }

    fn count(&mut self, field: &str, value: i64) -> u32 {
        if value < 0 {
            self.push(field, format!("must be non-negative (got {})", value));
            return 0;
        }
        match u32::try_from(value) {
            Ok(count) => count,
            Err(_) => {
                self.push(field, format!("is out of range (got {})", value));
                0
            }
        }
    }

    fn finish(self, features: FeatureVector) -> Result<FeatureVector, ValidationError> {
        if self.errors.is_empty() {
            Ok(features)
        } else {
            Err(ValidationError {
                fields: self.errors,
            })
        }
    }
}

impl FeatureVector {
    /// Build a feature vector from raw values, checking every range constraint
    pub fn new(
        international_plan: i64,
        total_day_charge: f64,
        total_eve_charge: f64,
        customer_service_calls: i64,
    ) -> Result<Self, ValidationError> {
        let mut c = Collector::default();
        let features = FeatureVector {
            international_plan: c.plan(international_plan),
            total_day_charge: c.charge(FEATURE_NAMES[1], total_day_charge),
            total_eve_charge: c.charge(FEATURE_NAMES[2], total_eve_charge),
            customer_service_calls: c.count(FEATURE_NAMES[3], customer_service_calls),
        };
        c.finish(features)
    }

    /// Parse and validate a JSON request body
    ///
    /// Reports every missing, mistyped or out-of-range field at once.
    /// Integer fields must be JSON integers; `1.0` is not accepted for them.
    /// Unknown keys are ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let Some(object) = body.as_object() else {
            return Err(ValidationError::single("body", "expected a JSON object"));
        };

        let mut c = Collector::default();

        let integer = |c: &mut Collector, field: &str| -> Option<i64> {
            match object.get(field) {
                None | Some(Value::Null) => {
                    c.push(field, "field required");
                    None
                }
                Some(value) => match value.as_i64() {
                    Some(v) => Some(v),
                    None if value.is_u64() => {
                        c.push(field, "is out of range");
                        None
                    }
                    None => {
                        c.push(field, "must be an integer");
                        None
                    }
                },
            }
        };
        let plan = integer(&mut c, FEATURE_NAMES[0]);
        let calls = integer(&mut c, FEATURE_NAMES[3]);

        let number = |c: &mut Collector, field: &str| -> Option<f64> {
            match object.get(field) {
                None | Some(Value::Null) => {
                    c.push(field, "field required");
                    None
                }
                Some(value) => match value.as_f64() {
                    Some(v) => Some(v),
                    None => {
                        c.push(field, "must be a number");
                        None
                    }
                },
            }
        };
        let day = number(&mut c, FEATURE_NAMES[1]);
        let eve = number(&mut c, FEATURE_NAMES[2]);

        let features = FeatureVector {
            international_plan: plan.map(|v| c.plan(v)).unwrap_or_default(),
            total_day_charge: day.map(|v| c.charge(FEATURE_NAMES[1], v)).unwrap_or_default(),
            total_eve_charge: eve.map(|v| c.charge(FEATURE_NAMES[2], v)).unwrap_or_default(),
            customer_service_calls: calls
                .map(|v| c.count(FEATURE_NAMES[3], v))
                .unwrap_or_default(),
        };

        // Report fields in schema order regardless of which check found them
        c.errors.sort_by_key(|e| {
            FEATURE_NAMES
                .iter()
                .position(|name| *name == e.field)
                .unwrap_or(usize::MAX)
        });
        c.finish(features)
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_row(&self) -> [f64; 4] {
        [
            f64::from(self.international_plan),
            self.total_day_charge,
            self.total_eve_charge,
            f64::from(self.customer_service_calls),
        ]
    }
}
