//! JSON bodies of the prediction API.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::label::Label;

/// Body of a prediction request.
///
/// `text` is optional at the wire level so a missing field can be reported as
/// invalid input instead of a deserialization failure. Only JSON objects
/// deserialize; the sequence form serde derives for structs is refused.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassificationRequest {
    pub text: Option<String>,
}

impl ClassificationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl<'de> Deserialize<'de> for ClassificationRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let text = match fields.remove("text") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "invalid type for `text`: {other}, expected a string"
                )));
            }
        };
        Ok(Self { text })
    }
}

/// Per-label probabilities on the percentage scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    #[serde(rename = "false")]
    pub false_: f64,
    #[serde(rename = "true")]
    pub true_: f64,
    pub misleading: f64,
}

impl ProbabilityTable {
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::False => self.false_,
            Label::True => self.true_,
            Label::Misleading => self.misleading,
        }
    }

    pub fn set(&mut self, label: Label, value: f64) {
        match label {
            Label::False => self.false_ = value,
            Label::True => self.true_ = value,
            Label::Misleading => self.misleading = value,
        }
    }

    pub fn total(&self) -> f64 {
        self.false_ + self.true_ + self.misleading
    }
}

/// Successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub text: String,
    pub predicted_label: Label,
    pub probabilities: ProbabilityTable,
}

/// Failure body returned with 4xx/5xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Full error chain, only filled in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }
}
