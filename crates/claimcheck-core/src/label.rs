//! Claim labels and the index → label mapping shipped with a fine-tuned model.
//!
//! The classifier emits one logit per class in a fixed order. That order is a
//! property of the trained artifact, so it is read from the model directory's
//! `config.json` (`id2label`) rather than assumed.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Verdict assigned to a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    False,
    True,
    Misleading,
}

impl Label {
    /// All labels, in the historical training order.
    pub const ALL: [Label; 3] = [Label::False, Label::True, Label::Misleading];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::False => "false",
            Self::True => "true",
            Self::Misleading => "misleading",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "false" => Ok(Self::False),
            "true" => Ok(Self::True),
            "misleading" => Ok(Self::Misleading),
            _ => Err(LabelError::UnknownLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("unknown label: {0:?}")]
    UnknownLabel(String),

    #[error("expected {expected} labels, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("label {0} appears more than once")]
    Duplicate(Label),

    #[error("id2label index {0:?} is not a valid class index")]
    BadIndex(String),

    #[error("reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing model config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Class index → label, as agreed with the trained model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    labels: Vec<Label>,
}

impl Default for LabelMapping {
    /// `0 = false, 1 = true, 2 = misleading`.
    fn default() -> Self {
        Self {
            labels: Label::ALL.to_vec(),
        }
    }
}

/// Subset of a Hugging Face `config.json` we care about.
#[derive(Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: Option<HashMap<String, String>>,
}

impl LabelMapping {
    /// Build a mapping from labels in index order. Each label must appear once.
    pub fn new(labels: Vec<Label>) -> Result<Self, LabelError> {
        if labels.len() != Label::ALL.len() {
            return Err(LabelError::WrongCount {
                expected: Label::ALL.len(),
                actual: labels.len(),
            });
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(LabelError::Duplicate(*label));
            }
        }
        Ok(Self { labels })
    }

    /// Load the mapping carried alongside the model in `<model_dir>/config.json`.
    ///
    /// Falls back to [`LabelMapping::default`] (with a warning) when the file is
    /// missing or the model was exported with generic `LABEL_n` names.
    pub fn from_model_dir(model_dir: &Path) -> Result<Self, LabelError> {
        let path = model_dir.join("config.json");
        if !path.exists() {
            warn!(path = %path.display(), "no model config found, using default label order");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| LabelError::Io {
            path: path.clone(),
            source,
        })?;
        let mapping = Self::from_config_json(&raw)?;
        info!(labels = ?mapping.labels, "loaded label mapping");
        Ok(mapping)
    }

    /// Parse the `id2label` table of a model config document.
    pub fn from_config_json(raw: &str) -> Result<Self, LabelError> {
        let config: ModelConfig = serde_json::from_str(raw)?;
        let Some(id2label) = config.id2label else {
            warn!("model config has no id2label, using default label order");
            return Ok(Self::default());
        };

        if id2label.values().all(|name| is_generic_name(name)) {
            warn!("model config only has generic label names, using default label order");
            return Ok(Self::default());
        }

        if id2label.len() != Label::ALL.len() {
            return Err(LabelError::WrongCount {
                expected: Label::ALL.len(),
                actual: id2label.len(),
            });
        }

        let mut slots: Vec<Option<Label>> = vec![None; id2label.len()];
        for (index, name) in &id2label {
            let i: usize = index
                .trim()
                .parse()
                .map_err(|_| LabelError::BadIndex(index.clone()))?;
            let slot = slots
                .get_mut(i)
                .ok_or_else(|| LabelError::BadIndex(index.clone()))?;
            *slot = Some(name.parse()?);
        }

        // An index given twice ("1" and "01") leaves a gap, which `new` rejects.
        Self::new(slots.into_iter().flatten().collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at class index `index`.
    pub fn label(&self, index: usize) -> Option<Label> {
        self.labels.get(index).copied()
    }

    /// Labels in class-index order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

fn is_generic_name(name: &str) -> bool {
    name.strip_prefix("LABEL_")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_false_true_misleading() {
        let mapping = LabelMapping::default();
        assert_eq!(mapping.label(0), Some(Label::False));
        assert_eq!(mapping.label(1), Some(Label::True));
        assert_eq!(mapping.label(2), Some(Label::Misleading));
        assert_eq!(mapping.label(3), None);
    }

    #[test]
    fn label_parse_is_case_insensitive() {
        assert_eq!("FALSE".parse::<Label>().unwrap(), Label::False);
        assert_eq!(" Misleading ".parse::<Label>().unwrap(), Label::Misleading);
        assert!("satire".parse::<Label>().is_err());
    }

    #[test]
    fn label_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Label::Misleading).unwrap(),
            "\"misleading\""
        );
    }

    #[test]
    fn new_rejects_duplicates_and_wrong_count() {
        let dup = LabelMapping::new(vec![Label::True, Label::True, Label::False]);
        assert!(matches!(dup, Err(LabelError::Duplicate(Label::True))));

        let short = LabelMapping::new(vec![Label::True, Label::False]);
        assert!(matches!(
            short,
            Err(LabelError::WrongCount {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn config_with_named_labels_sets_order() {
        let raw = r#"{
            "architectures": ["BertForSequenceClassification"],
            "id2label": {"0": "misleading", "1": "False", "2": "TRUE"}
        }"#;
        let mapping = LabelMapping::from_config_json(raw).unwrap();
        assert_eq!(
            mapping.labels(),
            &[Label::Misleading, Label::False, Label::True]
        );
    }

    #[test]
    fn config_with_generic_labels_uses_default() {
        let raw = r#"{"id2label": {"0": "LABEL_0", "1": "LABEL_1", "2": "LABEL_2"}}"#;
        let mapping = LabelMapping::from_config_json(raw).unwrap();
        assert_eq!(mapping, LabelMapping::default());
    }

    #[test]
    fn config_without_id2label_uses_default() {
        let mapping = LabelMapping::from_config_json(r#"{"hidden_size": 768}"#).unwrap();
        assert_eq!(mapping, LabelMapping::default());
    }

    #[test]
    fn config_with_extra_class_is_rejected() {
        let raw = r#"{"id2label": {"0": "false", "1": "true", "2": "misleading", "3": "satire"}}"#;
        assert!(matches!(
            LabelMapping::from_config_json(raw),
            Err(LabelError::WrongCount { actual: 4, .. })
        ));
    }

    #[test]
    fn config_with_out_of_range_index_is_rejected() {
        let raw = r#"{"id2label": {"0": "false", "1": "true", "5": "misleading"}}"#;
        assert!(matches!(
            LabelMapping::from_config_json(raw),
            Err(LabelError::BadIndex(_))
        ));
    }

    #[test]
    fn config_with_unknown_name_is_rejected() {
        let raw = r#"{"id2label": {"0": "false", "1": "true", "2": "satire"}}"#;
        assert!(matches!(
            LabelMapping::from_config_json(raw),
            Err(LabelError::UnknownLabel(_))
        ));
    }

    #[test]
    fn from_model_dir_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"id2label": {"0": "true", "1": "false", "2": "misleading"}}"#,
        )
        .unwrap();

        let mapping = LabelMapping::from_model_dir(dir.path()).unwrap();
        assert_eq!(mapping.label(0), Some(Label::True));
    }

    #[test]
    fn from_model_dir_without_config_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = LabelMapping::from_model_dir(dir.path()).unwrap();
        assert_eq!(mapping, LabelMapping::default());
    }
}
