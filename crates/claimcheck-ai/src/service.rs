//! One prediction, end to end: validate → encode → infer → decode → respond.

use std::sync::Arc;

use claimcheck_core::{
    COVID_KEYWORDS, ClassificationRequest, ClassificationResponse, LabelMapping, relevance_score,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::classifier::{Device, SequenceClassifier};
use crate::decoder::decode;
use crate::encoder::Encoder;

/// Why a prediction failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller sent no usable text.
    #[error("{0}")]
    InvalidInput(String),

    /// Encoding, inference, or decoding failed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Stateless prediction pipeline over shared, read-only model artifacts.
pub struct InferenceService {
    encoder: Encoder,
    classifier: Arc<dyn SequenceClassifier>,
    labels: LabelMapping,
}

impl InferenceService {
    /// Wire the pipeline together. The classifier must score exactly one
    /// class per label.
    pub fn new(
        encoder: Encoder,
        classifier: Arc<dyn SequenceClassifier>,
        labels: LabelMapping,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            classifier.num_labels() == labels.len(),
            "model scores {} classes but the label mapping has {}",
            classifier.num_labels(),
            labels.len()
        );
        Ok(Self {
            encoder,
            classifier,
            labels,
        })
    }

    pub fn labels(&self) -> &LabelMapping {
        &self.labels
    }

    pub fn max_length(&self) -> usize {
        self.encoder.max_length()
    }

    pub fn device(&self) -> Device {
        self.classifier.device()
    }

    /// Classify the request text.
    ///
    /// Missing, empty, or whitespace-only text is rejected before the model
    /// runs. Every later failure comes back as [`ServiceError::Internal`].
    pub fn predict(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ServiceError> {
        let text = match request.text.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                warn!("rejected prediction request without text");
                return Err(ServiceError::InvalidInput("No text provided".into()));
            }
        };
        // Off-topic text is still classified; the score is only recorded.
        debug!(
            chars = text.chars().count(),
            relevance = relevance_score(text, &COVID_KEYWORDS),
            "validated"
        );

        self.run(text).map_err(|e| {
            error!(error = %format!("{e:#}"), "prediction failed");
            ServiceError::Internal(e)
        })
    }

    fn run(&self, text: &str) -> anyhow::Result<ClassificationResponse> {
        use anyhow::Context;

        let input = self.encoder.encode(text).context("encoding failed")?;
        debug!(tokens = input.token_count(), "encoded");

        let scores = self.classifier.infer(&input).context("inference failed")?;
        debug!(scores = ?scores.as_slice(), "inferred");

        let decoded = decode(&scores, &self.labels).context("decoding failed")?;
        debug!(label = %decoded.label, "decoded");

        Ok(ClassificationResponse {
            text: text.to_string(),
            predicted_label: decoded.label,
            probabilities: decoded.probabilities.to_percentages(&self.labels),
        })
    }
}
