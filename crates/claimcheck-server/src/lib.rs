//! Process host: configuration, startup loading, and the HTTP router.

pub mod config;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use claimcheck_ai::{Encoder, InferenceService, OnnxClassifier, SequenceClassifier};
use claimcheck_core::LabelMapping;
use tracing::info;

pub use config::{Environment, ServerConfig};
pub use routes::{AppState, InfoResponse, build_router};

/// Load the label mapping, tokenizer and model from `config.model_path`.
///
/// Blocking; runs once before the server accepts traffic.
pub fn load_service(config: &ServerConfig) -> anyhow::Result<InferenceService> {
    let model_dir = &config.model_path;
    anyhow::ensure!(
        model_dir.is_dir(),
        "model directory {} does not exist",
        model_dir.display()
    );

    let labels = LabelMapping::from_model_dir(model_dir).context("loading label mapping")?;
    let encoder = Encoder::from_model_dir(model_dir, config.max_length as usize)
        .context("loading tokenizer")?;
    let classifier = OnnxClassifier::load(model_dir, config.device).context("loading model")?;

    info!(
        model_dir = %model_dir.display(),
        device = %classifier.device(),
        max_length = config.max_length,
        "model artifacts ready"
    );
    InferenceService::new(encoder, Arc::new(classifier), labels)
}
