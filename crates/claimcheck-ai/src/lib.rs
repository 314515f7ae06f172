//! Claim classification pipeline: tokenizer encoding, model inference, score decoding.

pub mod classifier;
pub mod decoder;
pub mod encoder;
pub mod service;

#[cfg(feature = "onnx")]
mod onnx;

pub use classifier::{Device, RawScores, SequenceClassifier};
pub use decoder::{Decoded, Probabilities, decode};
pub use encoder::{EncodedInput, Encoder};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use service::{InferenceService, ServiceError};
