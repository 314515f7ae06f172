//! The model seam: encoded input in, one logit per class out.

use std::fmt;
use std::str::FromStr;

use crate::encoder::EncodedInput;

/// Unnormalized class scores in the model's class-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScores(pub Vec<f32>);

impl RawScores {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A loaded, read-only sequence classification model.
///
/// Implementations are shared across request handlers, so `infer` takes
/// `&self` and must be safe to call from several threads.
pub trait SequenceClassifier: Send + Sync {
    /// Run one forward pass.
    fn infer(&self, input: &EncodedInput) -> anyhow::Result<RawScores>;

    /// Number of classes the model scores.
    fn num_labels(&self) -> usize;

    /// Compute device the model is bound to, for logging.
    fn device(&self) -> Device {
        Device::Cpu
    }
}

/// Compute device requested for (or bound to) a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CUDA when compiled in and available, otherwise CPU.
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!("unknown device {other:?} (expected auto, cpu or cuda)")),
        }
    }
}
