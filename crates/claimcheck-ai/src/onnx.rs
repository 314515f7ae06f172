//! ONNX Runtime backend for fine-tuned sequence classification models.
//!
//! The model directory must contain `model.onnx`, exported with a
//! `[batch, seq_len]` int64 `input_ids` / `attention_mask` signature (and
//! optionally `token_type_ids`) and a `[batch, num_labels]` float logits output.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ort::session::Session;
use ort::value::Tensor;
use tracing::{info, warn};

use crate::classifier::{Device, RawScores, SequenceClassifier};
use crate::encoder::EncodedInput;

/// Sequence classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    // `Session::run` needs `&mut`; requests take turns on the device.
    session: Mutex<Session>,
    num_labels: usize,
    takes_token_type_ids: bool,
    device: Device,
}

impl OnnxClassifier {
    /// Load `model.onnx` from `model_dir` and bind it to `device`.
    pub fn load(model_dir: &Path, device: Device) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");

        let (builder, bound) = session_builder(device)?;
        let session = builder.commit_from_file(&model_path)?;

        let num_labels = infer_num_labels(session.outputs()[0].dtype())
            .ok_or_else(|| anyhow::anyhow!("cannot read label count from model output shape"))?;
        let takes_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        info!(
            num_labels,
            device = %bound,
            token_type_ids = takes_token_type_ids,
            model = %model_path.display(),
            "loaded classification model"
        );
        Ok(Self {
            session: Mutex::new(session),
            num_labels,
            takes_token_type_ids,
            device: bound,
        })
    }
}

impl SequenceClassifier for OnnxClassifier {
    fn infer(&self, input: &EncodedInput) -> anyhow::Result<RawScores> {
        let seq_len = input.len();
        let shape = [1i64, seq_len as i64];

        let ids_tensor = Tensor::from_array((shape, input.input_ids.clone().into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array((shape, input.attention_mask.clone().into_boxed_slice()))?;

        let mut inputs = ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
        ];
        if self.takes_token_type_ids {
            let type_tensor =
                Tensor::from_array((shape, input.token_type_ids.clone().into_boxed_slice()))?;
            inputs.push(("token_type_ids".into(), type_tensor.into()));
        }

        let mut session = lock_session(&self.session);
        let outputs = session.run(inputs)?;

        // Logits: [1, num_labels].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1 && dims[1] as usize == self.num_labels,
            "unexpected output shape: {dims:?}, expected [1, {}]",
            self.num_labels
        );

        Ok(RawScores(output_data.to_vec()))
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn device(&self) -> Device {
        self.device
    }
}

/// Lock the session, recovering it if a previous holder panicked.
///
/// A run keeps no state in the session between calls.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

type SessionBuilder = ort::session::builder::SessionBuilder;

/// Session builder with execution providers for the requested device.
///
/// Returns the device the session will actually run on.
#[cfg(feature = "cuda")]
fn session_builder(device: Device) -> anyhow::Result<(SessionBuilder, Device)> {
    use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};

    let cuda = CUDAExecutionProvider::default();
    let use_cuda = match device {
        Device::Cpu => false,
        Device::Cuda => {
            anyhow::ensure!(cuda.is_available()?, "CUDA requested but not available");
            true
        }
        Device::Auto => {
            let available = cuda.is_available()?;
            if !available {
                warn!("CUDA not available, running on CPU");
            }
            available
        }
    };

    if !use_cuda {
        return Ok((Session::builder()?, Device::Cpu));
    }
    let builder = Session::builder()?
        .with_execution_providers([cuda.build().error_on_failure()])
        .map_err(|e| anyhow::anyhow!("register CUDA execution provider: {e}"))?;
    Ok((builder, Device::Cuda))
}

#[cfg(not(feature = "cuda"))]
fn session_builder(device: Device) -> anyhow::Result<(SessionBuilder, Device)> {
    match device {
        Device::Cuda => {
            anyhow::bail!("CUDA requested but claimcheck was built without the `cuda` feature")
        }
        Device::Auto => {
            warn!("built without CUDA support, running on CPU");
            Ok((Session::builder()?, Device::Cpu))
        }
        Device::Cpu => Ok((Session::builder()?, Device::Cpu)),
    }
}

/// Try to read the label count from the ONNX model output type.
fn infer_num_labels(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the class count.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
