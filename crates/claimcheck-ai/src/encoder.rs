//! Text → fixed-shape model input.
//!
//! Wraps a Hugging Face `tokenizers` tokenizer configured to truncate and
//! right-pad every input to exactly `max_length` tokens, so the classifier
//! always sees a `[1, max_length]` tensor.

use std::path::Path;

use tokenizers::{PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

const PAD_TOKEN: &str = "[PAD]";

/// Token ids plus attention mask, all of length `max_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub input_ids: Vec<i64>,
    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl EncodedInput {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Number of non-padding positions.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

/// Deterministic tokenizer front-end with a fixed output length.
pub struct Encoder {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl Encoder {
    /// Load `tokenizer.json` from a model directory.
    pub fn from_model_dir(model_dir: &Path, max_length: usize) -> anyhow::Result<Self> {
        let tokenizer_path = model_dir.join("tokenizer.json");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        let encoder = Self::new(tokenizer, max_length)?;
        info!(max_length, tokenizer = %tokenizer_path.display(), "loaded tokenizer");
        Ok(encoder)
    }

    /// Build from an in-memory `tokenizer.json` document.
    pub fn from_bytes(bytes: &[u8], max_length: usize) -> anyhow::Result<Self> {
        let tokenizer =
            Tokenizer::from_bytes(bytes).map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        Self::new(tokenizer, max_length)
    }

    /// Configure `tokenizer` for fixed-length output.
    ///
    /// Fails if `max_length` cannot hold the tokenizer's special tokens.
    pub fn new(mut tokenizer: Tokenizer, max_length: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(max_length > 0, "max_length must be positive");

        // Prefer the pad token the tokenizer was exported with.
        let (pad_id, pad_token) = match tokenizer.get_padding() {
            Some(p) => (p.pad_id, p.pad_token.clone()),
            None => (
                tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0),
                PAD_TOKEN.to_string(),
            ),
        };

        // Measure special tokens on a bare tokenizer before fixing the shape.
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("reset truncation: {e}"))?;
        tokenizer.with_padding(None);
        let special = tokenizer
            .encode("", true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?
            .get_ids()
            .len();
        anyhow::ensure!(
            max_length > special,
            "max_length {max_length} leaves no room next to {special} special tokens"
        );

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            direction: PaddingDirection::Right,
            pad_id,
            pad_token,
            ..Default::default()
        }));

        Ok(Self {
            tokenizer,
            max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Tokenize `text`, truncating or padding to exactly `max_length`.
    pub fn encode(&self, text: &str) -> anyhow::Result<EncodedInput> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let ids = encoding.get_ids();
        anyhow::ensure!(
            ids.len() == self.max_length,
            "encoded {} tokens, expected exactly {}",
            ids.len(),
            self.max_length
        );

        Ok(EncodedInput {
            input_ids: ids.iter().map(|&id| id as i64).collect(),
            attention_mask: encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect(),
            token_type_ids: encoding.get_type_ids().iter().map(|&t| t as i64).collect(),
        })
    }
}
