//! BERT encoder behind the `bert` feature.
//!
//! Sentence vectors are the hidden state at position 0 ([CLS]). Token vectors
//! come from the first sub-word whose character span covers the offset.

use crate::embedding::{subword_position, Embedder, Vector};
use crate::error::GroupingError;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::api::sync::Api;
use std::fs;
use std::path::{Path, PathBuf};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "neuralmind/bert-base-portuguese-cased";
pub const DEFAULT_MAX_LENGTH: usize = 128;

#[derive(Debug, Clone)]
pub struct BertConfig {
    /// Local directory or hub model id.
    pub model: String,
    /// Sub-word limit per sentence; longer input is truncated.
    pub max_length: usize,
}

impl Default for BertConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Where the tokenizer comes from. Older hub models ship only a WordPiece
/// vocabulary and a `tokenizer_config.json`.
enum TokenizerSource {
    Json(PathBuf),
    Vocab { vocab: PathBuf, config: Option<PathBuf> },
}

struct ModelFiles {
    config: PathBuf,
    tokenizer: TokenizerSource,
    weights: PathBuf,
}

impl ModelFiles {
    fn local(dir: &Path) -> Self {
        let safetensors = dir.join("model.safetensors");
        let weights = if safetensors.exists() {
            safetensors
        } else {
            dir.join("pytorch_model.bin")
        };

        let json = dir.join("tokenizer.json");
        let tokenizer = if json.exists() {
            TokenizerSource::Json(json)
        } else {
            let config = dir.join("tokenizer_config.json");
            TokenizerSource::Vocab {
                vocab: dir.join("vocab.txt"),
                config: config.exists().then_some(config),
            }
        };

        Self {
            config: dir.join("config.json"),
            tokenizer,
            weights,
        }
    }

    fn fetch(model_id: &str) -> Result<Self, GroupingError> {
        let api = Api::new().map_err(GroupingError::embedding)?;
        let repo = api.model(model_id.to_string());

        let config = repo.get("config.json").map_err(GroupingError::embedding)?;
        let tokenizer = match repo.get("tokenizer.json") {
            Ok(json) => TokenizerSource::Json(json),
            Err(err) => {
                debug!(model = model_id, %err, "No tokenizer.json, using vocab.txt");
                TokenizerSource::Vocab {
                    vocab: repo.get("vocab.txt").map_err(GroupingError::embedding)?,
                    config: repo.get("tokenizer_config.json").ok(),
                }
            }
        };
        let weights = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))
            .map_err(GroupingError::embedding)?;

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}

impl TokenizerSource {
    fn load(&self) -> Result<Tokenizer, GroupingError> {
        match self {
            TokenizerSource::Json(path) => Tokenizer::from_file(path).map_err(GroupingError::embedding),
            TokenizerSource::Vocab { vocab, config } => {
                let lowercase = match config {
                    Some(path) => do_lower_case(path)?,
                    None => false,
                };
                wordpiece_tokenizer(vocab, lowercase)
            }
        }
    }
}

/// `do_lower_case` from a `tokenizer_config.json`; absent means cased.
fn do_lower_case(path: &Path) -> Result<bool, GroupingError> {
    let raw = fs::read_to_string(path).map_err(GroupingError::embedding)?;
    let config: serde_json::Value = serde_json::from_str(&raw).map_err(GroupingError::embedding)?;
    Ok(config
        .get("do_lower_case")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false))
}

/// Standard BERT pipeline around a WordPiece vocabulary:
/// normalizer, whitespace/punctuation pre-tokenizer, `[CLS] ... [SEP]` framing.
fn wordpiece_tokenizer(vocab: &Path, lowercase: bool) -> Result<Tokenizer, GroupingError> {
    let wordpiece = WordPiece::from_file(&vocab.to_string_lossy())
        .build()
        .map_err(GroupingError::embedding)?;
    let mut tokenizer = Tokenizer::new(wordpiece);

    let special = |token: &str| {
        tokenizer
            .token_to_id(token)
            .map(|id| (token.to_string(), id))
            .ok_or_else(|| GroupingError::embedding(format!("{} missing from {:?}", token, vocab)))
    };
    let sep = special("[SEP]")?;
    let cls = special("[CLS]")?;

    tokenizer
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(sep, cls)));
    Ok(tokenizer)
}

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl BertEmbedder {
    pub fn load(config: &BertConfig) -> Result<Self, GroupingError> {
        let dir = Path::new(&config.model);
        let files = if dir.is_dir() {
            ModelFiles::local(dir)
        } else {
            ModelFiles::fetch(&config.model)?
        };
        info!(model = %config.model, "Loading BERT encoder");

        let device = Device::Cpu;

        let raw_config = fs::read_to_string(&files.config).map_err(GroupingError::embedding)?;
        let bert_config: Config = serde_json::from_str(&raw_config).map_err(GroupingError::embedding)?;

        let is_safetensors = files
            .weights
            .extension()
            .map_or(false, |ext| ext == "safetensors");
        let vb = if is_safetensors {
            // SAFETY: the weights file is not modified while mapped
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device) }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)
        };
        let vb = vb.map_err(GroupingError::embedding)?;

        let model = BertModel::load(vb, &bert_config).map_err(GroupingError::embedding)?;

        let mut tokenizer = files.tokenizer.load()?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(GroupingError::embedding)?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Last hidden layer `[seq, hidden]` and the per-sub-word char spans.
    fn encode(&self, text: &str) -> Result<(Tensor, Vec<(usize, usize)>), GroupingError> {
        let encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(GroupingError::embedding)?;

        let hidden = self.forward(encoding.get_ids()).map_err(GroupingError::embedding)?;
        Ok((hidden, encoding.get_offsets().to_vec()))
    }

    fn forward(&self, ids: &[u32]) -> candle_core::Result<Tensor> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        hidden.i(0)
    }

    fn row(hidden: &Tensor, position: usize) -> Result<Vector, GroupingError> {
        hidden
            .i(position)
            .and_then(|row| row.to_dtype(DType::F32))
            .and_then(|row| row.to_vec1::<f32>())
            .map_err(GroupingError::embedding)
    }
}

impl Embedder for BertEmbedder {
    fn embed_sentence(&self, text: &str) -> Result<Vector, GroupingError> {
        let (hidden, _) = self.encode(text)?;
        Self::row(&hidden, 0)
    }

    fn embed_token(&self, text: &str, char_offset: usize) -> Result<Vector, GroupingError> {
        let (hidden, offsets) = self.encode(text)?;

        Self::row(&hidden, subword_position(&offsets, char_offset))
    }
}
