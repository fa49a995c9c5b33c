//! BERT sequence classifier run on CPU with candle.
//!
//! Loads a `BertForSequenceClassification` checkpoint (encoder, pooler and a
//! linear classification head) from the Hugging Face hub or a local directory
//! and scores a single text per call.

use super::{top_prediction, ClassifierError, TextClassifier};
use crate::config::ModelConfig;
use crate::models::Prediction;
use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::decoders::DecoderWrapper;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::models::ModelWrapper;
use tokenizers::normalizers::{BertNormalizer, NormalizerWrapper};
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::processors::PostProcessorWrapper;
use tokenizers::{Model, Tokenizer, TokenizerBuilder};

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const UNK_TOKEN: &str = "[UNK]";

/// Fields of `config.json` needed around the candle encoder.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    hidden_size: usize,
    max_position_embeddings: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

#[derive(Debug)]
enum TokenizerFile {
    /// Serialized `tokenizers` pipeline.
    Json(PathBuf),
    /// Bare WordPiece vocabulary of an uncased BERT checkpoint.
    Vocab(PathBuf),
}

#[derive(Debug)]
enum WeightsFile {
    SafeTensors(PathBuf),
    PyTorch(PathBuf),
}

#[derive(Debug)]
struct ModelFiles {
    config: PathBuf,
    tokenizer: TokenizerFile,
    weights: WeightsFile,
}

pub struct BertClassifier {
    model_id: String,
    encoder: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    max_len: usize,
    sep_id: u32,
    device: Device,
}

impl BertClassifier {
    /// Resolves model files and builds the network. Blocking.
    pub fn load(config: &ModelConfig) -> Result<Self, ClassifierError> {
        let files = match &config.local_path {
            Some(dir) => {
                tracing::info!(path = %dir.display(), "Loading model from local directory");
                local_files(dir)?
            }
            None => {
                tracing::info!(
                    model_id = %config.model_id,
                    revision = %config.revision,
                    "Fetching model from hub"
                );
                hub_files(config)?
            }
        };

        let model_id = match &config.local_path {
            Some(dir) => dir.display().to_string(),
            None => config.model_id.clone(),
        };

        Self::from_files(model_id, &files)
    }

    fn from_files(model_id: String, files: &ModelFiles) -> Result<Self, ClassifierError> {
        let device = Device::Cpu;

        let raw_config = std::fs::read_to_string(&files.config)?;
        let tokenizer = match &files.tokenizer {
            TokenizerFile::Json(path) => Tokenizer::from_file(path)
                .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?,
            TokenizerFile::Vocab(path) => wordpiece_tokenizer(path)?,
        };
        let vb = match &files.weights {
            WeightsFile::SafeTensors(path) => {
                VarBuilder::from_buffered_safetensors(std::fs::read(path)?, DType::F32, &device)?
            }
            WeightsFile::PyTorch(path) => VarBuilder::from_pth(path, DType::F32, &device)?,
        };

        Self::new(model_id, &raw_config, tokenizer, vb)
    }

    /// Assembles the network from a `config.json` body and a weight source.
    fn new(
        model_id: String,
        raw_config: &str,
        tokenizer: Tokenizer,
        vb: VarBuilder,
    ) -> Result<Self, ClassifierError> {
        let head: HeadConfig = serde_json::from_str(raw_config)
            .map_err(|e| ClassifierError::InvalidConfig(e.to_string()))?;
        let bert_config: BertConfig = serde_json::from_str(raw_config)
            .map_err(|e| ClassifierError::InvalidConfig(e.to_string()))?;
        let labels = labels_from_id2label(&head.id2label)?;

        let sep_id = tokenizer.token_to_id(SEP_TOKEN).ok_or_else(|| {
            ClassifierError::Tokenizer(format!("vocabulary has no {} token", SEP_TOKEN))
        })?;

        let encoder = BertModel::load(vb.pp("bert"), &bert_config)?;
        let pooler = candle_nn::linear(
            head.hidden_size,
            head.hidden_size,
            vb.pp("bert.pooler.dense"),
        )?;
        let classifier = candle_nn::linear(head.hidden_size, labels.len(), vb.pp("classifier"))?;

        tracing::info!(
            model_id = %model_id,
            labels = ?labels,
            max_len = head.max_position_embeddings,
            "Loaded BERT classifier"
        );

        Ok(Self {
            model_id,
            encoder,
            pooler,
            classifier,
            tokenizer,
            labels,
            max_len: head.max_position_embeddings,
            sep_id,
            device: vb.device().clone(),
        })
    }

    /// Softmax probabilities over the label set.
    fn probabilities(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;
        let ids = truncate_ids(encoding.get_ids(), self.max_len, self.sep_id);

        let input_ids = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // (1, seq_len, hidden) -> [CLS] state (1, hidden)
        let hidden = self.encoder.forward(&input_ids, &token_type_ids, None)?;
        let cls = hidden.i((.., 0))?;

        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;

        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl TextClassifier for BertClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, ClassifierError> {
        let probs = self.probabilities(text)?;
        let top = top_prediction(&probs, &self.labels).ok_or_else(|| {
            ClassifierError::InvalidConfig(format!(
                "model produced {} scores for {} labels",
                probs.len(),
                self.labels.len()
            ))
        })?;
        Ok(vec![top])
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn hub_files(config: &ModelConfig) -> Result<ModelFiles, ClassifierError> {
    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(cache_dir) = &config.cache_dir {
        builder = builder.with_cache_dir(cache_dir.clone());
    }
    let api = builder.build()?;
    let repo = api.repo(Repo::with_revision(
        config.model_id.clone(),
        RepoType::Model,
        config.revision.clone(),
    ));

    let config_path = repo.get("config.json")?;
    let tokenizer = match repo.get("tokenizer.json") {
        Ok(path) => TokenizerFile::Json(path),
        Err(_) => TokenizerFile::Vocab(repo.get("vocab.txt")?),
    };
    let weights = match repo.get("model.safetensors") {
        Ok(path) => WeightsFile::SafeTensors(path),
        Err(_) => WeightsFile::PyTorch(repo.get("pytorch_model.bin")?),
    };

    Ok(ModelFiles {
        config: config_path,
        tokenizer,
        weights,
    })
}

fn local_files(dir: &Path) -> Result<ModelFiles, ClassifierError> {
    let require = |name: &str| -> Result<PathBuf, ClassifierError> {
        let path = dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ClassifierError::InvalidConfig(format!(
                "{} not found in {}",
                name,
                dir.display()
            )))
        }
    };

    let tokenizer = match require("tokenizer.json") {
        Ok(path) => TokenizerFile::Json(path),
        Err(_) => TokenizerFile::Vocab(require("vocab.txt")?),
    };
    let weights = match require("model.safetensors") {
        Ok(path) => WeightsFile::SafeTensors(path),
        Err(_) => WeightsFile::PyTorch(require("pytorch_model.bin")?),
    };

    Ok(ModelFiles {
        config: require("config.json")?,
        tokenizer,
        weights,
    })
}

/// Uncased BERT tokenizer built from a WordPiece vocabulary file.
fn wordpiece_tokenizer(vocab: &Path) -> Result<Tokenizer, ClassifierError> {
    let tokenizer_err = |e: tokenizers::Error| ClassifierError::Tokenizer(e.to_string());

    let vocab = vocab.to_str().ok_or_else(|| {
        ClassifierError::Tokenizer(format!("non UTF-8 vocab path {}", vocab.display()))
    })?;
    let wordpiece = WordPiece::from_file(vocab)
        .unk_token(UNK_TOKEN.to_string())
        .build()
        .map_err(tokenizer_err)?;

    let special = |token: &str| {
        wordpiece
            .token_to_id(token)
            .ok_or_else(|| ClassifierError::Tokenizer(format!("vocabulary has no {} token", token)))
    };
    let cls_id = special(CLS_TOKEN)?;
    let sep_id = special(SEP_TOKEN)?;

    let tokenizer = TokenizerBuilder::<
        ModelWrapper,
        NormalizerWrapper,
        PreTokenizerWrapper,
        PostProcessorWrapper,
        DecoderWrapper,
    >::new()
    .with_model(wordpiece.into())
    .with_normalizer(Some(BertNormalizer::new(true, true, None, true).into()))
    .with_pre_tokenizer(Some(BertPreTokenizer.into()))
    .with_post_processor(Some(
        BertProcessing::new(
            (SEP_TOKEN.to_string(), sep_id),
            (CLS_TOKEN.to_string(), cls_id),
        )
        .into(),
    ))
    .build()
    .map_err(tokenizer_err)?;

    Ok(Tokenizer::from(tokenizer))
}

/// Orders `id2label` by class index. Indices must cover `0..n` exactly.
fn labels_from_id2label(id2label: &HashMap<String, String>) -> Result<Vec<String>, ClassifierError> {
    if id2label.is_empty() {
        return Err(ClassifierError::InvalidConfig(
            "config.json has no id2label mapping".to_string(),
        ));
    }

    let mut labels = vec![None; id2label.len()];
    for (id, label) in id2label {
        let idx: usize = id
            .parse()
            .map_err(|_| ClassifierError::InvalidConfig(format!("non-numeric label id '{}'", id)))?;
        let slot = labels.get_mut(idx).ok_or_else(|| {
            ClassifierError::InvalidConfig(format!("label id {} out of range", idx))
        })?;
        *slot = Some(label.clone());
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(idx, label)| {
            label.ok_or_else(|| ClassifierError::InvalidConfig(format!("missing label id {}", idx)))
        })
        .collect()
}

/// Cuts an encoded sequence to `max_len` tokens, keeping the closing `[SEP]`.
fn truncate_ids(ids: &[u32], max_len: usize, sep_id: u32) -> Vec<u32> {
    if ids.len() <= max_len || max_len == 0 {
        return ids.to_vec();
    }
    let mut truncated = ids[..max_len - 1].to_vec();
    truncated.push(sep_id);
    truncated
}
