// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the offline phase:
//
//   Step 1: Validate the configuration
//   Step 2: Prepare the checkpoint dir    (Layer 6 - infra)
//   Step 3: Load, sample, encode, split   (Layer 4 - data)
//   Step 4: Save config for inference     (Layer 6 - infra)
//   Step 5: Run training loop             (Layer 5 - ml)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::DatasetBuilder, loader::CsvPairLoader};
use crate::domain::sequence::SequenceConfig;
use crate::domain::traits::PairSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::DigitModelConfig;
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialised next to the checkpoint so the predictor rebuilds the
// same architecture and reuses the same SequenceConfig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub checkpoint_dir: String,
    pub sample_size:    Option<usize>,
    pub seed:           u64,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub patience:       usize,
    pub lr:             f64,
    pub hidden_1:       usize,
    pub hidden_2:       usize,
    pub recurrent:      usize,
    pub dropout:        f64,
    pub sequence:       SequenceConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            sample_size:    None,
            seed:           42,
            batch_size:     128,
            epochs:         50,
            patience:       5,
            lr:             1e-3,
            hidden_1:       128,
            hidden_2:       256,
            recurrent:      128,
            dropout:        0.2,
            sequence:       SequenceConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> DigitModelConfig {
        DigitModelConfig::new(self.sequence.capacity, self.sequence.num_classes)
            .with_hidden_1(self.hidden_1)
            .with_hidden_2(self.hidden_2)
            .with_recurrent(self.recurrent)
            .with_dropout(self.dropout)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sequence.capacity > 0, "capacity must be at least 1");
        ensure!(self.sequence.num_classes == 10, "num_classes must be 10 (one per digit)");
        ensure!(self.sequence.normalization_max > 0, "normalization max must be positive");
        ensure!(self.batch_size > 0, "batch size must be at least 1");
        ensure!(self.epochs > 0, "epoch budget must be at least 1");
        ensure!(self.patience > 0, "patience must be at least 1");
        ensure!((0.0..1.0).contains(&self.dropout), "dropout must be in [0, 1)");
        Ok(())
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let source = CsvPairLoader::new(&self.config.data_path);
        self.execute_with(&source)
    }

    /// Run the pipeline against any pair source.
    pub fn execute_with(&self, source: &impl PairSource) -> Result<TrainingReport> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Checkpoint dir ────────────────────────────────────────────
        // Drops the previous run's weights and best_epoch.json: nothing
        // from an earlier run may be mistaken for this run's output.
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.prepare_run()?;

        // ── Step 3: Dataset ───────────────────────────────────────────────────
        let partitions = DatasetBuilder::new(cfg.sequence, cfg.seed)
            .with_sample_size(cfg.sample_size)
            .build(source)?;
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            partitions.train.len(),
            partitions.validation.len(),
            partitions.test.len(),
        );

        // ── Step 4: Save config for inference ─────────────────────────────────
        ckpt_manager.save_config(cfg)?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        run_training(cfg, partitions, &ckpt_manager)
    }
}
