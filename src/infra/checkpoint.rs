// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights with burn's recorders.
//
// File layout:
//   checkpoints/
//     train_config.json       ← TrainConfig incl. SequenceConfig,
//                               written before the first epoch
//     checkpoint_best.mpk.gz  ← rewritten on every improvement
//     best_epoch.json         ← epoch of checkpoint_best
//     model.mpk.gz            ← durable artifact: best weights,
//                               written only after training ends
//     metrics.csv             ← see metrics.rs
//
// The predictor reads train_config.json and model.mpk.gz only.
// Every weight file and best_epoch.json is removed when a new run
// starts, so a run that aborts half way never leaves an earlier
// run's weights paired with a new configuration.
//
// Weights are stored at full precision so a restored snapshot
// reproduces the saved parameters exactly.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::DigitModel;

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const CONFIG_FILE:     &str = "train_config.json";
const BEST_EPOCH_FILE: &str = "best_epoch.json";
const BEST_STEM:       &str = "checkpoint_best";
const MODEL_STEM:      &str = "model";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Create the directory and drop every artifact left by a previous run.
    pub fn prepare_run(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", self.dir.display()))?;

        let stale = [
            self.model_path(MODEL_STEM),
            self.model_path(BEST_STEM),
            self.dir.join(BEST_EPOCH_FILE),
        ];
        for path in stale.iter().filter(|p| p.exists()) {
            fs::remove_file(path)
                .with_context(|| format!("Cannot remove stale artifact '{}'", path.display()))?;
            tracing::debug!("Removed stale artifact '{}'", path.display());
        }
        Ok(())
    }

    /// Persist the current best weights and remember their epoch.
    pub fn save_best<B: Backend>(&self, model: &DigitModel<B>, epoch: usize) -> Result<()> {
        self.record(model, BEST_STEM)?;

        let path = self.dir.join(BEST_EPOCH_FILE);
        fs::write(&path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Saved best checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Persist the restored best weights as the artifact used for inference.
    pub fn save_final<B: Backend>(&self, model: &DigitModel<B>) -> Result<()> {
        self.record(model, MODEL_STEM)?;
        tracing::info!("Saved model to '{}'", self.model_path(MODEL_STEM).display());
        Ok(())
    }

    /// Load the durable artifact into a model of matching architecture.
    pub fn load_model<B: Backend>(&self, model: DigitModel<B>, device: &B::Device) -> Result<DigitModel<B>> {
        self.load(model, MODEL_STEM, device)
    }

    /// Must be written before training starts so inference can
    /// rebuild the model and share the same SequenceConfig.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }

    fn model_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.mpk.gz"))
    }

    fn record<B: Backend>(&self, model: &DigitModel<B>, stem: &str) -> Result<()> {
        // The recorder appends the extension itself
        let path = self.dir.join(stem);
        CheckpointRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(())
    }

    fn load<B: Backend>(&self, model: DigitModel<B>, stem: &str, device: &B::Device) -> Result<DigitModel<B>> {
        // The recorder appends the extension itself
        let path = self.dir.join(stem);
        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    self.model_path(stem).display()
                )
            })?;
        Ok(model.load_record(record))
    }
}
