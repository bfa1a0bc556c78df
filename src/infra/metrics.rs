// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training metrics to checkpoints/metrics.csv.
//
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,1.934512,0.312000,1.871230,0.335400
//   2,1.602300,0.401000,1.588100,0.412900
//
// Accuracy is per position: the fraction of the L digit slots
// whose arg-max matches the true digit.
//
// The file is recreated at the start of every run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub val_loss:   f64,
    pub val_acc:    f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, val_loss, val_acc }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl MetricsLogger {
    /// Create `metrics.csv` in `dir`, truncating any previous run.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path, writer })
    }

    /// Append one row and flush, so the file is complete even if
    /// a later epoch aborts the run.
    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 2.0, 0.1, 1.9, 0.15)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.5, 0.3, 1.4, 0.35)).unwrap();

        let mut reader = csv::Reader::from_path(logger.csv_path()).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, ["epoch", "train_loss", "train_acc", "val_loss", "val_acc"]);

        let rows: Vec<EpochMetrics> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].epoch, 2);
        assert_eq!(rows[1].val_loss, 1.4);
    }
}
