// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::sequence::{SequenceConfig, DEFAULT_CAPACITY, DEFAULT_NORMALIZATION_MAX};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the scalar → digit-sequence model on a CSV of pairs
    Train(TrainArgs),

    /// Interactively invert digit sequences with a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with `input` and `output` columns
    #[arg(long, default_value = "data.csv")]
    pub data_path: String,

    /// Directory for checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Train on a random subsample of this many rows
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Seed for sampling, splitting and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of examples per optimiser step
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Maximum number of passes through the training data
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 5)]
    pub patience: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the first dense expansion layer
    #[arg(long, default_value_t = 128)]
    pub hidden_1: usize,

    /// Width of the second dense expansion layer
    #[arg(long, default_value_t = 256)]
    pub hidden_2: usize,

    /// LSTM hidden size
    #[arg(long, default_value_t = 128)]
    pub recurrent: usize,

    /// Dropout probability after the LSTM
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Digits per output sequence (L)
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Divisor that maps integer inputs onto [0, 1]
    #[arg(long, default_value_t = DEFAULT_NORMALIZATION_MAX)]
    pub normalization_max: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        let mut sequence = SequenceConfig::with_capacity(a.capacity);
        sequence.normalization_max = a.normalization_max;

        TrainConfig {
            data_path:      a.data_path,
            checkpoint_dir: a.checkpoint_dir,
            sample_size:    a.sample_size,
            seed:           a.seed,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            patience:       a.patience,
            lr:             a.lr,
            hidden_1:       a.hidden_1,
            hidden_2:       a.hidden_2,
            recurrent:      a.recurrent,
            dropout:        a.dropout,
            sequence,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory where `train` saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
