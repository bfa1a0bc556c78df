// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — trains the model on a CSV of (input, output) pairs
//   2. `predict` — loads a checkpoint and inverts digit sequences
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "digit-inverse",
    version = "0.1.0",
    about = "Train a scalar → digit-sequence model, then invert sequences back to scalars."
)]
pub struct Cli {
    /// The subcommand to run (train or predict)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on: {}", args.data_path);

    let use_case = TrainUseCase::new(args.into());
    let report   = use_case.execute()?;

    if report.early_stopped {
        println!(
            "\nStopped early at epoch {}; best epoch {} (val_loss={:.4}).",
            report.stopped_epoch, report.best_epoch, report.best_val_loss
        );
    } else {
        println!(
            "\nCompleted {} epochs; best epoch {} (val_loss={:.4}).",
            report.stopped_epoch, report.best_epoch, report.best_val_loss
        );
    }
    println!("Training complete. Model saved to '{}'.", use_case.config().checkpoint_dir);
    Ok(())
}

/// Handles the `predict` subcommand.
fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.checkpoint_dir)?;
    println!("Model loaded (sequence length {}).", use_case.capacity());

    let answered = use_case.run_interactive()?;
    tracing::info!("Session ended after {} predictions", answered);
    Ok(())
}
