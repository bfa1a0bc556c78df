// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Adam over shuffled mini-batches, validation after every epoch,
// early stopping on validation loss.
//
// Per epoch:
//   Running         — one pass over the training loader
//   validation      — model.valid() on the inner backend, so no
//                     autodiff graph and no dropout
//   CheckpointCheck — strict improvement → snapshot + save_best
//   EarlyStop       — `patience` epochs without improvement
//
// Finished (early stop or epoch budget):
//   restore the best snapshot, save it as model.mpk.gz, evaluate
//   on the test partition and decode one example prediction.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Context, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::{DigitDataset, DigitSample},
    splitter::Partitions,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::backend::{default_device, TrainBackend};
use crate::ml::early_stopping::{EarlyStopping, EpochVerdict};
use crate::ml::model::{to_categorical, DigitModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalMetrics {
    pub loss:     f64,
    pub accuracy: f64,
}

/// The first test example pushed through the restored model.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePrediction {
    pub input:     u64,
    pub actual:    String,
    pub predicted: String,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub history:       Vec<EpochMetrics>,
    pub best_epoch:    usize,
    pub best_val_loss: f64,
    pub stopped_epoch: usize,
    pub early_stopped: bool,
    /// None when the test partition is empty
    pub test:          Option<EvalMetrics>,
    pub example:       Option<ExamplePrediction>,
}

pub fn run_training(
    cfg:          &TrainConfig,
    partitions:   Partitions<DigitSample>,
    ckpt_manager: &CheckpointManager,
) -> Result<TrainingReport> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    train_loop::<TrainBackend>(cfg, partitions, ckpt_manager, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    partitions:   Partitions<DigitSample>,
    ckpt_manager: &CheckpointManager,
    device:       B::Device,
) -> Result<TrainingReport> {
    let Partitions { train, validation, test } = partitions;
    if train.is_empty() || validation.is_empty() {
        bail!(
            "Dataset too small: {} train and {} validation samples",
            train.len(),
            validation.len()
        );
    }
    let example_sample = test.first().cloned();
    let has_test       = !test.is_empty();

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: DigitModel<B> = cfg.model_config().init(&device);
    tracing::info!(
        "Model ready: L={}, {} parameters",
        cfg.sequence.capacity,
        model.num_params()
    );

    let mut optim = AdamConfig::new().init::<B, DigitModel<B>>();

    // ── Data loaders ──────────────────────────────────────────────────────────
    // Training batches live on the autodiff backend; validation and
    // test batches on the inner backend.
    let train_loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(DigitDataset::new(train));

    let val_loader = DataLoaderBuilder::new(DigitBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(DigitDataset::new(validation));

    let test_loader = DataLoaderBuilder::new(DigitBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(DigitDataset::new(test));

    let mut metrics = MetricsLogger::new(ckpt_manager.dir())?;
    let mut stopper = EarlyStopping::new(cfg.patience);
    let mut history = Vec::new();
    let mut stopped_epoch = 0;
    let mut early_stopped = false;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        stopped_epoch = epoch;

        let mut loss_sum = 0.0f64;
        let mut seen     = 0usize;
        let mut correct  = 0usize;
        let mut slots    = 0usize;

        for batch in train_loader.iter() {
            let batch_size = batch.inputs.dims()[0];
            let output = model.forward_loss(batch.inputs, batch.targets);

            let loss_val: f64 = output.loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                bail!("Non-finite training loss ({loss_val}) in epoch {epoch}");
            }
            loss_sum += loss_val * batch_size as f64;
            seen     += batch_size;

            let (c, t) = output.correct_positions();
            correct += c;
            slots   += t;

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = loss_sum / seen.max(1) as f64;
        let train_acc  = correct as f64 / slots.max(1) as f64;

        let val = evaluate(&model.valid(), val_loader.as_ref());
        if !val.loss.is_finite() {
            bail!("Non-finite validation loss ({}) in epoch {epoch}", val.loss);
        }

        let m = EpochMetrics::new(epoch, train_loss, train_acc, val.loss, val.accuracy);
        metrics.log(&m)?;
        history.push(m);

        let verdict = checkpoint_epoch(&mut stopper, ckpt_manager, &model, epoch, val.loss)?;
        let marker  = if verdict == EpochVerdict::Improved { " | saved" } else { "" };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%{}",
            epoch, cfg.epochs, train_loss, train_acc * 100.0, val.loss, val.accuracy * 100.0, marker,
        );

        if let EpochVerdict::Stop { best_epoch } = verdict {
            tracing::info!(
                "Early stopping at epoch {}: no improvement for {} epochs, restoring epoch {}",
                epoch, cfg.patience, best_epoch
            );
            early_stopped = true;
            break;
        }
    }

    // ── Restore best weights ──────────────────────────────────────────────────
    let best = stopper
        .into_best()
        .context("No epoch produced an improving validation loss")?;
    let model = model.load_record(best.state);
    ckpt_manager.save_final(&model)?;
    tracing::info!("Restored weights from epoch {} (val_loss={:.4})", best.epoch, best.val_loss);

    // ── Test evaluation ───────────────────────────────────────────────────────
    let model_valid = model.valid();
    let test_metrics = if has_test {
        let t = evaluate(&model_valid, test_loader.as_ref());
        println!("Test Loss: {:.4}", t.loss);
        println!("Test Accuracy: {:.4}", t.accuracy);
        Some(t)
    } else {
        tracing::warn!("Test partition is empty; skipping final evaluation");
        None
    };

    let example = match example_sample {
        Some(sample) => Some(example_prediction(&model_valid, &sample, cfg, &device)?),
        None => None,
    };

    Ok(TrainingReport {
        history,
        best_epoch:    best.epoch,
        best_val_loss: best.val_loss,
        stopped_epoch,
        early_stopped,
        test:          test_metrics,
        example,
    })
}

/// Feed one validation loss to the stopper and persist the weights
/// whenever it improved.
pub fn checkpoint_epoch<B: Backend>(
    stopper:      &mut EarlyStopping<<DigitModel<B> as Module<B>>::Record>,
    ckpt_manager: &CheckpointManager,
    model:        &DigitModel<B>,
    epoch:        usize,
    val_loss:     f64,
) -> Result<EpochVerdict> {
    let verdict = stopper.observe(epoch, val_loss, || model.clone().into_record());
    if verdict == EpochVerdict::Improved {
        ckpt_manager.save_best(model, epoch)?;
    }
    Ok(verdict)
}

/// Loss and per-position accuracy over a loader, without updating anything.
pub fn evaluate<B: Backend>(
    model:  &DigitModel<B>,
    loader: &dyn DataLoader<DigitBatch<B>>,
) -> EvalMetrics {
    let mut loss_sum = 0.0f64;
    let mut seen     = 0usize;
    let mut correct  = 0usize;
    let mut slots    = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.inputs.dims()[0];
        let output = model.forward_loss(batch.inputs, batch.targets);

        loss_sum += output.loss.clone().into_scalar().elem::<f64>() * batch_size as f64;
        seen     += batch_size;

        let (c, t) = output.correct_positions();
        correct += c;
        slots   += t;
    }

    EvalMetrics {
        loss:     if seen > 0 { loss_sum / seen as f64 } else { f64::NAN },
        accuracy: if slots > 0 { correct as f64 / slots as f64 } else { 0.0 },
    }
}

fn example_prediction<B: Backend>(
    model:  &DigitModel<B>,
    sample: &DigitSample,
    cfg:    &TrainConfig,
    device: &B::Device,
) -> Result<ExamplePrediction> {
    let codec = cfg.sequence.codec();
    let input = Tensor::<B, 1>::from_floats([sample.input.value() as f32].as_slice(), device)
        .reshape([1, 1]);

    let predicted = to_categorical(model.forward_probabilities(input))?
        .first()
        .map(|t| codec.decode(t))
        .context("Model returned an empty batch")?;

    let example = ExamplePrediction {
        input:  sample.input.to_raw(&cfg.sequence),
        actual: codec.decode(&sample.target),
        predicted,
    };

    println!("\n--- Example Prediction ---");
    println!("Input Integer: {}", example.input);
    println!("Actual Output Sequence: {}", example.actual);
    println!("Predicted Output Sequence: {}", example.predicted);

    Ok(example)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::DigitModelConfig;

    type TestBackend = burn::backend::NdArray;

    fn output_at(model: &DigitModel<TestBackend>, x: f32) -> Vec<f32> {
        let input = Tensor::<TestBackend, 1>::from_floats([x].as_slice(), &Default::default())
            .reshape([1, 1]);
        model.forward(input).into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_plateau_keeps_third_epoch_on_disk_and_in_memory() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path());
        let device = Default::default();
        ckpt.prepare_run().unwrap();

        let config = DigitModelConfig::new(3, 10).with_hidden_1(4).with_hidden_2(4).with_recurrent(4);
        // three improvements, then five epochs without one
        let losses = [1.0, 0.9, 0.8, 0.8, 0.85, 0.9, 0.81, 0.95, 0.1];
        let models: Vec<DigitModel<TestBackend>> = losses.iter().map(|_| config.init(&device)).collect();

        let mut stopper = EarlyStopping::new(5);
        let mut stopped = 0;
        for (i, (&loss, model)) in losses.iter().zip(&models).enumerate() {
            stopped = i + 1;
            let verdict = checkpoint_epoch(&mut stopper, &ckpt, model, stopped, loss).unwrap();
            if let EpochVerdict::Stop { best_epoch } = verdict {
                assert_eq!(best_epoch, 3);
                break;
            }
        }
        assert_eq!(stopped, 8);

        let best_epoch: usize = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("best_epoch.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(best_epoch, 3);
        assert!(dir.path().join("checkpoint_best.mpk.gz").exists());

        let best = stopper.into_best().unwrap();
        assert_eq!(best.epoch, 3);
        let restored = config.init::<TestBackend>(&device).load_record(best.state);
        assert_eq!(output_at(&restored, 0.3), output_at(&models[2], 0.3));
        assert_ne!(output_at(&restored, 0.3), output_at(&models[7], 0.3));
    }
}
