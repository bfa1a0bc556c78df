// ============================================================
// Layer 5 — Inferencer
// ============================================================
// The trained model maps a normalized scalar to an (L, 10)
// distribution. The predictor needs the opposite direction, so
// a query sequence is inverted by search over x ∈ [0, 1]:
//
//   1. encode the query with the shared Codec
//   2. score a uniform grid of GRID_POINTS scalars in batched
//      forward passes:  loss(x) = mean_i −log p(x)[i, digit_i]
//   3. refine around the best grid cell with golden-section
//      search (argmin), bracket = one grid step on each side
//   4. report round(x* · max), x*, decode(f(x*)) and loss(x*)
//
// The refined point is kept only if it beats the grid point.

use anyhow::{anyhow, Context, Result};
use argmin::{
    core::{CostFunction, Executor, State},
    solver::goldensectionsearch::GoldenSectionSearch,
};
use burn::{prelude::*, tensor::activation};

use crate::domain::{
    codec::{CategoricalTensor, Codec},
    pair::Inversion,
    sequence::{ScalarInput, SequenceConfig},
    traits::SequenceInverter,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{to_categorical, DigitModel};

const GRID_POINTS:   usize = 2049;
const GRID_BATCH:    usize = 512;
const REFINE_ITERS:  u64   = 60;
const REFINE_TOL:    f64   = 1e-7;

pub struct Inferencer<B: Backend> {
    model:    DigitModel<B>,
    sequence: SequenceConfig,
    codec:    Codec,
    device:   B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: DigitModel<B>, sequence: SequenceConfig, device: B::Device) -> Self {
        Self { codec: sequence.codec(), model, sequence, device }
    }

    /// Rebuild the model from train_config.json and load model.mpk.gz.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.model_config().init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from '{}' (L={})",
            ckpt_manager.dir().display(),
            cfg.sequence.capacity
        );
        Ok(Self::new(model, cfg.sequence, device))
    }

    /// Forward direction: the model's distribution for one scalar.
    pub fn predict_sequence(&self, input: ScalarInput) -> Result<CategoricalTensor> {
        let x = Tensor::<B, 1>::from_floats([input.value() as f32].as_slice(), &self.device)
            .reshape([1, 1]);
        to_categorical(self.model.forward_probabilities(x))?
            .into_iter()
            .next()
            .context("Model returned an empty batch")
    }

    /// Mean per-position cross-entropy of `target` at every point of `xs`.
    pub fn losses(&self, xs: &[f64], target: &[u8]) -> Result<Vec<f64>> {
        let seq_len = target.len();
        let mut out = Vec::with_capacity(xs.len());

        for chunk in xs.chunks(GRID_BATCH) {
            let n = chunk.len();
            let inputs: Vec<f32> = chunk.iter().map(|&x| x as f32).collect();
            let inputs = Tensor::<B, 1>::from_floats(inputs.as_slice(), &self.device)
                .reshape([n, 1]);

            let indices: Vec<i64> = target
                .iter()
                .map(|&d| d as i64)
                .cycle()
                .take(n * seq_len)
                .collect();
            let indices = Tensor::<B, 1, Int>::from_ints(indices.as_slice(), &self.device)
                .reshape([n, seq_len, 1]);

            let log_probs = activation::log_softmax(self.model.forward(inputs), 2);
            let nll = log_probs
                .gather(2, indices)
                .sum_dim(1)
                .reshape([n])
                .neg()
                .div_scalar(seq_len as f32);

            let values = nll
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;
            out.extend(values.into_iter().map(f64::from));
        }
        Ok(out)
    }

    fn grid_search(&self, target: &[u8]) -> Result<(f64, f64)> {
        let step = 1.0 / (GRID_POINTS - 1) as f64;
        let grid: Vec<f64> = (0..GRID_POINTS).map(|i| i as f64 * step).collect();
        let losses = self.losses(&grid, target)?;

        grid.into_iter()
            .zip(losses)
            .filter(|(_, loss)| loss.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .context("Every grid point produced a non-finite loss")
    }

    fn refine(&self, target: &[u8], x0: f64) -> Result<(f64, f64)> {
        let step = 1.0 / (GRID_POINTS - 1) as f64;
        let lo = (x0 - step).max(0.0);
        let hi = (x0 + step).min(1.0);

        let solver = GoldenSectionSearch::new(lo, hi)?.with_tolerance(REFINE_TOL)?;
        let res = Executor::new(InversionCost { inferencer: self, target }, solver)
            .configure(|state| state.param(x0).max_iters(REFINE_ITERS))
            .run()?;

        let state = res.state();
        let x = state.get_best_param().copied().unwrap_or(x0);
        Ok((x, state.get_best_cost()))
    }
}

impl<B: Backend> SequenceInverter for Inferencer<B> {
    fn capacity(&self) -> usize {
        self.sequence.capacity
    }

    fn invert(&self, digits: &str) -> Result<Inversion> {
        let target = self.codec.fit(digits)?;

        let (grid_x, grid_loss) = self.grid_search(&target)?;
        let (x, loss) = match self.refine(&target, grid_x) {
            Ok((x, loss)) if loss.is_finite() && loss < grid_loss => (x, loss),
            Ok(_) => (grid_x, grid_loss),
            Err(e) => {
                tracing::debug!("Refinement failed, keeping grid point: {e}");
                (grid_x, grid_loss)
            }
        };
        tracing::debug!("Inverted '{}': x={:.6e} loss={:.4} (grid {:.4})", digits, x, loss, grid_loss);

        let scalar = ScalarInput::from_normalized(x);
        let reconstruction = self.codec.decode(&self.predict_sequence(scalar)?);

        Ok(Inversion {
            input:      scalar.to_raw(&self.sequence),
            normalized: scalar.value(),
            reconstruction,
            loss,
        })
    }
}

// ─── Golden-section cost ──────────────────────────────────────────────────────
struct InversionCost<'a, B: Backend> {
    inferencer: &'a Inferencer<B>,
    target:     &'a [u8],
}

impl<B: Backend> CostFunction for InversionCost<'_, B> {
    type Param  = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let x = x.clamp(0.0, 1.0);
        self.inferencer
            .losses(&[x], self.target)?
            .first()
            .copied()
            .context("Empty loss batch")
    }
}
