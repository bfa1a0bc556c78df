// ============================================================
// Layer 5 — Early Stopping with Best-Snapshot Restore
// ============================================================
// A small state machine the training loop consults once per
// epoch, after validation:
//
//   val_loss < best   → Improved: take a new snapshot, reset stall
//   otherwise         → Stalled: stall += 1
//   stall == patience → Stop: hand back the best snapshot
//
// A snapshot is never mutated in place. Each improvement replaces
// the whole Snapshot (epoch, loss, state), so restoring always
// yields exactly the parameters of the last improving epoch.
//
// The state type is generic; the trainer stores a burn model
// record, tests store plain values.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochVerdict {
    /// Validation loss strictly improved; a new snapshot was taken
    Improved,
    /// No improvement for `stalled_epochs` consecutive epochs
    Stalled { stalled_epochs: usize },
    /// Patience exhausted; restore the snapshot from `best_epoch`
    Stop { best_epoch: usize },
}

#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    pub epoch:    usize,
    pub val_loss: f64,
    pub state:    S,
}

#[derive(Debug)]
pub struct EarlyStopping<S> {
    patience: usize,
    stalled:  usize,
    best:     Option<Snapshot<S>>,
}

impl<S> EarlyStopping<S> {
    pub fn new(patience: usize) -> Self {
        Self { patience, stalled: 0, best: None }
    }

    /// Best validation loss so far, +inf before the first epoch.
    pub fn best_loss(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.val_loss)
    }

    pub fn best(&self) -> Option<&Snapshot<S>> {
        self.best.as_ref()
    }

    /// Record one epoch. `capture` runs only when the epoch improved.
    pub fn observe(&mut self, epoch: usize, val_loss: f64, capture: impl FnOnce() -> S) -> EpochVerdict {
        if val_loss < self.best_loss() {
            self.best = Some(Snapshot { epoch, val_loss, state: capture() });
            self.stalled = 0;
            return EpochVerdict::Improved;
        }

        self.stalled += 1;
        match &self.best {
            Some(best) if self.stalled >= self.patience => EpochVerdict::Stop { best_epoch: best.epoch },
            _ => EpochVerdict::Stalled { stalled_epochs: self.stalled },
        }
    }

    pub fn into_best(self) -> Option<Snapshot<S>> {
        self.best
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Feed losses until Stop; returns (stopped epoch, restored state).
    fn run(losses: &[f64], patience: usize) -> (usize, Option<Snapshot<String>>) {
        let mut stopper = EarlyStopping::new(patience);
        let mut last    = 0;
        for (i, &loss) in losses.iter().enumerate() {
            let epoch = i + 1;
            last = epoch;
            let verdict = stopper.observe(epoch, loss, || format!("weights@{epoch}"));
            if let EpochVerdict::Stop { .. } = verdict {
                break;
            }
        }
        (last, stopper.into_best())
    }

    #[test]
    fn test_three_improvements_then_five_stalls() {
        let losses = [1.0, 0.9, 0.8, 0.8, 0.85, 0.9, 0.81, 0.95, 0.1, 0.05];
        let (stopped, best) = run(&losses, 5);
        assert_eq!(stopped, 8);
        let best = best.unwrap();
        assert_eq!(best.epoch, 3);
        assert_eq!(best.state, "weights@3");
        assert_eq!(best.val_loss, 0.8);
    }

    #[test]
    fn test_equal_loss_is_not_an_improvement() {
        let mut stopper = EarlyStopping::new(5);
        assert_eq!(stopper.observe(1, 0.5, || 1), EpochVerdict::Improved);
        assert_eq!(stopper.observe(2, 0.5, || 2), EpochVerdict::Stalled { stalled_epochs: 1 });
        assert_eq!(stopper.best().unwrap().state, 1);
    }

    #[test]
    fn test_improvement_resets_stall_counter() {
        let losses = [1.0, 1.1, 1.2, 1.3, 1.4, 0.9, 1.0, 1.0, 1.0, 1.0];
        let (stopped, best) = run(&losses, 5);
        assert_eq!(stopped, 10);
        assert_eq!(best.unwrap().epoch, 6);
    }

    #[test]
    fn test_budget_exhausted_without_stop() {
        let losses = [3.0, 2.0, 1.0];
        let (stopped, best) = run(&losses, 5);
        assert_eq!(stopped, 3);
        assert_eq!(best.unwrap().epoch, 3);
    }

    #[test]
    fn test_capture_only_on_improvement() {
        let mut stopper = EarlyStopping::new(2);
        let mut captures = 0;
        for (epoch, loss) in [(1, 2.0), (2, 3.0), (3, 1.0)] {
            stopper.observe(epoch, loss, || { captures += 1; epoch });
        }
        assert_eq!(captures, 2);
    }

    #[test]
    fn test_nan_never_improves() {
        let mut stopper = EarlyStopping::<()>::new(1);
        assert_eq!(stopper.observe(1, f64::NAN, || ()), EpochVerdict::Stalled { stalled_epochs: 1 });
        assert!(stopper.into_best().is_none());
    }
}
