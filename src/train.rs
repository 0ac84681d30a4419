//! Training loop.
//!
//! `Trainer` owns a network and drives it through epochs of shuffled, per-example SGD.
//! It is controlled with `start` / `stop` / `reset` and advanced with
//! [`Steppable::tick`], so any driver (UI redraw hook, timer, tight loop) can pace it.
//!
//! Epoch procedure:
//! 1. shuffle the training set order
//! 2. split it into contiguous batches of `batch_size`
//! 3. run forward/backward/update on every example, one after another
//! 4. record the mean example loss and bump the epoch counter
//! 5. refresh the approximation curve if evaluation points were registered
//!
//! After each epoch the `StopPolicy` decides whether the run is finished.

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::curve::{self, ApproxPoint};
use crate::optim::validate_lr;
use crate::schedule::{self, StopHandle, Steppable, TickOutcome};
use crate::{Dataset, Error, Initializer, Mlp, Result, Scratch, Sgd, Topology, Workspace};

/// Loss reported before the first epoch completes.
pub const INITIAL_LOSS: f64 = 1.0;
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// The visualization trains on one out of every three redraw ticks.
pub const UI_TICKS_PER_EPOCH: u32 = 3;
/// Longer epoch ceiling for callers that want more room than `StopPolicy::default`
/// (1000 epochs).
pub const HARD_EPOCH_CEILING: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// When a run ends.
///
/// Checked after every epoch, in order: divergence, convergence, epoch ceiling.
pub struct StopPolicy {
    /// Converged once the epoch loss drops below this...
    pub loss_threshold: f64,
    /// ...and at least this many epochs have run.
    pub min_epochs: u64,
    /// Unconditional ceiling on the epoch counter.
    pub max_epochs: u64,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            loss_threshold: 1e-4,
            min_epochs: 300,
            max_epochs: 1000,
        }
    }
}

impl StopPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.loss_threshold.is_finite() && self.loss_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "loss_threshold must be finite and >= 0, got {}",
                self.loss_threshold
            )));
        }
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be > 0".to_owned()));
        }
        Ok(())
    }

    /// Decide whether a run with this `epoch` counter and latest `loss` is over.
    pub fn check(&self, epoch: u64, loss: f64) -> Option<StopReason> {
        if !loss.is_finite() {
            Some(StopReason::Diverged)
        } else if loss < self.loss_threshold && epoch >= self.min_epochs {
            Some(StopReason::Converged)
        } else if epoch >= self.max_epochs {
            Some(StopReason::EpochLimit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainConfig {
    /// Learning rate used until `start` or `set_learning_rate` replaces it.
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Run one epoch every `ticks_per_epoch` ticks (1 = every tick).
    pub ticks_per_epoch: u32,
    pub stop: StopPolicy,
    /// Seed for initialization and shuffling; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            batch_size: DEFAULT_BATCH_SIZE,
            ticks_per_epoch: 1,
            stop: StopPolicy::default(),
            seed: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        validate_lr(self.learning_rate)?;
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if self.ticks_per_epoch == 0 {
            return Err(Error::InvalidConfig(
                "ticks_per_epoch must be > 0".to_owned(),
            ));
        }
        self.stop.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Loss fell below the threshold after the minimum number of epochs.
    Converged,
    /// The epoch ceiling was reached.
    EpochLimit,
    /// The loss became NaN or infinite.
    Diverged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrainingStatus {
    Idle,
    Running,
    Finished(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpochReport {
    pub epoch: u64,
    pub loss: f64,
    /// Set when this epoch ended the run.
    pub stop: Option<StopReason>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitReport {
    pub epochs: u64,
    pub final_loss: f64,
    /// `None` if the run was stopped from outside before the policy ended it.
    pub stop: Option<StopReason>,
}

/// Owns a network and its training state.
///
/// The network is never shared mutably: readers get `&Mlp` through [`Trainer::params`]
/// or an owned copy through [`Trainer::snapshot`].
#[derive(Debug)]
pub struct Trainer {
    topology: Topology,
    init: Initializer,
    config: TrainConfig,
    rng: StdRng,

    mlp: Mlp,
    ws: Workspace,
    opt: Sgd,

    train: Option<Dataset>,
    order: Vec<usize>,

    eval: Option<Dataset>,
    eval_scratch: Scratch,
    curve: Vec<ApproxPoint>,

    epoch: u64,
    loss: f64,
    status: TrainingStatus,
    ticks: u64,
    stop_handle: StopHandle,
}

impl Trainer {
    /// Build a trainer with a freshly initialized network.
    pub fn new(topology: Topology, config: TrainConfig) -> Result<Self> {
        Self::with_initializer(topology, Initializer::default(), config)
    }

    pub fn with_initializer(
        topology: Topology,
        init: Initializer,
        config: TrainConfig,
    ) -> Result<Self> {
        config.validate()?;
        let opt = Sgd::new(config.learning_rate)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mlp = init.initialize(&topology, &mut rng);
        let ws = mlp.workspace();
        let eval_scratch = mlp.scratch();

        Ok(Self {
            topology,
            init,
            config,
            rng,
            mlp,
            ws,
            opt,
            train: None,
            order: Vec::new(),
            eval: None,
            eval_scratch,
            curve: Vec::new(),
            epoch: 0,
            loss: INITIAL_LOSS,
            status: TrainingStatus::Idle,
            ticks: 0,
            stop_handle: StopHandle::new(),
        })
    }

    /// Begin a run over `train` with learning rate `lr`.
    ///
    /// A no-op if a run is already in progress. Fails if `train` is empty, does not
    /// match the topology, or the network diverged and has not been reset.
    pub fn start(&mut self, train: Dataset, lr: f64) -> Result<()> {
        if self.status == TrainingStatus::Running {
            debug!("start ignored: already running");
            return Ok(());
        }
        if self.status == TrainingStatus::Finished(StopReason::Diverged) || !self.mlp.is_finite()
        {
            return Err(Error::InvalidState(
                "parameters diverged; call reset() before training again".to_owned(),
            ));
        }
        let opt = Sgd::new(lr)?;
        train.check_against(&self.topology)?;

        self.opt = opt;
        self.order.clear();
        self.order.extend(0..train.len());
        self.stop_handle.clear();
        self.ticks = 0;

        if self.epoch >= self.config.stop.max_epochs {
            info!(
                "epoch ceiling {} already reached; reset to train again",
                self.config.stop.max_epochs
            );
            self.train = Some(train);
            self.status = TrainingStatus::Finished(StopReason::EpochLimit);
            return Ok(());
        }

        info!(
            "training started: examples={} lr={lr} batch_size={} epoch={}",
            train.len(),
            self.config.batch_size,
            self.epoch
        );
        self.train = Some(train);
        self.status = TrainingStatus::Running;
        Ok(())
    }

    /// Force the trainer idle. Pending ticks become no-ops.
    pub fn stop(&mut self) {
        if self.status == TrainingStatus::Running {
            info!("training stopped: epoch={} loss={:.6}", self.epoch, self.loss);
            self.status = TrainingStatus::Idle;
        }
    }

    /// Stop, discard the network, and initialize a fresh one.
    pub fn reset(&mut self) {
        self.stop();
        self.stop_handle.clear();
        self.mlp = self.init.initialize(&self.topology, &mut self.rng);
        self.train = None;
        self.order.clear();
        self.epoch = 0;
        self.loss = INITIAL_LOSS;
        self.ticks = 0;
        self.status = TrainingStatus::Idle;
        self.refresh_curve();
        info!("network reset: topology={:?}", self.topology.layers());
    }

    /// Change the learning rate between runs.
    pub fn set_learning_rate(&mut self, lr: f64) -> Result<()> {
        if self.status == TrainingStatus::Running {
            return Err(Error::InvalidState(
                "learning rate can only change while not training".to_owned(),
            ));
        }
        self.opt = Sgd::new(lr)?;
        Ok(())
    }

    /// Register the fixed points the approximation curve is evaluated at.
    pub fn set_eval_points(&mut self, eval: Dataset) -> Result<()> {
        curve::check_scalar(&self.mlp, &eval)?;
        self.eval = Some(eval);
        self.refresh_curve();
        Ok(())
    }

    /// Start a run and tick it to completion.
    pub fn fit(&mut self, train: Dataset, lr: f64) -> Result<FitReport> {
        self.start(train, lr)?;
        schedule::drive(self, None);

        let stop = match self.status {
            TrainingStatus::Finished(reason) => Some(reason),
            TrainingStatus::Idle | TrainingStatus::Running => None,
        };
        Ok(FitReport {
            epochs: self.epoch,
            final_loss: self.loss,
            stop,
        })
    }

    /// Shape-checked inference with the current parameters.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.mlp.predict(input)
    }

    /// Evaluate the current network at `eval` without touching the stored curve.
    pub fn snapshot_approximation(&self, eval: &Dataset) -> Result<Vec<ApproxPoint>> {
        curve::approximate(&self.mlp, eval)
    }

    /// Latest approximation curve (empty until evaluation points are registered).
    #[inline]
    pub fn approximation(&self) -> &[ApproxPoint] {
        &self.curve
    }

    #[inline]
    pub fn current_epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn current_loss(&self) -> f64 {
        self.loss
    }

    #[inline]
    pub fn is_training(&self) -> bool {
        self.status == TrainingStatus::Running
    }

    #[inline]
    pub fn status(&self) -> TrainingStatus {
        self.status
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.opt.lr()
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    #[inline]
    pub fn params(&self) -> &Mlp {
        &self.mlp
    }

    /// Owned copy of the current parameters.
    pub fn snapshot(&self) -> Mlp {
        self.mlp.clone()
    }

    /// Handle for requesting a stop from another thread or a tick callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    fn run_epoch(&mut self) -> EpochReport {
        let Some(train) = self.train.as_ref() else {
            return EpochReport {
                epoch: self.epoch,
                loss: self.loss,
                stop: None,
            };
        };

        self.order.shuffle(&mut self.rng);

        let epoch = self.epoch + 1;
        let mut total = 0.0;
        for (batch_idx, batch) in self.order.chunks(self.config.batch_size).enumerate() {
            let mut batch_loss = 0.0;
            for &idx in batch {
                batch_loss += self.mlp.train_example(
                    train.input(idx),
                    train.target(idx),
                    &self.opt,
                    &mut self.ws,
                );
            }
            trace!(
                "epoch {epoch} batch {batch_idx}: loss={:.6}",
                batch_loss / batch.len() as f64
            );
            total += batch_loss;
        }

        self.loss = total / train.len() as f64;
        self.epoch = epoch;
        self.refresh_curve();
        debug!("epoch {epoch}: loss={:.6}", self.loss);

        EpochReport {
            epoch,
            loss: self.loss,
            stop: None,
        }
    }

    fn refresh_curve(&mut self) {
        match &self.eval {
            Some(eval) => {
                curve::approximate_into(&self.mlp, eval, &mut self.eval_scratch, &mut self.curve)
            }
            None => self.curve.clear(),
        }
    }

    fn finish(&mut self, reason: StopReason) {
        self.status = TrainingStatus::Finished(reason);
        match reason {
            StopReason::Diverged => warn!(
                "training diverged at epoch {}: loss={}; reset before training again",
                self.epoch, self.loss
            ),
            StopReason::Converged | StopReason::EpochLimit => info!(
                "training finished ({reason:?}): epoch={} loss={:.6}",
                self.epoch, self.loss
            ),
        }
    }
}

impl Steppable for Trainer {
    fn tick(&mut self) -> TickOutcome {
        if self.stop_handle.take() {
            self.stop();
        }
        if self.status != TrainingStatus::Running {
            return TickOutcome::Idle;
        }

        self.ticks += 1;
        if self.ticks % u64::from(self.config.ticks_per_epoch) != 0 {
            return TickOutcome::Paced;
        }

        let mut report = self.run_epoch();
        report.stop = self.config.stop.check(self.epoch, self.loss);
        if let Some(reason) = report.stop {
            self.finish(reason);
        }
        TickOutcome::Epoch(report)
    }

    fn is_active(&self) -> bool {
        self.is_training()
    }
}
