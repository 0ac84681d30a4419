//! A small SiLU MLP regressor with a steppable training loop.
//!
//! `swish-mlp` is a from-scratch implementation of a dense feed-forward network that
//! learns a one-dimensional function: hidden layers use SiLU (`x * sigmoid(x)`), the
//! output layer is linear, and training is per-example SGD over shuffled mini-batches.
//! There is no tensor or autodiff dependency; forward and backward passes are written
//! out by hand.
//!
//! # Design goals
//!
//! - Predictable performance: reuse buffers (`Scratch` / `Gradients`) instead of allocating.
//! - Clear contracts: shapes are explicit and validated at the API boundary.
//! - Interactive training: a `Trainer` is started, stopped and reset by its owner and
//!   advanced one tick at a time, so a UI can animate it without threads.
//!
//! # Panics vs `Result`
//!
//! - Low-level hot path (panics on misuse):
//!   - [`mlp::Mlp::forward`], [`mlp::Mlp::backward`], [`mlp::Mlp::sgd_step`]
//!     Shape mismatches are treated as programmer error and will panic via `assert!`.
//!
//! - High-level APIs (shape-checked):
//!   - [`Topology::new`], [`Dataset`] constructors, [`Mlp::predict`]
//!   - [`Trainer::start`], [`Trainer::fit`], [`Trainer::snapshot_approximation`]
//!     These validate inputs and return [`Result`].
//!
//! # Data layout
//!
//! - Scalars are `f64`.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//! - Layer weights are row-major with shape `(out_dim, in_dim)`.
//!
//! # Quick start
//!
//! ```rust
//! use swish_mlp::{Dataset, StopReason, Topology, TrainConfig, Trainer};
//!
//! # fn main() -> swish_mlp::Result<()> {
//! let train = Dataset::from_scalar_pairs(&[(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)])?;
//!
//! let config = TrainConfig {
//!     seed: Some(0),
//!     ..TrainConfig::default()
//! };
//! let mut trainer = Trainer::new(Topology::new([1, 4, 1])?, config)?;
//!
//! let report = trainer.fit(train, 0.05)?;
//! assert!(matches!(
//!     report.stop,
//!     Some(StopReason::Converged | StopReason::EpochLimit)
//! ));
//! let y = trainer.forward(&[0.5])?;
//! assert_eq!(y.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving training from an event loop
//!
//! ```rust
//! use std::ops::ControlFlow;
//!
//! use swish_mlp::{Dataset, Steppable, TickOutcome, Topology, TrainConfig, Trainer, drive_with};
//!
//! # fn main() -> swish_mlp::Result<()> {
//! let train = Dataset::from_scalar_pairs(&[(0.0, 0.0), (1.0, 0.5)])?;
//! let mut trainer = Trainer::new(Topology::new([1, 3, 1])?, TrainConfig::default())?;
//! trainer.start(train, 0.05)?;
//!
//! // A redraw hook would call `tick()` once per frame; here we stop after 10 epochs.
//! drive_with(&mut trainer, None, |outcome| match outcome {
//!     TickOutcome::Epoch(report) if report.epoch >= 10 => ControlFlow::Break(()),
//!     _ => ControlFlow::Continue(()),
//! });
//! trainer.stop();
//! assert_eq!(trainer.tick(), TickOutcome::Idle);
//! assert_eq!(trainer.current_epoch(), 10);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod curve;
pub mod data;
pub mod error;
pub mod init;
pub mod layer;
pub mod loss;
pub mod mlp;
pub mod optim;
pub mod schedule;
pub mod topology;
pub mod train;

pub use activation::Activation;
pub use curve::ApproxPoint;
pub use data::Dataset;
pub use error::{Error, Result};
pub use init::Initializer;
pub use layer::Layer;
pub use mlp::{Gradients, Mlp, Scratch, Workspace};
pub use optim::Sgd;
pub use schedule::{DriveSummary, StopHandle, Steppable, TickOutcome, drive, drive_with};
pub use topology::Topology;
pub use train::{
    EpochReport, FitReport, StopPolicy, StopReason, TrainConfig, Trainer, TrainingStatus,
};

/// Initialize a network for `topology` with the default Xavier scheme.
///
/// Thin wrapper around [`Initializer::initialize_with_seed`].
pub fn initialize(topology: &Topology, seed: u64) -> Mlp {
    Initializer::default().initialize_with_seed(topology, seed)
}
