//! Fit `y = sin(2x) + 0.3x` on `[-3, 3]` with the default 1-12-10-8-6-1 network.
//!
//! Run with `RUST_LOG=debug cargo run --example fit_curve` to see per-epoch losses, and
//! add `--features serde` to print the final curve as JSON.

use std::ops::ControlFlow;

use swish_mlp::train::UI_TICKS_PER_EPOCH;
use swish_mlp::{Dataset, TickOutcome, Topology, TrainConfig, Trainer, drive_with};

fn target(x: f64) -> f64 {
    (2.0 * x).sin() + 0.3 * x
}

fn sample(n: usize) -> swish_mlp::Result<Dataset> {
    let pairs: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let x = -3.0 + 6.0 * i as f64 / (n - 1) as f64;
            (x, target(x))
        })
        .collect();
    Dataset::from_scalar_pairs(&pairs)
}

fn main() -> swish_mlp::Result<()> {
    env_logger::init();

    let config = TrainConfig {
        ticks_per_epoch: UI_TICKS_PER_EPOCH,
        seed: Some(42),
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(Topology::default(), config)?;
    trainer.set_eval_points(sample(25)?)?;
    trainer.start(sample(80)?, 0.01)?;

    // Stand-in for a redraw loop: every tick is a frame, one in three trains.
    let summary = drive_with(&mut trainer, None, |outcome| {
        match outcome {
            TickOutcome::Epoch(report) if report.epoch.is_multiple_of(100) => {
                println!("epoch {:4}  loss {:.6}", report.epoch, report.loss);
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });

    println!(
        "frames={} epochs={} status={:?} loss={:.6}",
        summary.ticks,
        summary.epochs,
        trainer.status(),
        trainer.current_loss()
    );

    for p in trainer.approximation() {
        println!("x={:+.3}  target={:+.4}  approx={:+.4}", p.x, p.target, p.approx);
    }

    #[cfg(feature = "serde")]
    {
        let json = serde_json::to_string_pretty(trainer.approximation())
            .map_err(|e| swish_mlp::Error::InvalidData(e.to_string()))?;
        println!("{json}");
    }

    Ok(())
}
