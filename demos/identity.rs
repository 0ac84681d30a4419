//! Learn `y = x` from three points, then walk through stop / restart / reset.

use swish_mlp::{Dataset, Steppable, Topology, TrainConfig, Trainer, drive};

fn main() -> swish_mlp::Result<()> {
    env_logger::init();

    let train = Dataset::from_scalar_pairs(&[(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)])?;
    let config = TrainConfig {
        seed: Some(0),
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(Topology::new([1, 4, 1])?, config)?;

    trainer.start(train.clone(), 0.05)?;
    drive(&mut trainer, Some(100));
    trainer.stop();
    println!(
        "paused at epoch {} with loss {:.6}",
        trainer.current_epoch(),
        trainer.current_loss()
    );

    // Pending ticks after a stop do nothing.
    trainer.tick();
    println!("still at epoch {}", trainer.current_epoch());

    // Resuming keeps the parameters and the epoch counter.
    trainer.start(train.clone(), 0.05)?;
    drive(&mut trainer, None);
    println!(
        "finished: {:?} at epoch {} with loss {:.6}",
        trainer.status(),
        trainer.current_epoch(),
        trainer.current_loss()
    );
    for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        println!("f({x:+.1}) = {:+.4}", trainer.forward(&[x])?[0]);
    }

    trainer.reset();
    println!(
        "after reset: epoch {} loss {}",
        trainer.current_epoch(),
        trainer.current_loss()
    );

    Ok(())
}
