use std::thread;
use std::time::Duration;

use swish_mlp::train::{HARD_EPOCH_CEILING, INITIAL_LOSS};
use swish_mlp::{
    Dataset, Error, Initializer, StopPolicy, StopReason, Steppable, TickOutcome, Topology,
    TrainConfig, Trainer, TrainingStatus, drive,
};

fn identity_data() -> Dataset {
    Dataset::from_scalar_pairs(&[(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)]).unwrap()
}

fn sine_data(n: usize) -> Dataset {
    let pairs: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let x = -3.0 + 6.0 * i as f64 / (n - 1) as f64;
            (x, x.sin())
        })
        .collect();
    Dataset::from_scalar_pairs(&pairs).unwrap()
}

fn trainer(sizes: &[usize], seed: u64, stop: StopPolicy) -> Trainer {
    let config = TrainConfig {
        seed: Some(seed),
        stop,
        ..TrainConfig::default()
    };
    Trainer::new(Topology::new(sizes.to_vec()).unwrap(), config).unwrap()
}

fn assert_within_init_bounds(t: &Trainer) {
    let init = Initializer::default();
    for (layer, (fan_in, fan_out)) in t.params().layers().iter().zip(t.topology().transitions()) {
        let bound = Initializer::weight_bound(fan_in, fan_out);
        assert!(layer.weights().iter().all(|w| w.abs() <= bound));
        assert!(layer.biases().iter().all(|b| b.abs() <= init.bias_range()));
    }
}

#[test]
fn learns_the_identity_function() {
    let stop = StopPolicy {
        max_epochs: HARD_EPOCH_CEILING,
        ..StopPolicy::default()
    };
    let mut t = trainer(&[1, 4, 1], 0, stop);

    let report = t.fit(identity_data(), 0.05).unwrap();

    assert!(report.epochs <= HARD_EPOCH_CEILING);
    assert!(
        report.final_loss < 0.01,
        "final loss {} after {} epochs",
        report.final_loss,
        report.epochs
    );
    assert!(matches!(
        report.stop,
        Some(StopReason::Converged | StopReason::EpochLimit)
    ));

    let y = t.forward(&[0.5]).unwrap()[0];
    assert!((y - 0.5).abs() < 0.2, "f(0.5) = {y}");
}

#[test]
fn epoch_counter_is_monotonic() {
    let mut t = trainer(&[1, 8, 1], 1, StopPolicy::default());
    t.start(sine_data(25), 0.01).unwrap();

    let mut last = t.current_epoch();
    for n in 1..=50 {
        t.tick();
        let epoch = t.current_epoch();
        assert!(epoch >= last);
        assert_eq!(epoch, n);
        last = epoch;
    }
}

#[test]
fn stop_cancels_pending_ticks() {
    let mut t = trainer(&[1, 4, 1], 2, StopPolicy::default());
    t.start(identity_data(), 0.05).unwrap();
    t.stop();

    let before = t.snapshot();
    let summary = drive(&mut t, Some(100));
    assert_eq!(summary.epochs, 0);
    for _ in 0..10 {
        assert_eq!(t.tick(), TickOutcome::Idle);
    }
    assert_eq!(t.current_epoch(), 0);
    assert_eq!(t.params(), &before);
    assert!(!t.is_training());
}

#[test]
fn reset_restores_initial_state() {
    let mut t = trainer(&[1, 12, 10, 8, 6, 1], 3, StopPolicy::default());
    let eval = sine_data(9);
    t.set_eval_points(eval.clone()).unwrap();
    let untrained = t.approximation().to_vec();

    t.start(sine_data(40), 0.05).unwrap();
    drive(&mut t, Some(20));
    assert_eq!(t.current_epoch(), 20);
    assert_ne!(t.approximation(), untrained.as_slice());

    // Reset while running forces a stop first.
    assert!(t.is_training());
    t.reset();

    assert_eq!(t.status(), TrainingStatus::Idle);
    assert_eq!(t.current_epoch(), 0);
    assert_eq!(t.current_loss(), INITIAL_LOSS);
    assert_within_init_bounds(&t);
    assert_eq!(t.tick(), TickOutcome::Idle);

    // The curve is regenerated from the fresh parameters.
    assert_eq!(t.approximation(), t.snapshot_approximation(&eval).unwrap());
}

#[test]
fn rejects_mismatched_examples() {
    let mut t = trainer(&[1, 4, 1], 4, StopPolicy::default());

    let two_outputs = Dataset::from_flat(vec![0.0, 1.0], vec![0.0, 0.0, 1.0, 1.0], 1, 2).unwrap();
    let err = t.start(two_outputs, 0.05).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
    assert!(format!("{err}").contains("target"));

    let xs = vec![vec![0.0], vec![1.0], vec![2.0, 3.0]];
    let ys = vec![vec![0.0], vec![1.0], vec![2.0]];
    let err = Dataset::from_rows(&xs, &ys).unwrap_err();
    assert!(format!("{err}").contains("example 2"));

    assert!(!t.is_training());
    assert_eq!(t.current_epoch(), 0);
}

#[test]
fn topology_errors_fail_fast() {
    assert!(matches!(Topology::new([4]), Err(Error::InvalidConfig(_))));
    assert!(matches!(
        Topology::new(Vec::new()),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn divergence_is_reported_and_blocks_restart() {
    let mut t = trainer(&[1, 4, 1], 5, StopPolicy::default());
    let report = t.fit(identity_data(), 1e6).unwrap();

    assert_eq!(report.stop, Some(StopReason::Diverged));
    assert_eq!(t.status(), TrainingStatus::Finished(StopReason::Diverged));
    assert!(!t.current_loss().is_finite());
    assert!(report.epochs < StopPolicy::default().max_epochs);

    assert!(matches!(
        t.start(identity_data(), 0.05),
        Err(Error::InvalidState(_))
    ));

    t.reset();
    t.start(identity_data(), 0.05).unwrap();
    assert!(matches!(t.tick(), TickOutcome::Epoch(r) if r.loss.is_finite()));
}

#[test]
fn stop_handle_works_across_threads() {
    let stop = StopPolicy {
        loss_threshold: 0.0,
        min_epochs: 0,
        max_epochs: u64::MAX,
    };
    let mut t = trainer(&[1, 8, 1], 6, stop);
    t.start(sine_data(50), 0.01).unwrap();
    let handle = t.stop_handle();

    let worker = thread::spawn(move || {
        drive(&mut t, None);
        t
    });

    thread::sleep(Duration::from_millis(20));
    handle.stop();
    let mut t = worker.join().unwrap();

    assert_eq!(t.status(), TrainingStatus::Idle);
    let epoch = t.current_epoch();
    t.tick();
    assert_eq!(t.current_epoch(), epoch);
}

#[test]
fn default_network_makes_progress_on_a_curve() {
    let mut t = trainer(&[1, 12, 10, 8, 6, 1], 7, StopPolicy::default());
    let eval = sine_data(30);
    t.set_eval_points(eval).unwrap();
    let before = swish_mlp::curve::curve_mse(t.approximation());

    t.start(sine_data(60), 0.01).unwrap();
    drive(&mut t, Some(200));
    let after = swish_mlp::curve::curve_mse(t.approximation());

    assert!(after < before, "curve mse went from {before} to {after}");
    assert!(t.current_loss() < INITIAL_LOSS);
}
