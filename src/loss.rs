//! Loss functions.
//!
//! These are small, allocation-free helpers intended to be used like:
//!
//! - run `model.forward(...)`
//! - compute `d_output` via `mse_backward`
//! - run `model.backward(...)`
//! - update parameters with `Sgd`
//!
//! Scale convention: the reported loss is the plain mean of squared errors, while the
//! gradient written by `mse_backward` is `pred - target`, i.e. the derivative of
//! `0.5 * sum((pred - target)^2)`. For a single output unit the two differ by the
//! usual constant factor and the learning rate absorbs it.

/// Mean squared error: `mean((pred - target)^2)`.
#[inline]
pub fn mse(pred: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    if pred.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = pred
        .iter()
        .zip(target)
        .map(|(&p, &t)| (p - t) * (p - t))
        .sum();
    sum_sq / pred.len() as f64
}

/// `0.5 * sum((pred - target)^2)`: the objective whose gradient `mse_backward` writes.
#[inline]
pub fn half_sse(pred: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    0.5 * pred
        .iter()
        .zip(target)
        .map(|(&p, &t)| (p - t) * (p - t))
        .sum::<f64>()
}

/// MSE loss + output error.
///
/// Writes `d_pred[i] = pred[i] - target[i]` and returns `mse(pred, target)`.
#[inline]
pub fn mse_backward(pred: &[f64], target: &[f64], d_pred: &mut [f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );
    assert_eq!(
        pred.len(),
        d_pred.len(),
        "pred len {} does not match d_pred len {}",
        pred.len(),
        d_pred.len()
    );

    if pred.is_empty() {
        return 0.0;
    }

    let mut sum_sq = 0.0;
    for i in 0..pred.len() {
        let diff = pred[i] - target[i];
        d_pred[i] = diff;
        sum_sq += diff * diff;
    }
    sum_sq / pred.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_is_zero_when_equal() {
        assert_eq!(mse(&[1.0, -2.0], &[1.0, -2.0]), 0.0);
        assert_eq!(mse(&[], &[]), 0.0);
    }

    #[test]
    fn mse_is_mean_of_squares() {
        assert_eq!(mse(&[1.0, 3.0], &[0.0, 0.0]), 5.0);
        assert_eq!(half_sse(&[1.0, 3.0], &[0.0, 0.0]), 5.0);
    }

    #[test]
    fn mse_backward_matches_expected_gradient() {
        let pred = [0.5, -1.0];
        let target = [1.0, 1.0];
        let mut d = [0.0; 2];
        let loss = mse_backward(&pred, &target, &mut d);

        assert_eq!(d, [-0.5, -2.0]);
        assert_eq!(loss, mse(&pred, &target));
    }

    #[test]
    #[should_panic]
    fn mse_panics_on_length_mismatch() {
        mse(&[1.0], &[1.0, 2.0]);
    }
}
