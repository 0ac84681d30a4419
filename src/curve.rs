//! Approximation curve.
//!
//! For plotting, the trainer re-evaluates the network over a fixed set of
//! one-dimensional evaluation points after every epoch. Each point pairs the
//! target value with the network's current approximation.

use crate::{Dataset, Error, Mlp, Result, Scratch};

/// One sample of the approximation curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApproxPoint {
    pub x: f64,
    pub target: f64,
    pub approx: f64,
}

impl ApproxPoint {
    #[inline]
    pub fn error(&self) -> f64 {
        self.approx - self.target
    }
}

/// Evaluate `mlp` at every point of `eval`.
///
/// Requires a scalar network (`input_dim == output_dim == 1`) and a matching dataset.
pub fn approximate(mlp: &Mlp, eval: &Dataset) -> Result<Vec<ApproxPoint>> {
    check_scalar(mlp, eval)?;
    let mut scratch = mlp.scratch();
    let mut out = Vec::with_capacity(eval.len());
    approximate_into(mlp, eval, &mut scratch, &mut out);
    Ok(out)
}

/// Refill `out` without reallocating once it has grown to `eval.len()`.
pub(crate) fn approximate_into(
    mlp: &Mlp,
    eval: &Dataset,
    scratch: &mut Scratch,
    out: &mut Vec<ApproxPoint>,
) {
    out.clear();
    for (x, y) in eval.iter() {
        let approx = mlp.forward(x, scratch)[0];
        out.push(ApproxPoint {
            x: x[0],
            target: y[0],
            approx,
        });
    }
}

pub(crate) fn check_scalar(mlp: &Mlp, eval: &Dataset) -> Result<()> {
    if mlp.input_dim() != 1 || mlp.output_dim() != 1 {
        return Err(Error::InvalidConfig(format!(
            "approximation curves need a 1 -> 1 network, got {} -> {}",
            mlp.input_dim(),
            mlp.output_dim()
        )));
    }
    if eval.input_dim() != 1 || eval.target_dim() != 1 {
        return Err(Error::InvalidData(format!(
            "evaluation points must be scalar pairs, got widths {} and {}",
            eval.input_dim(),
            eval.target_dim()
        )));
    }
    Ok(())
}

/// Mean squared error of a curve against its targets.
pub fn curve_mse(points: &[ApproxPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.error() * p.error()).sum::<f64>() / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, Initializer, Layer, Topology};

    fn line(w: f64, b: f64) -> Mlp {
        Mlp::from_layers(vec![
            Layer::from_parts(1, 1, Activation::Identity, vec![w], vec![b]).unwrap(),
        ])
    }

    #[test]
    fn pairs_targets_with_predictions() {
        let mlp = line(2.0, 1.0);
        let eval = Dataset::from_scalar_pairs(&[(0.0, 1.0), (1.0, 2.0), (2.0, 5.0)]).unwrap();
        let curve = approximate(&mlp, &eval).unwrap();

        assert_eq!(
            curve,
            vec![
                ApproxPoint { x: 0.0, target: 1.0, approx: 1.0 },
                ApproxPoint { x: 1.0, target: 2.0, approx: 3.0 },
                ApproxPoint { x: 2.0, target: 5.0, approx: 5.0 },
            ]
        );
        assert!((curve_mse(&curve) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_scalar_networks() {
        let topology = Topology::new([2, 3, 1]).unwrap();
        let mlp = Initializer::default().initialize_with_seed(&topology, 0);
        let eval = Dataset::from_scalar_pairs(&[(0.0, 0.0)]).unwrap();
        assert!(approximate(&mlp, &eval).is_err());

        let wide = Dataset::from_flat(vec![0.0, 1.0], vec![0.0], 2, 1).unwrap();
        assert!(approximate(&line(1.0, 0.0), &wide).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn points_serialize_as_plain_objects() {
        let p = ApproxPoint {
            x: 0.5,
            target: 1.0,
            approx: 0.75,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":0.5,"target":1.0,"approx":0.75}"#);
    }
}
