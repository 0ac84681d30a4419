//! Contiguous dataset storage.
//!
//! The training loop operates on slices to avoid per-step allocations. `Dataset`
//! provides validated, row-major storage for `(x, y)` pairs. It is used both for the
//! training set and for the fixed evaluation points of the approximation curve.

use crate::{Error, Result, Topology};

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<f64>,
    targets: Vec<f64>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if target_dim == 0 {
            return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
        }
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {input_dim}",
                inputs.len()
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({len} * {target_dim})",
                targets.len()
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        Self::from_pairs(inputs.iter().zip(targets))
    }

    /// Build a dataset from `(x, y)` pairs.
    ///
    /// Every `x` must have the width of the first `x`, and likewise for `y`; the
    /// error names the first offending example.
    pub fn from_pairs<'a, I, X, Y>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a X, &'a Y)>,
        X: AsRef<[f64]> + ?Sized + 'a,
        Y: AsRef<[f64]> + ?Sized + 'a,
    {
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        let mut dims: Option<(usize, usize)> = None;
        let mut len = 0;

        for (idx, (x, y)) in pairs.into_iter().enumerate() {
            let (x, y) = (x.as_ref(), y.as_ref());
            let (input_dim, target_dim) = *dims.get_or_insert((x.len(), y.len()));
            if x.len() != input_dim {
                return Err(Error::InvalidData(format!(
                    "example {idx} input has len {}, expected {input_dim}",
                    x.len()
                )));
            }
            if y.len() != target_dim {
                return Err(Error::InvalidData(format!(
                    "example {idx} target has len {}, expected {target_dim}",
                    y.len()
                )));
            }
            inputs.extend_from_slice(x);
            targets.extend_from_slice(y);
            len += 1;
        }

        let Some((input_dim, target_dim)) = dims else {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        };
        if input_dim == 0 || target_dim == 0 {
            return Err(Error::InvalidData(
                "examples must have non-empty inputs and targets".to_owned(),
            ));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a one-dimensional dataset `(x, f(x))` from scalar pairs.
    pub fn from_scalar_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let inputs = pairs.iter().map(|&(x, _)| x).collect();
        let targets = pairs.iter().map(|&(_, y)| y).collect();
        Self::from_flat(inputs, targets, 1, 1)
    }

    /// Check that this dataset can be fed to a network with `topology`.
    ///
    /// Rejects empty datasets, width mismatches and non-finite values. Errors name the
    /// first offending example.
    pub fn check_against(&self, topology: &Topology) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if self.input_dim != topology.input_dim() {
            return Err(Error::InvalidData(format!(
                "example 0 input has len {}, topology expects {}",
                self.input_dim,
                topology.input_dim()
            )));
        }
        if self.target_dim != topology.output_dim() {
            return Err(Error::InvalidData(format!(
                "example 0 target has len {}, topology expects {}",
                self.target_dim,
                topology.output_dim()
            )));
        }
        for idx in 0..self.len {
            if self.input(idx).iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidData(format!(
                    "example {idx} input contains a non-finite value"
                )));
            }
            if self.target(idx).iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidData(format!(
                    "example {idx} target contains a non-finite value"
                )));
            }
        }
        Ok(())
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }

    /// Iterate over `(input, target)` rows in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        (0..self.len).map(|idx| (self.input(idx), self.target(idx)))
    }
}
