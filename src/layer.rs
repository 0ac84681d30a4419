use crate::{Activation, Error, Result};

/// One dense transition `i -> i+1` of the network.
///
/// Weights are a row-major matrix with shape `(out_dim, in_dim)`: row `j` holds the
/// `in_dim` weights feeding output neuron `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    /// Build a layer from explicit parameters.
    ///
    /// Validates that `weights.len() == out_dim * in_dim`, `biases.len() == out_dim`
    /// and that every parameter is finite.
    pub fn from_parts(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidShape(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        let expected_w = in_dim
            .checked_mul(out_dim)
            .ok_or_else(|| Error::InvalidShape("layer weight shape overflow".to_owned()))?;
        if weights.len() != expected_w {
            return Err(Error::InvalidShape(format!(
                "weights length {} does not match out_dim * in_dim ({out_dim} * {in_dim})",
                weights.len()
            )));
        }
        if biases.len() != out_dim {
            return Err(Error::InvalidShape(format!(
                "biases length {} does not match out_dim {out_dim}",
                biases.len()
            )));
        }
        if weights.iter().chain(&biases).any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "layer parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            in_dim,
            out_dim,
            activation,
            weights,
            biases,
        })
    }

    /// Wrap freshly sampled parameters whose shapes are correct by construction.
    pub(crate) fn from_sampled(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(weights.len(), in_dim * out_dim);
        debug_assert_eq!(biases.len(), out_dim);
        Self {
            in_dim,
            out_dim,
            activation,
            weights,
            biases,
        }
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Weights feeding output neuron `j` (length `in_dim`).
    ///
    /// Panics if `j >= out_dim`.
    #[inline]
    pub fn row(&self, j: usize) -> &[f64] {
        let start = j * self.in_dim;
        &self.weights[start..start + self.in_dim]
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    /// Forward pass for a single sample.
    ///
    /// Computes:
    /// - `pre = W * inputs + b`
    /// - `outputs = activation(pre)`
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `pre.len() == outputs.len() == self.out_dim`
    #[inline]
    pub fn forward(&self, inputs: &[f64], pre: &mut [f64], outputs: &mut [f64]) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(pre.len(), self.out_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);

        for o in 0..self.out_dim {
            let mut sum = self.biases[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                sum += self.weights[row + i] * inputs[i];
            }
            pre[o] = sum;
            outputs[o] = self.activation.forward(sum);
        }
    }

    /// Backward pass for a single sample.
    ///
    /// This uses overwrite semantics:
    /// - `d_inputs` is overwritten (and internally zeroed before accumulation)
    /// - `d_weights` is overwritten
    /// - `d_biases` is overwritten, and holds this layer's deltas `dL/d(pre)`
    ///
    /// Inputs:
    /// - `inputs`: the same inputs passed to `forward`
    /// - `pre`: the pre-activations recorded by `forward`
    /// - `d_outputs`: upstream gradient dL/d(outputs)
    ///
    /// Shape contract:
    /// - `inputs.len() == d_inputs.len() == self.in_dim`
    /// - `pre.len() == d_outputs.len() == d_biases.len() == self.out_dim`
    /// - `d_weights.len() == self.weights.len()`
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn backward(
        &self,
        inputs: &[f64],
        pre: &[f64],
        d_outputs: &[f64],
        d_inputs: &mut [f64],
        d_weights: &mut [f64],
        d_biases: &mut [f64],
    ) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(pre.len(), self.out_dim);
        debug_assert_eq!(d_outputs.len(), self.out_dim);
        debug_assert_eq!(d_inputs.len(), self.in_dim);
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.out_dim);

        // d_inputs accumulates contributions from all outputs.
        d_inputs.fill(0.0);

        for o in 0..self.out_dim {
            let delta = d_outputs[o] * self.activation.grad(pre[o]);
            d_biases[o] = delta;

            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                d_weights[row + i] = delta * inputs[i];
                d_inputs[i] += self.weights[row + i] * delta;
            }
        }
    }

    /// `param -= lr * d_param` for every weight and bias.
    #[inline]
    pub fn sgd_step(&mut self, d_weights: &[f64], d_biases: &[f64], lr: f64) {
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.biases.len());

        for (w, &g) in self.weights.iter_mut().zip(d_weights) {
            *w -= lr * g;
        }
        for (b, &g) in self.biases.iter_mut().zip(d_biases) {
            *b -= lr * g;
        }
    }
}
