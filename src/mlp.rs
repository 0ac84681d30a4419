use crate::{Error, Layer, Result, Sgd, loss};

/// The network's parameter store: one `Layer` per transition of the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    layers: Vec<Layer>,
}

/// Reusable forward cache for `Mlp::forward`.
///
/// Records the pre-activations `Z[1..L]` and activations `A[1..L]` of the most recent
/// forward pass. The input `A[0]` is not copied; `backward` takes it again.
#[derive(Debug, Clone)]
pub struct Scratch {
    pre_activations: Vec<Vec<f64>>,
    layer_outputs: Vec<Vec<f64>>,
}

/// Parameter gradients for an `Mlp` (overwrite semantics).
///
/// Allocate once via `Mlp::gradients()` and reuse across training steps.
#[derive(Debug, Clone)]
pub struct Gradients {
    d_weights: Vec<Vec<f64>>,
    d_biases: Vec<Vec<f64>>,

    // Backprop intermediate: gradient w.r.t each layer output.
    // This includes the final layer output; the loss writes the output error into
    // the last entry so backprop can proceed uniformly layer-by-layer.
    d_layer_outputs: Vec<Vec<f64>>,

    d_input: Vec<f64>,
}

impl Mlp {
    /// Wrap already-built layers.
    ///
    /// Panics if `layers` is empty or adjacent layers disagree on their shared width.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        assert!(!layers.is_empty(), "mlp must have at least one layer");
        for (idx, pair) in layers.windows(2).enumerate() {
            assert_eq!(
                pair[0].out_dim(),
                pair[1].in_dim(),
                "layer {idx} out_dim {} does not match layer {} in_dim {}",
                pair[0].out_dim(),
                idx + 1,
                pair[1].in_dim()
            );
        }
        Self { layers }
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    /// Layer widths `[n0, n1, ..., nL]`.
    pub fn sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_dim())
            .chain(self.layers.iter().map(Layer::out_dim))
            .collect()
    }

    /// True if every weight and bias is finite.
    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .all(|l| l.weights().iter().chain(l.biases()).all(|v| v.is_finite()))
    }

    pub fn scratch(&self) -> Scratch {
        Scratch::new(self)
    }

    pub fn gradients(&self) -> Gradients {
        Gradients::new(self)
    }

    /// Convenience constructor: allocate all per-example training buffers.
    #[inline]
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self)
    }

    /// Shape-checked inference for a single sample.
    ///
    /// Allocates a fresh `Scratch`; runs the same code path as `forward`, so the
    /// result is bit-identical to the recording pass.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match model input_dim {}",
                input.len(),
                self.input_dim()
            )));
        }
        let mut scratch = self.scratch();
        Ok(self.forward(input, &mut scratch).to_vec())
    }

    /// Recording forward pass for a single sample.
    ///
    /// Writes pre-activations and activations into `scratch` and returns the final
    /// output slice.
    ///
    /// Shape contract:
    /// - `input.len() == self.input_dim()`
    /// - `scratch` must be built for this `Mlp` (same layer count and output sizes)
    pub fn forward<'a>(&self, input: &[f64], scratch: &'a mut Scratch) -> &'a [f64] {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim()
        );
        assert_eq!(
            scratch.layer_outputs.len(),
            self.layers.len(),
            "scratch has {} layer outputs, model has {} layers",
            scratch.layer_outputs.len(),
            self.layers.len()
        );

        for (idx, layer) in self.layers.iter().enumerate() {
            assert_eq!(
                scratch.layer_outputs[idx].len(),
                layer.out_dim(),
                "scratch layer {idx} output len {} does not match layer out_dim {}",
                scratch.layer_outputs[idx].len(),
                layer.out_dim()
            );

            let pre = &mut scratch.pre_activations[idx];
            if idx == 0 {
                layer.forward(input, pre, &mut scratch.layer_outputs[0]);
            } else {
                // Borrow the previous output immutably and the current output mutably.
                let (left, right) = scratch.layer_outputs.split_at_mut(idx);
                layer.forward(&left[idx - 1], pre, &mut right[0]);
            }
        }

        scratch.output()
    }

    /// Backward pass for a single sample.
    ///
    /// You must call `forward` first using the same `input` and `scratch`, and write
    /// the output error `dL/d(output)` into `grads.d_output_mut()`.
    ///
    /// Overwrite semantics: `grads` is overwritten with gradients for this sample.
    ///
    /// Returns dL/d(input).
    pub fn backward<'a>(
        &self,
        input: &[f64],
        scratch: &Scratch,
        grads: &'a mut Gradients,
    ) -> &'a [f64] {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim()
        );
        assert_eq!(
            scratch.layer_outputs.len(),
            self.layers.len(),
            "scratch has {} layer outputs, model has {} layers",
            scratch.layer_outputs.len(),
            self.layers.len()
        );
        assert_eq!(
            grads.d_weights.len(),
            self.layers.len(),
            "grads has {} d_weights entries, model has {} layers",
            grads.d_weights.len(),
            self.layers.len()
        );
        assert_eq!(
            grads.d_input.len(),
            self.input_dim(),
            "grads d_input len {} does not match model input_dim {}",
            grads.d_input.len(),
            self.input_dim()
        );

        for idx in (0..self.layers.len()).rev() {
            let layer = &self.layers[idx];

            let layer_input: &[f64] = if idx == 0 {
                input
            } else {
                &scratch.layer_outputs[idx - 1]
            };
            let pre = &scratch.pre_activations[idx];

            if idx == 0 {
                layer.backward(
                    layer_input,
                    pre,
                    &grads.d_layer_outputs[0],
                    &mut grads.d_input,
                    &mut grads.d_weights[0],
                    &mut grads.d_biases[0],
                );
            } else {
                // `d_outputs` of this layer is read-only; its `d_inputs` becomes the
                // `d_outputs` of the previous layer.
                let (left, right) = grads.d_layer_outputs.split_at_mut(idx);
                layer.backward(
                    layer_input,
                    pre,
                    &right[0],
                    &mut left[idx - 1],
                    &mut grads.d_weights[idx],
                    &mut grads.d_biases[idx],
                );
            }
        }

        &grads.d_input
    }

    /// Applies `param -= lr * grad` to every layer.
    #[inline]
    pub fn sgd_step(&mut self, grads: &Gradients, lr: f64) {
        assert!(
            lr.is_finite() && lr > 0.0,
            "learning rate must be finite and > 0"
        );
        assert_eq!(
            self.layers.len(),
            grads.d_weights.len(),
            "grads has {} d_weights entries, model has {} layers",
            grads.d_weights.len(),
            self.layers.len()
        );

        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.sgd_step(&grads.d_weights[i], &grads.d_biases[i], lr);
        }
    }

    /// One full training step on one example: forward, output error, backward, update.
    ///
    /// Returns the example's loss measured before the update.
    pub fn train_example(
        &mut self,
        input: &[f64],
        target: &[f64],
        opt: &Sgd,
        ws: &mut Workspace,
    ) -> f64 {
        self.forward(input, &mut ws.scratch);
        let loss = loss::mse_backward(ws.scratch.output(), target, ws.grads.d_output_mut());
        self.backward(input, &ws.scratch, &mut ws.grads);
        opt.step(self, &ws.grads);
        loss
    }
}

/// Reusable buffers for training a specific `Mlp`.
///
/// This is the ergonomic wrapper around `Scratch` + `Gradients`.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub scratch: Scratch,
    pub grads: Gradients,
}

impl Workspace {
    pub fn new(mlp: &Mlp) -> Self {
        Self {
            scratch: Scratch::new(mlp),
            grads: Gradients::new(mlp),
        }
    }
}

impl Scratch {
    pub fn new(mlp: &Mlp) -> Self {
        let pre_activations = mlp.layers.iter().map(|l| vec![0.0; l.out_dim()]).collect();
        let layer_outputs = mlp.layers.iter().map(|l| vec![0.0; l.out_dim()]).collect();
        Self {
            pre_activations,
            layer_outputs,
        }
    }

    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.layer_outputs[self.layer_outputs.len() - 1]
    }

    /// Activations `A[idx + 1]` recorded for transition `idx`.
    #[inline]
    pub fn activations(&self, idx: usize) -> &[f64] {
        &self.layer_outputs[idx]
    }

    /// Pre-activations `Z[idx + 1]` recorded for transition `idx`.
    #[inline]
    pub fn pre_activations(&self, idx: usize) -> &[f64] {
        &self.pre_activations[idx]
    }
}

impl Gradients {
    pub fn new(mlp: &Mlp) -> Self {
        let mut d_weights = Vec::with_capacity(mlp.layers.len());
        let mut d_biases = Vec::with_capacity(mlp.layers.len());
        let mut d_layer_outputs = Vec::with_capacity(mlp.layers.len());

        for layer in &mlp.layers {
            d_weights.push(vec![0.0; layer.in_dim() * layer.out_dim()]);
            d_biases.push(vec![0.0; layer.out_dim()]);
            d_layer_outputs.push(vec![0.0; layer.out_dim()]);
        }

        Self {
            d_weights,
            d_biases,
            d_layer_outputs,
            d_input: vec![0.0; mlp.input_dim()],
        }
    }

    /// Mutable view of the upstream gradient buffer for the final model output.
    #[inline]
    pub fn d_output_mut(&mut self) -> &mut [f64] {
        let last = self.d_layer_outputs.len() - 1;
        &mut self.d_layer_outputs[last]
    }

    #[inline]
    pub fn d_input(&self) -> &[f64] {
        &self.d_input
    }

    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> &[f64] {
        &self.d_weights[layer_idx]
    }

    /// Bias gradients of a layer; these are also the layer's deltas `dL/dz`.
    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> &[f64] {
        &self.d_biases[layer_idx]
    }
}
