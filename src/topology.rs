//! Network topology.
//!
//! A topology is the full layer-size sequence `[n0, n1, ..., nL]`, including the
//! input width `n0` and the output width `nL`. It is validated once at construction
//! and then fixed for the lifetime of every `Mlp` built from it.

use crate::{Error, Result};

/// Layer sizes used by the curve-fitting visualization this crate was built for.
pub const DEFAULT_LAYERS: [usize; 6] = [1, 12, 10, 8, 6, 1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    layers: Vec<usize>,
}

impl Topology {
    /// Validate and wrap a layer-size sequence.
    pub fn new(layers: impl Into<Vec<usize>>) -> Result<Self> {
        let layers = layers.into();
        if layers.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "topology must include input and output widths, got {} entries",
                layers.len()
            )));
        }
        if let Some(idx) = layers.iter().position(|&n| n == 0) {
            return Err(Error::InvalidConfig(format!(
                "all layer widths must be > 0, entry {idx} is 0"
            )));
        }
        Ok(Self { layers })
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Number of weight transitions (`L`).
    #[inline]
    pub fn num_transitions(&self) -> usize {
        self.layers.len() - 1
    }

    /// Iterator over `(fan_in, fan_out)` for each transition.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layers.windows(2).map(|w| (w[0], w[1]))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS.to_vec(),
        }
    }
}
