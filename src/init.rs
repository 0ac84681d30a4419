//! Parameter initialization.
//!
//! `Initializer` produces a fresh `Mlp` for a `Topology`:
//!
//! - weights of transition `i` are drawn from `U[-s, s]` with
//!   `s = sqrt(1 / (fan_in + fan_out))` (Xavier/Glorot)
//! - biases are drawn from `U[-bias_range, bias_range]`
//! - hidden transitions use SiLU, the final transition is linear

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Layer, Mlp, Result, Topology};

/// Default half-width of the bias distribution.
pub const DEFAULT_BIAS_RANGE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Initializer {
    bias_range: f64,
}

impl Default for Initializer {
    fn default() -> Self {
        Self {
            bias_range: DEFAULT_BIAS_RANGE,
        }
    }
}

impl Initializer {
    /// Biases will be sampled from `[-bias_range, bias_range]`.
    ///
    /// `bias_range` must be finite and `>= 0`; `0` yields zero biases.
    pub fn new(bias_range: f64) -> Result<Self> {
        if !(bias_range.is_finite() && bias_range >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "bias_range must be finite and >= 0, got {bias_range}"
            )));
        }
        Ok(Self { bias_range })
    }

    #[inline]
    pub fn bias_range(&self) -> f64 {
        self.bias_range
    }

    /// Xavier bound for a transition with the given fan-in and fan-out.
    #[inline]
    pub fn weight_bound(fan_in: usize, fan_out: usize) -> f64 {
        (1.0 / (fan_in + fan_out) as f64).sqrt()
    }

    /// Build a fresh network using a deterministic seed.
    pub fn initialize_with_seed(&self, topology: &Topology, seed: u64) -> Mlp {
        let mut rng = StdRng::seed_from_u64(seed);
        self.initialize(topology, &mut rng)
    }

    /// Build a fresh network using the provided RNG.
    pub fn initialize<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> Mlp {
        let last = topology.num_transitions() - 1;
        let mut layers = Vec::with_capacity(topology.num_transitions());
        for (idx, (fan_in, fan_out)) in topology.transitions().enumerate() {
            let activation = if idx == last {
                Activation::Identity
            } else {
                Activation::Silu
            };
            layers.push(self.init_layer(fan_in, fan_out, activation, rng));
        }

        Mlp::from_layers(layers)
    }

    fn init_layer<R: Rng + ?Sized>(
        &self,
        fan_in: usize,
        fan_out: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Layer {
        let bound = Self::weight_bound(fan_in, fan_out);
        let w_dist = Uniform::new_inclusive(-bound, bound);
        let weights = (0..fan_in * fan_out).map(|_| w_dist.sample(rng)).collect();

        let biases = if self.bias_range > 0.0 {
            let b_dist = Uniform::new_inclusive(-self.bias_range, self.bias_range);
            (0..fan_out).map(|_| b_dist.sample(rng)).collect()
        } else {
            vec![0.0; fan_out]
        };

        Layer::from_sampled(fan_in, fan_out, activation, weights, biases)
    }
}
