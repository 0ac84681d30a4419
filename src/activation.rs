//! Activation functions.
//!
//! A dense layer computes a pre-activation value `z = W x + b` and then applies an
//! activation function element-wise: `a = activation(z)`.
//!
//! Hidden layers use SiLU (a.k.a. Swish), `silu(z) = z * sigmoid(z)`. The output
//! layer is the identity since the network is a regressor.
//!
//! Unlike `tanh` or `sigmoid`, the SiLU derivative cannot be recovered from the
//! post-activation output alone, so `Scratch` caches the pre-activations `z` and
//! backprop evaluates the derivative at `z`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation function.
pub enum Activation {
    /// `z * sigmoid(z)`, used by every hidden layer.
    Silu,
    /// Linear output layer.
    Identity,
}

impl Activation {
    #[inline]
    pub fn forward(self, z: f64) -> f64 {
        match self {
            Activation::Silu => silu(z),
            Activation::Identity => z,
        }
    }

    /// Derivative of the activation evaluated at the pre-activation `z`.
    #[inline]
    pub fn grad(self, z: f64) -> f64 {
        match self {
            Activation::Silu => silu_derivative(z),
            Activation::Identity => 1.0,
        }
    }
}

/// Logistic sigmoid `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// SiLU / Swish: `x * sigmoid(x)`.
#[inline]
pub fn silu(x: f64) -> f64 {
    x * sigmoid(x)
}

/// `d/dx silu(x) = s + x * s * (1 - s)` where `s = sigmoid(x)`.
#[inline]
pub fn silu_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s + x * s * (1.0 - s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_basic_values() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn sigmoid_is_finite_for_extreme_inputs() {
        assert_eq!(sigmoid(1e6), 1.0);
        assert_eq!(sigmoid(-1e6), 0.0);
        assert!(silu(-1e6).is_finite());
        assert!(silu_derivative(1e6).is_finite());
        assert!(silu_derivative(-1e6).is_finite());
    }

    #[test]
    fn silu_shape() {
        assert_eq!(silu(0.0), 0.0);
        // Approaches identity for large positive inputs and zero for large negative ones.
        assert!((silu(20.0) - 20.0).abs() < 1e-6);
        assert!(silu(-20.0).abs() < 1e-6);
        // Global minimum sits around x ~ -1.278.
        assert!(silu(-1.278) < silu(-1.0));
        assert!(silu(-1.278) < silu(-1.5));
    }

    #[test]
    fn silu_derivative_matches_finite_differences() {
        let eps = 1e-6;
        for &x in &[-4.0, -1.278, -0.3, 0.0, 0.7, 2.5, 6.0] {
            let numeric = (silu(x + eps) - silu(x - eps)) / (2.0 * eps);
            let analytic = silu_derivative(x);
            assert!(
                (numeric - analytic).abs() < 1e-8,
                "x={x} numeric={numeric} analytic={analytic}"
            );
        }
        assert!((silu_derivative(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn activation_dispatch() {
        assert_eq!(Activation::Identity.forward(-3.0), -3.0);
        assert_eq!(Activation::Identity.grad(123.0), 1.0);
        assert_eq!(Activation::Silu.forward(1.5), silu(1.5));
        assert_eq!(Activation::Silu.grad(1.5), silu_derivative(1.5));
    }
}
