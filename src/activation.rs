//! Activation functions.
//!
//! A dense layer computes a pre-activation value `z = W x + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! Post-activation outputs `y` are cached in `Scratch`, and backprop recovers `dL/dz`
//! from `dL/dy` using `y` alone. For ReLU that works because `y > 0` exactly when `z > 0`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation function.
pub enum Activation {
    /// Rectified linear: negative values become zero, the rest pass through.
    ReLU,
    Identity,
}

impl Activation {
    #[inline]
    pub(crate) fn forward(self, x: f32) -> f32 {
        match self {
            // NaN passes through.
            Activation::ReLU => {
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
            Activation::Identity => x,
        }
    }

    /// Apply the activation in place over a whole buffer.
    #[inline]
    pub(crate) fn forward_in_place(self, xs: &mut [f32]) {
        if self == Activation::Identity {
            return;
        }
        for x in xs {
            *x = self.forward(*x);
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the cached post-activation output `y`.
    #[inline]
    pub(crate) fn grad_from_output(self, y: f32) -> f32 {
        match self {
            Activation::ReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Identity => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_zeroes_negatives_and_passes_positives() {
        assert_eq!(Activation::ReLU.forward(-2.0), 0.0);
        assert_eq!(Activation::ReLU.forward(0.0), 0.0);
        assert_eq!(Activation::ReLU.forward(3.0), 3.0);

        assert_eq!(Activation::ReLU.grad_from_output(0.0), 0.0);
        assert_eq!(Activation::ReLU.grad_from_output(1.5), 1.0);
    }

    #[test]
    fn relu_propagates_nan() {
        assert!(Activation::ReLU.forward(f32::NAN).is_nan());

        let mut xs = [f32::NAN, -1.0, f32::INFINITY];
        Activation::ReLU.forward_in_place(&mut xs);
        assert!(xs[0].is_nan());
        assert_eq!(xs[1], 0.0);
        assert_eq!(xs[2], f32::INFINITY);
    }

    #[test]
    fn identity_is_a_no_op() {
        let mut xs = [-1.0_f32, 0.0, 2.5];
        Activation::Identity.forward_in_place(&mut xs);
        assert_eq!(xs, [-1.0, 0.0, 2.5]);
        assert_eq!(Activation::Identity.grad_from_output(-7.0), 1.0);
    }

    #[test]
    fn relu_in_place_never_leaves_negatives() {
        let mut xs = [-3.0_f32, -0.0, 0.25, -1e-9, 4.0];
        Activation::ReLU.forward_in_place(&mut xs);
        assert!(xs.iter().all(|&x| x >= 0.0));
        assert_eq!(xs[2], 0.25);
        assert_eq!(xs[4], 4.0);
    }
}
