//! Model builder.
//!
//! `MlpBuilder` makes model structure explicit (layer sizes + activations). Every layer
//! gets the fan-in uniform initialization of [`Layer::new_with_rng`].
//!
//! The resulting `Mlp` still supports the low-level, allocation-free hot path:
//! reuse `Scratch` / `Gradients` for per-sample forward/backward.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Layer, Mlp, Result};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    out_dim: usize,
    activation: Activation,
}

#[derive(Debug, Clone)]
/// Builder for an `Mlp`.
///
/// Example:
///
/// ```rust
/// use circuit_designer::{Activation, MlpBuilder};
///
/// # fn main() -> circuit_designer::Result<()> {
/// let mlp = MlpBuilder::new(5)?
///     .add_layer(10, Activation::ReLU)?
///     .add_layer(10, Activation::ReLU)?
///     .add_layer(3, Activation::Identity)?
///     .build_with_seed(0)?;
/// assert_eq!(mlp.output_dim(), 3);
/// # Ok(())
/// # }
/// ```
pub struct MlpBuilder {
    input_dim: usize,
    layers: Vec<LayerSpec>,
}

impl MlpBuilder {
    /// Start building an MLP that accepts inputs of length `input_dim`.
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidConfig("input_dim must be > 0".to_owned()));
        }
        Ok(Self {
            input_dim,
            layers: Vec::new(),
        })
    }

    /// Convenience constructor from a sizes list + activations.
    ///
    /// `sizes` includes input and output dimensions, so its length must be at least 2.
    /// `activations` must have length `sizes.len() - 1`.
    pub fn from_sizes(sizes: &[usize], activations: &[Activation]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if activations.len() != sizes.len() - 1 {
            return Err(Error::InvalidConfig(format!(
                "activations length {} does not match sizes.len() - 1 ({})",
                activations.len(),
                sizes.len() - 1
            )));
        }

        let mut b = Self::new(sizes[0])?;
        for (out_dim, &act) in sizes[1..].iter().zip(activations) {
            b = b.add_layer(*out_dim, act)?;
        }
        Ok(b)
    }

    /// Add a dense layer with `out_dim` outputs.
    pub fn add_layer(mut self, out_dim: usize, activation: Activation) -> Result<Self> {
        if out_dim == 0 {
            return Err(Error::InvalidConfig("layer out_dim must be > 0".to_owned()));
        }

        self.layers.push(LayerSpec {
            out_dim,
            activation,
        });
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Mlp> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Mlp> {
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig(
                "mlp must have at least one layer".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut in_dim = self.input_dim;
        for spec in self.layers {
            let layer = Layer::new_with_rng(in_dim, spec.out_dim, spec.activation, rng)?;
            layers.push(layer);
            in_dim = spec.out_dim;
        }

        Mlp::from_layers(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(MlpBuilder::new(0).is_err());
        assert!(MlpBuilder::new(2).unwrap().add_layer(0, Activation::ReLU).is_err());
        assert!(MlpBuilder::new(2).unwrap().build_with_seed(0).is_err());
        assert!(MlpBuilder::from_sizes(&[2], &[]).is_err());
        assert!(MlpBuilder::from_sizes(&[2, 3], &[]).is_err());
        assert!(MlpBuilder::from_sizes(&[2, 0], &[Activation::ReLU]).is_err());
    }

    #[test]
    fn from_sizes_matches_chained_builder() {
        let a = MlpBuilder::from_sizes(
            &[5, 10, 3],
            &[Activation::ReLU, Activation::Identity],
        )
        .unwrap()
        .build_with_seed(4)
        .unwrap();
        let b = MlpBuilder::new(5)
            .unwrap()
            .add_layer(10, Activation::ReLU)
            .unwrap()
            .add_layer(3, Activation::Identity)
            .unwrap()
            .build_with_seed(4)
            .unwrap();

        for i in 0..a.num_layers() {
            assert_eq!(a.layer(i).unwrap().weights(), b.layer(i).unwrap().weights());
            assert_eq!(a.layer(i).unwrap().biases(), b.layer(i).unwrap().biases());
        }
    }

    #[test]
    fn every_layer_is_bounded_by_its_fan_in() {
        let mlp = MlpBuilder::new(4)
            .unwrap()
            .add_layer(16, Activation::ReLU)
            .unwrap()
            .add_layer(2, Activation::Identity)
            .unwrap()
            .build_with_seed(1)
            .unwrap();
        for i in 0..mlp.num_layers() {
            let layer = mlp.layer(i).unwrap();
            let bound = 1.0 / (layer.in_dim() as f32).sqrt();
            assert!(layer.weights().iter().chain(layer.biases()).all(|v| v.abs() <= bound));
        }
    }
}
