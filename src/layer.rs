//! Dense (fully-connected) layer.

use rand::Rng;
use rand::distr::{Distribution, Uniform};

use crate::matmul::gemm_f32;
use crate::{Activation, Error, Result};

#[derive(Debug, Clone)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Create a layer with weights and biases drawn from `U(-1/sqrt(in_dim), 1/sqrt(in_dim))`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let bound = 1.0 / (in_dim as f32).sqrt();
        let dist = Uniform::new(-bound, bound)
            .map_err(|e| Error::InvalidConfig(format!("bad init range: {e}")))?;
        let weights: Vec<f32> = (0..in_dim * out_dim).map(|_| dist.sample(rng)).collect();
        let biases: Vec<f32> = (0..out_dim).map(|_| dist.sample(rng)).collect();

        Ok(Self {
            in_dim,
            out_dim,
            activation,
            weights,
            biases,
        })
    }

    /// Build a layer from explicit parameters.
    ///
    /// `weights` is row-major `(out_dim, in_dim)`. All values must be finite.
    pub fn from_parts(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidShape(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        if weights.len() != in_dim * out_dim {
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
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Forward pass for a single sample.
    ///
    /// Computes:
    /// - `z = W * inputs + b`
    /// - `outputs = activation(z)`
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `outputs.len() == self.out_dim`
    #[inline]
    pub fn forward(&self, inputs: &[f32], outputs: &mut [f32]) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);

        for o in 0..self.out_dim {
            let mut sum = self.biases[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                sum = self.weights[row + i].mul_add(inputs[i], sum);
            }
            outputs[o] = self.activation.forward(sum);
        }
    }

    /// Forward pass for a row-major batch.
    ///
    /// Shape contract:
    /// - `inputs.len() == batch_size * self.in_dim`
    /// - `outputs.len() == batch_size * self.out_dim`
    pub fn forward_batch(&self, inputs: &[f32], batch_size: usize, outputs: &mut [f32]) {
        debug_assert_eq!(inputs.len(), batch_size * self.in_dim);
        debug_assert_eq!(outputs.len(), batch_size * self.out_dim);

        if batch_size == 0 {
            return;
        }

        // Seed every output row with the biases, then accumulate X * W^T on top.
        for row in outputs.chunks_exact_mut(self.out_dim) {
            row.copy_from_slice(&self.biases);
        }

        gemm_f32(
            batch_size,
            self.out_dim,
            self.in_dim,
            1.0,
            inputs,
            self.in_dim,
            1,
            &self.weights,
            1,
            self.in_dim,
            1.0,
            outputs,
            self.out_dim,
            1,
        );

        self.activation.forward_in_place(outputs);
    }

    /// Backward pass for a single sample.
    ///
    /// This uses overwrite semantics:
    /// - `d_inputs` is overwritten (and internally zeroed before accumulation)
    /// - `d_weights` is overwritten
    /// - `d_biases` is overwritten
    ///
    /// Inputs:
    /// - `inputs`: the same inputs passed to `forward`
    /// - `outputs`: the outputs previously produced by `forward` (post-activation)
    /// - `d_outputs`: upstream gradient dL/d(outputs)
    #[inline]
    pub fn backward(
        &self,
        inputs: &[f32],
        outputs: &[f32],
        d_outputs: &[f32],
        d_inputs: &mut [f32],
        d_weights: &mut [f32],
        d_biases: &mut [f32],
    ) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);
        debug_assert_eq!(d_outputs.len(), self.out_dim);
        debug_assert_eq!(d_inputs.len(), self.in_dim);
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.out_dim);

        // d_inputs accumulates contributions from all outputs.
        d_inputs.fill(0.0);

        for o in 0..self.out_dim {
            let d_z = d_outputs[o] * self.activation.grad_from_output(outputs[o]);
            d_biases[o] = d_z;

            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                let w = self.weights[row + i];
                d_weights[row + i] = d_z * inputs[i];
                d_inputs[i] = w.mul_add(d_z, d_inputs[i]);
            }
        }
    }

    /// `param -= lr * d_param` for weights and biases.
    #[inline]
    pub fn sgd_step(&mut self, d_weights: &[f32], d_biases: &[f32], lr: f32) {
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.biases.len());

        for (w, &g) in self.weights.iter_mut().zip(d_weights) {
            *w = (-lr).mul_add(g, *w);
        }
        for (b, &g) in self.biases.iter_mut().zip(d_biases) {
            *b = (-lr).mul_add(g, *b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fan_in_uniform_stays_within_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new_with_rng(4, 6, Activation::ReLU, &mut rng).unwrap();
        let bound = 0.5;
        assert!(layer.weights().iter().all(|w| w.abs() <= bound));
        assert!(layer.biases().iter().all(|b| b.abs() <= bound));
    }

    #[test]
    fn from_parts_validates_lengths_and_finiteness() {
        assert!(Layer::from_parts(2, 1, Activation::Identity, vec![1.0], vec![0.0]).is_err());
        assert!(Layer::from_parts(2, 1, Activation::Identity, vec![1.0, 2.0], vec![]).is_err());
        assert!(
            Layer::from_parts(2, 1, Activation::Identity, vec![1.0, f32::NAN], vec![0.0])
                .is_err()
        );
        assert!(Layer::from_parts(2, 1, Activation::Identity, vec![1.0, 2.0], vec![0.0]).is_ok());
    }

    #[test]
    fn forward_applies_affine_then_activation() {
        // Row 0: [1, -1], row 1: [2, 0.5].
        let layer = Layer::from_parts(
            2,
            2,
            Activation::ReLU,
            vec![1.0, -1.0, 2.0, 0.5],
            vec![0.0, 1.0],
        )
        .unwrap();

        let mut out = [0.0_f32; 2];
        layer.forward(&[1.0, 3.0], &mut out);
        // z0 = 1 - 3 = -2 -> 0, z1 = 2 + 1.5 + 1 = 4.5
        assert_eq!(out, [0.0, 4.5]);
    }

    #[test]
    fn forward_batch_matches_per_sample_forward() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Layer::new_with_rng(3, 4, Activation::ReLU, &mut rng).unwrap();

        let inputs = [0.5_f32, -1.0, 2.0, -0.25, 0.75, 1.5];
        let mut batch_out = [0.0_f32; 8];
        layer.forward_batch(&inputs, 2, &mut batch_out);

        for (x, y_batch) in inputs.chunks(3).zip(batch_out.chunks(4)) {
            let mut y = [0.0_f32; 4];
            layer.forward(x, &mut y);
            for (a, b) in y.iter().zip(y_batch) {
                assert!((a - b).abs() < 1e-5, "per-sample={a} batch={b}");
            }
        }
    }

    #[test]
    fn forward_batch_accepts_empty_batch() {
        let layer = Layer::from_parts(2, 1, Activation::Identity, vec![1.0, 1.0], vec![0.0])
            .unwrap();
        let mut out: [f32; 0] = [];
        layer.forward_batch(&[], 0, &mut out);
    }

    #[test]
    fn sgd_step_moves_against_gradient() {
        let mut layer =
            Layer::from_parts(1, 1, Activation::Identity, vec![1.0], vec![2.0]).unwrap();
        layer.sgd_step(&[3.0], &[4.0], 0.1);
        assert!((layer.weights()[0] - 0.7).abs() < 1e-6);
        assert!((layer.biases()[0] - 1.6).abs() < 1e-6);
    }
}
