use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Layer, Result};

#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
}

/// Reusable buffers for `Mlp::forward`.
///
/// The output of the most recent forward pass lives inside `Scratch`.
#[derive(Debug, Clone)]
pub struct Scratch {
    layer_outputs: Vec<Vec<f32>>,
}

/// Reusable buffers for `Mlp::forward_batch`.
///
/// Buffers grow to fit the largest batch seen and are reused afterwards.
#[derive(Debug, Clone)]
pub struct BatchScratch {
    layer_outputs: Vec<Vec<f32>>,
    out_dims: Vec<usize>,
    batch_size: usize,
}

/// Parameter gradients for an `Mlp` (overwrite semantics).
///
/// Allocate once via `Mlp::gradients()` and reuse across training steps.
#[derive(Debug, Clone)]
pub struct Gradients {
    d_weights: Vec<Vec<f32>>,
    d_biases: Vec<Vec<f32>>,

    // Backprop intermediate: gradient w.r.t each layer output.
    // This includes the final layer output; `Mlp::backward` reads the upstream
    // `d_output` from the last entry so it can uniformly backprop layer-by-layer.
    d_layer_outputs: Vec<Vec<f32>>,

    d_input: Vec<f32>,
}

impl Mlp {
    /// Build a network from explicit layers.
    ///
    /// Consecutive layers must chain: `layers[i].out_dim() == layers[i + 1].in_dim()`.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidConfig(
                "mlp must have at least one layer".to_owned(),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].out_dim() != pair[1].in_dim() {
                return Err(Error::InvalidShape(format!(
                    "layer {} in_dim {} does not match layer {i} out_dim {}",
                    i + 1,
                    pair[1].in_dim(),
                    pair[0].out_dim()
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Seeded network with ReLU hidden layers and an identity output layer.
    ///
    /// `sizes` includes the input and output widths.
    pub fn new_with_seed(sizes: &[usize], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(sizes, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if sizes.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }

        let last = sizes.len() - 2;
        let mut layers = Vec::with_capacity(sizes.len() - 1);
        for (idx, w) in sizes.windows(2).enumerate() {
            let activation = if idx == last {
                Activation::Identity
            } else {
                Activation::ReLU
            };
            layers.push(Layer::new_with_rng(w[0], w[1], activation, rng)?);
        }
        debug!("initialized mlp with sizes {sizes:?}");
        Self::from_layers(layers)
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers
            .first()
            .expect("mlp must have at least one layer")
            .in_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers
            .last()
            .expect("mlp must have at least one layer")
            .out_dim()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    pub fn scratch(&self) -> Scratch {
        Scratch::new(self)
    }

    pub fn batch_scratch(&self) -> BatchScratch {
        BatchScratch::new(self)
    }

    pub fn gradients(&self) -> Gradients {
        Gradients::new(self)
    }

    /// Convenience constructor: allocate all training buffers.
    #[inline]
    pub fn trainer(&self) -> Trainer {
        Trainer::new(self)
    }

    /// Forward pass for a single sample.
    ///
    /// Writes intermediate activations into `scratch` and returns the final output slice.
    ///
    /// Shape contract:
    /// - `input.len() == self.input_dim()`
    /// - `scratch` must be built for this `Mlp` (same layer count and output sizes)
    pub fn forward<'a>(&self, input: &[f32], scratch: &'a mut Scratch) -> &'a [f32] {
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
            // Borrow the previous output immutably and the current output mutably.
            let (left, right) = scratch.layer_outputs.split_at_mut(idx);
            let prev: &[f32] = if idx == 0 { input } else { &left[idx - 1] };
            let out = &mut right[0];
            assert_eq!(
                out.len(),
                layer.out_dim(),
                "scratch layer {idx} output len {} does not match layer out_dim {}",
                out.len(),
                layer.out_dim()
            );
            layer.forward(prev, out);
        }

        scratch.output()
    }

    /// Forward pass for a row-major batch of `batch_size` samples.
    ///
    /// Returns the final outputs as a flat `(batch_size, output_dim)` slice. A zero-sized
    /// batch yields an empty slice.
    ///
    /// Shape contract: `inputs.len() == batch_size * self.input_dim()`.
    pub fn forward_batch<'a>(
        &self,
        inputs: &[f32],
        batch_size: usize,
        scratch: &'a mut BatchScratch,
    ) -> &'a [f32] {
        assert_eq!(
            inputs.len(),
            batch_size * self.input_dim(),
            "inputs len {} does not match batch_size * input_dim ({batch_size} * {})",
            inputs.len(),
            self.input_dim()
        );
        assert_eq!(
            scratch.layer_outputs.len(),
            self.layers.len(),
            "batch scratch has {} layer outputs, model has {} layers",
            scratch.layer_outputs.len(),
            self.layers.len()
        );

        scratch.resize(batch_size);

        for (idx, layer) in self.layers.iter().enumerate() {
            let (left, right) = scratch.layer_outputs.split_at_mut(idx);
            let prev: &[f32] = if idx == 0 {
                inputs
            } else {
                &left[idx - 1][..batch_size * layer.in_dim()]
            };
            let out = &mut right[0][..batch_size * layer.out_dim()];
            layer.forward_batch(prev, batch_size, out);
        }

        scratch.output()
    }

    /// Backward pass for a single sample, using the internal `d_output` buffer.
    ///
    /// You must call `forward` first using the same `input` and `scratch`.
    ///
    /// Before calling this, write the upstream gradient `dL/d(output)` into
    /// `grads.d_output_mut()`.
    ///
    /// Overwrite semantics:
    /// - `grads` is overwritten with gradients for this sample.
    ///
    /// Returns dL/d(input).
    pub fn backward<'a>(
        &self,
        input: &[f32],
        scratch: &Scratch,
        grads: &'a mut Gradients,
    ) -> &'a [f32] {
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

            let layer_input: &[f32] = if idx == 0 {
                input
            } else {
                &scratch.layer_outputs[idx - 1]
            };
            let layer_output: &[f32] = &scratch.layer_outputs[idx];

            if idx == 0 {
                let d_outputs = &grads.d_layer_outputs[0];
                layer.backward(
                    layer_input,
                    layer_output,
                    d_outputs,
                    &mut grads.d_input,
                    &mut grads.d_weights[0],
                    &mut grads.d_biases[0],
                );
            } else {
                // `d_outputs` of this layer is read-only; its `d_inputs` becomes the
                // `d_outputs` of the previous layer.
                let (left, right) = grads.d_layer_outputs.split_at_mut(idx);
                let d_inputs_prev = &mut left[idx - 1];
                let d_outputs = &right[0];
                layer.backward(
                    layer_input,
                    layer_output,
                    d_outputs,
                    d_inputs_prev,
                    &mut grads.d_weights[idx],
                    &mut grads.d_biases[idx],
                );
            }
        }

        &grads.d_input
    }

    /// Applies an SGD update to all layers.
    #[inline]
    pub fn sgd_step(&mut self, grads: &Gradients, lr: f32) {
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

    /// Shape-checked single-sample inference into a caller-owned buffer.
    pub fn predict_into(&self, input: &[f32], scratch: &mut Scratch, out: &mut [f32]) -> Result<()> {
        if input.len() != self.input_dim() {
            return Err(Error::DimensionMismatch {
                what: "input",
                expected: self.input_dim(),
                got: input.len(),
            });
        }
        if out.len() != self.output_dim() {
            return Err(Error::DimensionMismatch {
                what: "output buffer",
                expected: self.output_dim(),
                got: out.len(),
            });
        }
        if scratch.layer_outputs.len() != self.layers.len() {
            return Err(Error::InvalidShape(format!(
                "scratch has {} layer outputs, model has {} layers",
                scratch.layer_outputs.len(),
                self.layers.len()
            )));
        }

        out.copy_from_slice(self.forward(input, scratch));
        Ok(())
    }
}

/// Reusable buffers for training a specific `Mlp`.
///
/// `scratch` and `grads` hold one sample at a time; `batch_grads` accumulates the
/// mean gradient over a full batch.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub scratch: Scratch,
    pub grads: Gradients,
    pub batch_grads: Gradients,
}

impl Trainer {
    pub fn new(mlp: &Mlp) -> Self {
        Self {
            scratch: Scratch::new(mlp),
            grads: Gradients::new(mlp),
            batch_grads: Gradients::new(mlp),
        }
    }
}

impl Scratch {
    pub fn new(mlp: &Mlp) -> Self {
        let layer_outputs = mlp
            .layers
            .iter()
            .map(|layer| vec![0.0; layer.out_dim()])
            .collect();
        Self { layer_outputs }
    }

    #[inline]
    pub fn output(&self) -> &[f32] {
        self.layer_outputs
            .last()
            .expect("scratch must have at least one layer output")
            .as_slice()
    }

    /// Post-activation output of layer `idx` from the most recent forward pass.
    #[inline]
    pub fn layer_output(&self, idx: usize) -> &[f32] {
        &self.layer_outputs[idx]
    }
}

impl BatchScratch {
    pub fn new(mlp: &Mlp) -> Self {
        Self {
            layer_outputs: vec![Vec::new(); mlp.layers.len()],
            out_dims: mlp.layers.iter().map(Layer::out_dim).collect(),
            batch_size: 0,
        }
    }

    fn resize(&mut self, batch_size: usize) {
        for (buf, &out_dim) in self.layer_outputs.iter_mut().zip(&self.out_dims) {
            let needed = batch_size * out_dim;
            if buf.len() < needed {
                buf.resize(needed, 0.0);
            }
        }
        self.batch_size = batch_size;
    }

    /// Number of rows produced by the most recent batched forward pass.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Flat `(batch_size, out_dim)` outputs of layer `idx` from the most recent pass.
    #[inline]
    pub fn layer_output(&self, idx: usize) -> &[f32] {
        &self.layer_outputs[idx][..self.batch_size * self.out_dims[idx]]
    }

    #[inline]
    pub fn output(&self) -> &[f32] {
        self.layer_output(self.layer_outputs.len() - 1)
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
    ///
    /// Typical training flow:
    /// - `mlp.forward(input, &mut scratch)`
    /// - loss writes `dL/d(output)` into `grads.d_output_mut()`
    /// - `mlp.backward(input, &scratch, &mut grads)`
    #[inline]
    pub fn d_output_mut(&mut self) -> &mut [f32] {
        self.d_layer_outputs
            .last_mut()
            .expect("mlp must have at least one layer")
            .as_mut_slice()
    }

    #[inline]
    pub fn d_input(&self) -> &[f32] {
        &self.d_input
    }

    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> &[f32] {
        &self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> &[f32] {
        &self.d_biases[layer_idx]
    }

    #[inline]
    pub fn d_weights_mut(&mut self, layer_idx: usize) -> &mut [f32] {
        &mut self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases_mut(&mut self, layer_idx: usize) -> &mut [f32] {
        &mut self.d_biases[layer_idx]
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.d_weights.len()
    }

    /// Zero all parameter gradients.
    pub fn zero(&mut self) {
        for g in self.d_weights.iter_mut().chain(self.d_biases.iter_mut()) {
            g.fill(0.0);
        }
    }

    /// `self += scale * other` over all parameter gradients.
    pub fn accumulate(&mut self, other: &Gradients, scale: f32) {
        assert_eq!(
            self.d_weights.len(),
            other.d_weights.len(),
            "gradient layer counts differ"
        );

        let pairs = self
            .d_weights
            .iter_mut()
            .zip(&other.d_weights)
            .chain(self.d_biases.iter_mut().zip(&other.d_biases));
        for (acc, g) in pairs {
            debug_assert_eq!(acc.len(), g.len());
            for (a, &v) in acc.iter_mut().zip(g) {
                *a = scale.mul_add(v, *a);
            }
        }
    }
}
