//! Row-major feature batches and training sets.
//!
//! `Inputs` is what the designer consumes, an `(N, input_dim)` matrix that may have zero
//! rows. `Dataset` pairs it with an `(N, target_dim)` target matrix for `Mlp::fit`.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{Error, Result};

/// A batch of feature rows, flat and row-major (`inputs.len() == len * input_dim`).
#[derive(Debug, Clone)]
pub struct Inputs {
    inputs: Vec<f32>,
    len: usize,
    input_dim: usize,
}

impl Inputs {
    /// Build inputs from a flat buffer with shape `(len, input_dim)`.
    ///
    /// An empty buffer is a valid zero-row batch. A trailing partial row is a
    /// [`Error::DimensionMismatch`] whose `got` is that row's width.
    pub fn from_flat(inputs: Vec<f32>, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::DimensionMismatch {
                what: "trailing input row",
                expected: input_dim,
                got: inputs.len() % input_dim,
            });
        }

        let len = inputs.len() / input_dim;

        Ok(Self {
            inputs,
            len,
            input_dim,
        })
    }

    /// Build inputs from per-sample rows that must all have width `input_dim`.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f32>], input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }

        let mut inputs = Vec::with_capacity(rows.len() * input_dim);
        for row in rows {
            if row.len() != input_dim {
                return Err(Error::DimensionMismatch {
                    what: "input row",
                    expected: input_dim,
                    got: row.len(),
                });
            }
            inputs.extend_from_slice(row);
        }

        Ok(Self {
            inputs,
            len: rows.len(),
            input_dim,
        })
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
    /// Returns the whole row-major buffer.
    pub fn as_flat(&self) -> &[f32] {
        &self.inputs
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f32] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }
}

/// Feature rows with one target row per sample. Never empty of columns; may be empty of
/// rows, though `Mlp::fit` rejects that.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Inputs,
    targets: Vec<f32>,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f32>,
        targets: Vec<f32>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        let inputs = Inputs::from_flat(inputs, input_dim)?;
        if target_dim == 0 {
            return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
        }

        if targets.len() != inputs.len() * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({} * {})",
                targets.len(),
                inputs.len(),
                target_dim
            )));
        }

        Ok(Self {
            inputs,
            targets,
            target_dim,
        })
    }

    /// Synthetic dataset with every input and target drawn from `N(0, 1)`.
    ///
    /// Inputs are drawn first (row by row), then targets.
    pub fn standard_normal<R: Rng + ?Sized>(
        len: usize,
        input_dim: usize,
        target_dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let inputs = (0..len * input_dim)
            .map(|_| StandardNormal.sample(rng))
            .collect();
        let targets = (0..len * target_dim)
            .map(|_| StandardNormal.sample(rng))
            .collect();
        Self::from_flat(inputs, targets, input_dim, target_dim)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.inputs.input_dim()
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns a view of the inputs (X).
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f32] {
        self.inputs.input(idx)
    }

    #[inline]
    /// Returns the `idx`-th target row (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f32] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}
