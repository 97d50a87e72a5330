// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Broadcast/contiguity classification for elementwise operators.
//!
//! An [`ElementwiseInfo`] answers one question per tensor: how does the
//! `i`-th output element find its operand? Contiguous tensors use `i`
//! directly, exactly-shaped strided tensors decompose `i` against their own
//! shape, and broadcast tensors decompose it against the output shape with
//! zeroed strides.

use tensor_core::{index_to_offset, index_to_reduced_offset, reduced_strides, OpError, TensorDesc};

const OP: &str = "elementwise";

/// How one tensor maps an output linear index to its own element offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Offset equals the linear index.
    Contiguous,
    /// Same shape as the output, arbitrary strides.
    Strided,
    /// Repeats along at least one output axis.
    Broadcast,
}

/// Per-input layout copied out of its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
struct InputLayout {
    strategy: IndexStrategy,
    shape: Vec<usize>,
    strides: Vec<isize>,
    /// Strides aligned to the output rank, zero on repeated axes.
    reduced_strides: Vec<isize>,
}

/// Index-mapping plan shared by every execute of one elementwise descriptor.
///
/// # Examples
/// ```
/// use layout_planner::{ElementwiseInfo, IndexStrategy};
/// use tensor_core::{DType, TensorDesc};
///
/// let c = TensorDesc::contiguous(DType::F32, vec![2, 3]);
/// let a = TensorDesc::contiguous(DType::F32, vec![2, 3]);
/// let b = TensorDesc::new(DType::F32, vec![2, 3], vec![0, 1]).unwrap();
/// let info = ElementwiseInfo::new(&c, &[&a, &b]).unwrap();
/// assert_eq!(info.input_strategy(0), IndexStrategy::Contiguous);
/// assert_eq!(info.input_strategy(1), IndexStrategy::Broadcast);
/// assert_eq!(info.input_offset(1, 4), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ElementwiseInfo {
    output_size: usize,
    ndim: usize,
    output_contiguous: bool,
    output_shape: Vec<usize>,
    output_strides: Vec<isize>,
    inputs: Vec<InputLayout>,
}

impl ElementwiseInfo {
    /// Classifies `output` and every input.
    ///
    /// Inputs are trusted to be broadcast-compatible with the output; operators
    /// check shapes (and expand with [`TensorDesc::broadcast_to`]) before
    /// calling this.
    ///
    /// # Errors
    /// - [`OpError::BadParam`] if `inputs` is empty.
    /// - [`OpError::BadTensorStrides`] if `output` has a broadcast axis.
    pub fn new(output: &TensorDesc, inputs: &[&TensorDesc]) -> Result<Self, OpError> {
        if inputs.is_empty() {
            return Err(OpError::bad_param(OP, "at least one input is required"));
        }
        if output.has_broadcast_dim() {
            return Err(OpError::bad_strides(
                OP,
                format!("output strides {:?} broadcast a written axis", output.strides()),
            ));
        }

        let ndim = output.ndim();
        let inputs = inputs
            .iter()
            .map(|desc| {
                let contiguous = desc.is_contiguous();
                let broadcast = !contiguous && (desc.ndim() != ndim || desc.has_broadcast_dim());
                let strategy = if contiguous {
                    IndexStrategy::Contiguous
                } else if broadcast {
                    IndexStrategy::Broadcast
                } else {
                    IndexStrategy::Strided
                };
                InputLayout {
                    strategy,
                    shape: desc.shape().to_vec(),
                    strides: desc.strides().to_vec(),
                    reduced_strides: reduced_strides(desc.shape(), desc.strides(), ndim),
                }
            })
            .collect();

        Ok(Self {
            output_size: output.numel(),
            ndim,
            output_contiguous: output.is_contiguous(),
            output_shape: output.shape().to_vec(),
            output_strides: output.strides().to_vec(),
            inputs,
        })
    }

    /// Number of output elements.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn output_contiguous(&self) -> bool {
        self.output_contiguous
    }

    pub fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    pub fn output_strides(&self) -> &[isize] {
        &self.output_strides
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// # Panics
    /// Panics if `input >= num_inputs()`.
    pub fn input_strategy(&self, input: usize) -> IndexStrategy {
        self.inputs[input].strategy
    }

    pub fn input_contiguous(&self, input: usize) -> bool {
        self.inputs[input].strategy == IndexStrategy::Contiguous
    }

    pub fn input_broadcasted(&self, input: usize) -> bool {
        self.inputs[input].strategy == IndexStrategy::Broadcast
    }

    pub fn input_shape(&self, input: usize) -> &[usize] {
        &self.inputs[input].shape
    }

    pub fn input_strides(&self, input: usize) -> &[isize] {
        &self.inputs[input].strides
    }

    pub fn input_reduced_strides(&self, input: usize) -> &[isize] {
        &self.inputs[input].reduced_strides
    }

    /// Returns `true` when the output and every input can be walked linearly.
    pub fn all_contiguous(&self) -> bool {
        self.output_contiguous
            && self
                .inputs
                .iter()
                .all(|l| l.strategy == IndexStrategy::Contiguous)
    }

    /// Element offset (from the base element) of output element `linear`.
    #[inline]
    pub fn output_offset(&self, linear: usize) -> isize {
        if self.output_contiguous {
            linear as isize
        } else {
            index_to_offset(linear, &self.output_shape, &self.output_strides)
        }
    }

    /// Element offset (from the base element) of the operand that input
    /// `input` contributes to output element `linear`.
    #[inline]
    pub fn input_offset(&self, input: usize, linear: usize) -> isize {
        let layout = &self.inputs[input];
        match layout.strategy {
            IndexStrategy::Contiguous => linear as isize,
            IndexStrategy::Strided => index_to_offset(linear, &layout.shape, &layout.strides),
            IndexStrategy::Broadcast => {
                index_to_reduced_offset(linear, &self.output_shape, &layout.reduced_strides)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DType;

    fn desc(shape: Vec<usize>, strides: Vec<isize>) -> TensorDesc {
        TensorDesc::new(DType::F32, shape, strides).unwrap()
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let c = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let err = ElementwiseInfo::new(&c, &[]).unwrap_err();
        assert!(matches!(err, OpError::BadParam { .. }));
    }

    #[test]
    fn test_output_broadcast_rejected() {
        let c = desc(vec![2, 3], vec![0, 1]);
        let a = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let err = ElementwiseInfo::new(&c, &[&a]).unwrap_err();
        assert!(matches!(err, OpError::BadTensorStrides { .. }));
    }

    #[test]
    fn test_empty_contiguous_output_plans() {
        let c = TensorDesc::contiguous(DType::F32, vec![3, 0]);
        let a = TensorDesc::contiguous(DType::F32, vec![3, 0]);
        let b = TensorDesc::contiguous(DType::F32, vec![0]).broadcast_to(&[3, 0]).unwrap();
        let info = ElementwiseInfo::new(&c, &[&a, &b]).unwrap();
        assert_eq!(info.output_size(), 0);
        assert!(info.output_contiguous());
        assert_eq!(info.input_strategy(0), IndexStrategy::Contiguous);
    }

    #[test]
    fn test_classification() {
        let c = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let contiguous = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let transposed = desc(vec![2, 3], vec![1, 2]);
        let repeated = desc(vec![2, 3], vec![0, 1]);
        let info = ElementwiseInfo::new(&c, &[&contiguous, &transposed, &repeated]).unwrap();

        assert_eq!(info.input_strategy(0), IndexStrategy::Contiguous);
        assert_eq!(info.input_strategy(1), IndexStrategy::Strided);
        assert!(!info.input_broadcasted(1));
        assert!(info.input_broadcasted(2));
        assert!(!info.all_contiguous());
        assert_eq!(info.output_size(), 6);
        assert_eq!(info.ndim(), 2);
    }

    #[test]
    fn test_lower_rank_noncontiguous_input_is_broadcast() {
        let c = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let a = desc(vec![3], vec![2]);
        let info = ElementwiseInfo::new(&c, &[&a]).unwrap();
        assert_eq!(info.input_strategy(0), IndexStrategy::Broadcast);
        assert_eq!(info.input_reduced_strides(0), &[0, 2]);
        let offsets: Vec<isize> = (0..6).map(|i| info.input_offset(0, i)).collect();
        assert_eq!(offsets, vec![0, 2, 4, 0, 2, 4]);
    }

    #[test]
    fn test_strided_offsets() {
        let c = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let a = desc(vec![2, 3], vec![1, 2]);
        let info = ElementwiseInfo::new(&c, &[&a]).unwrap();
        let offsets: Vec<isize> = (0..6).map(|i| info.input_offset(0, i)).collect();
        assert_eq!(offsets, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_noncontiguous_output_offsets() {
        let c = desc(vec![2, 2], vec![4, 1]);
        let a = TensorDesc::contiguous(DType::F32, vec![2, 2]);
        let info = ElementwiseInfo::new(&c, &[&a]).unwrap();
        assert!(!info.output_contiguous());
        let offsets: Vec<isize> = (0..4).map(|i| info.output_offset(i)).collect();
        assert_eq!(offsets, vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_plan_owns_its_layouts() {
        let info = {
            let c = TensorDesc::contiguous(DType::F32, vec![4]);
            let a = desc(vec![4], vec![2]);
            ElementwiseInfo::new(&c, &[&a]).unwrap()
        };
        assert_eq!(info.input_shape(0), &[4]);
        assert_eq!(info.input_strides(0), &[2]);
        assert_eq!(info.output_strides(), &[1]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use tensor_core::DType;

    proptest! {
        #[test]
        fn prop_zero_stride_on_wide_axis_is_broadcast(
            shape in prop::collection::vec(2usize..=4, 1..=4),
            axis_seed in any::<usize>(),
        ) {
            let axis = axis_seed % shape.len();
            let c = TensorDesc::contiguous(DType::F32, shape.clone());
            let mut strides = c.strides().to_vec();
            strides[axis] = 0;
            let a = TensorDesc::new(DType::F32, shape, strides).unwrap();
            let info = ElementwiseInfo::new(&c, &[&a]).unwrap();
            prop_assert_eq!(info.input_strategy(0), IndexStrategy::Broadcast);
        }

        #[test]
        fn prop_output_broadcast_always_rejected(
            shape in prop::collection::vec(2usize..=4, 1..=4),
            axis_seed in any::<usize>(),
        ) {
            let axis = axis_seed % shape.len();
            let a = TensorDesc::contiguous(DType::F32, shape.clone());
            let mut strides = a.strides().to_vec();
            strides[axis] = 0;
            let c = TensorDesc::new(DType::F32, shape, strides).unwrap();
            let is_strides_error = matches!(
                ElementwiseInfo::new(&c, &[&a]),
                Err(OpError::BadTensorStrides { .. })
            );
            prop_assert!(is_strides_error);
        }
    }
}
