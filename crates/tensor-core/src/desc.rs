// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strided tensor descriptors.

use crate::{DType, OpError, Shape};

/// Immutable description of one tensor: element type, extents and strides.
///
/// Strides are signed and counted in elements, one per axis. A descriptor
/// never owns data; it is the layout contract an operator validates in
/// `create` and copies into its plan.
///
/// # Examples
/// ```
/// use tensor_core::{DType, TensorDesc};
/// let d = TensorDesc::contiguous(DType::F32, vec![2, 3]);
/// assert_eq!(d.strides(), &[3, 1]);
/// assert!(d.is_contiguous());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TensorDesc {
    dtype: DType,
    shape: Shape,
    strides: Vec<isize>,
}

impl TensorDesc {
    /// Creates a descriptor from explicit strides.
    ///
    /// # Errors
    /// Returns [`OpError::BadParam`] if `shape` and `strides` differ in length.
    pub fn new(dtype: DType, shape: Vec<usize>, strides: Vec<isize>) -> Result<Self, OpError> {
        if shape.len() != strides.len() {
            return Err(OpError::bad_param(
                "tensor_desc",
                format!(
                    "shape has {} axes but strides has {}",
                    shape.len(),
                    strides.len()
                ),
            ));
        }
        Ok(Self {
            dtype,
            shape: Shape::new(shape),
            strides,
        })
    }

    /// Creates a descriptor with row-major packed strides.
    pub fn contiguous(dtype: DType, shape: Vec<usize>) -> Self {
        let shape = Shape::new(shape);
        let strides = shape.contiguous_strides();
        Self {
            dtype,
            shape,
            strides,
        }
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    pub fn shape(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Extent of axis `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.shape.dims()[i]
    }

    /// Stride of axis `i`, in elements.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn stride(&self, i: usize) -> isize {
        self.strides[i]
    }

    /// Total number of logical elements (1 for a scalar, 0 if any extent is 0).
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.rank() == 0
    }

    /// Returns `true` iff the strides equal the row-major packing of the shape.
    pub fn is_contiguous(&self) -> bool {
        self.strides == self.shape.contiguous_strides()
    }

    /// Returns `true` iff some axis of extent > 1 has stride 0.
    ///
    /// A tensor with no elements never broadcasts.
    pub fn has_broadcast_dim(&self) -> bool {
        self.numel() > 0
            && self
                .shape
                .dims()
                .iter()
                .zip(&self.strides)
                .any(|(&dim, &stride)| dim > 1 && stride == 0)
    }

    /// Returns `true` if the innermost axis is unit-stride (or the tensor is a scalar).
    pub fn is_last_dim_contiguous(&self) -> bool {
        self.strides.last().map_or(true, |&s| s == 1)
    }

    /// Returns a view of this tensor expanded to `shape`.
    ///
    /// Axes are aligned from the right. Missing leading axes and extent-1 axes
    /// that grow get stride 0; every other axis must match exactly.
    ///
    /// # Errors
    /// Returns [`OpError::BadTensorShape`] if the shapes are not broadcast-compatible.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<TensorDesc, OpError> {
        let target = Shape::new(shape.to_vec());
        if !self.shape.broadcasts_to(&target) {
            return Err(OpError::bad_shape(
                "broadcast",
                format!("cannot broadcast {} to {target}", self.shape),
            ));
        }
        let lead = shape.len() - self.ndim();
        let strides = shape
            .iter()
            .enumerate()
            .map(|(i, &dim)| match i.checked_sub(lead) {
                Some(j) if self.dim(j) == dim => self.strides[j],
                _ => 0,
            })
            .collect();
        Ok(TensorDesc {
            dtype: self.dtype,
            shape: target,
            strides,
        })
    }

    /// Lowest and highest element offsets reachable from the base element.
    ///
    /// Negative strides push the lower bound below zero. Returns `None` for
    /// tensors with no elements.
    pub fn offset_range(&self) -> Option<(isize, isize)> {
        if self.numel() == 0 {
            return None;
        }
        let (mut lo, mut hi) = (0isize, 0isize);
        for (&dim, &stride) in self.shape.dims().iter().zip(&self.strides) {
            let reach = (dim as isize - 1) * stride;
            if reach < 0 {
                lo += reach;
            } else {
                hi += reach;
            }
        }
        Some((lo, hi))
    }

    /// Number of bytes a buffer must cover to hold every reachable element,
    /// measured from the lowest reachable element.
    pub fn span_bytes(&self) -> usize {
        match self.offset_range() {
            Some((lo, hi)) => (hi - lo + 1) as usize * self.dtype.size_bytes(),
            None => 0,
        }
    }

    /// Element offset of the base element relative to the lowest reachable one.
    ///
    /// Zero unless some stride is negative.
    pub fn base_offset(&self) -> usize {
        self.offset_range().map_or(0, |(lo, _)| (-lo) as usize)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_row_major_is_contiguous(shape in prop::collection::vec(0usize..=5, 0..=5)) {
            let d = TensorDesc::contiguous(DType::F32, shape);
            prop_assert!(d.is_contiguous());
            prop_assert!(!d.has_broadcast_dim());
        }

        #[test]
        fn prop_perturbed_stride_breaks_contiguity(
            shape in prop::collection::vec(1usize..=5, 1..=5),
            axis_seed in any::<usize>(),
            delta in 1isize..=3,
        ) {
            let axis = axis_seed % shape.len();
            let mut strides = Shape::new(shape.clone()).contiguous_strides();
            strides[axis] += delta;
            let d = TensorDesc::new(DType::F32, shape, strides).unwrap();
            prop_assert!(!d.is_contiguous());
        }
    }
}
