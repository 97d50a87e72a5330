// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `causal_softmax`: masked softmax over the last axis, in place.
//!
//! For `y` of shape `[.., seq_len, total_len]`, row `i` keeps columns
//! `0..=total_len - seq_len + i` and writes zero to the rest, so each query
//! sees the cached prefix plus itself.

use super::{check_dtype, check_last_contiguous, check_rank, check_writable, FLOAT_DTYPES};
use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use tensor_core::{DType, OpError, TensorDesc};

const OP: &str = OpKind::CausalSoftmax.as_str();

/// Validated layout of one causal softmax. Strides are in elements.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CausalSoftmaxInfo {
    pub dtype: DType,
    /// Leading batch extent (1 for rank-2 input).
    pub batch: usize,
    pub seq_len: usize,
    pub total_len: usize,
    pub batch_stride: isize,
    pub row_stride: isize,
    pub base: usize,
}

impl CausalSoftmaxInfo {
    /// Unmasked columns of row `i`.
    pub fn visible_columns(&self, i: usize) -> usize {
        self.total_len - self.seq_len + i + 1
    }
}

/// Validates `y`.
///
/// # Errors
/// - [`OpError::BadTensorDtype`] if `y` is not a float.
/// - [`OpError::BadTensorShape`] if `y` is not rank 2 or 3 or
///   `total_len < seq_len`.
/// - [`OpError::BadTensorStrides`] if the last axis is not unit-stride or
///   `y` repeats an axis.
pub fn info(y: &TensorDesc) -> Result<CausalSoftmaxInfo, OpError> {
    check_dtype(OP, y.dtype(), &FLOAT_DTYPES)?;
    check_rank(OP, "y", y, &[2, 3])?;
    let nd = y.ndim();
    let (seq_len, total_len) = (y.dim(nd - 2), y.dim(nd - 1));
    if total_len < seq_len {
        return Err(OpError::bad_shape(
            OP,
            format!("total_len {total_len} is shorter than seq_len {seq_len}"),
        ));
    }
    check_last_contiguous(OP, "y", y)?;
    check_writable(OP, "y", y)?;

    let (batch, batch_stride) = if nd == 3 { (y.dim(0), y.stride(0)) } else { (1, 0) };
    Ok(CausalSoftmaxInfo {
        dtype: y.dtype(),
        batch,
        seq_len,
        total_len,
        batch_stride,
        row_stride: y.stride(nd - 2),
        base: y.base_offset(),
    })
}

/// Creates a causal softmax descriptor. Execute with outputs `[y]`, no inputs.
pub fn create(handle: &Handle, y: &TensorDesc) -> Result<OpDescriptor, OpError> {
    let info = info(y)?;
    OpDescriptor::create(handle, OpInfo::CausalSoftmax(info), &[y], &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let y = TensorDesc::contiguous(DType::F16, vec![4, 3, 5]);
        let info = info(&y).unwrap();
        assert_eq!((info.batch, info.seq_len, info.total_len), (4, 3, 5));
        assert_eq!((info.batch_stride, info.row_stride), (15, 5));
        assert_eq!(info.visible_columns(0), 3);
        assert_eq!(info.visible_columns(2), 5);
    }

    #[test]
    fn test_rank2() {
        let y = TensorDesc::contiguous(DType::F32, vec![2, 2]);
        let info = info(&y).unwrap();
        assert_eq!(info.batch, 1);
        assert_eq!(info.visible_columns(0), 1);
    }

    #[test]
    fn test_rejections() {
        let wide_seq = TensorDesc::contiguous(DType::F32, vec![5, 3]);
        assert!(matches!(info(&wide_seq), Err(OpError::BadTensorShape { .. })));
        let rank1 = TensorDesc::contiguous(DType::F32, vec![5]);
        assert!(matches!(info(&rank1), Err(OpError::BadTensorShape { .. })));
        let ints = TensorDesc::contiguous(DType::U8, vec![2, 2]);
        assert!(matches!(info(&ints), Err(OpError::BadTensorDtype { .. })));
        let cols = TensorDesc::new(DType::F32, vec![2, 2], vec![1, 2]).unwrap();
        assert!(matches!(info(&cols), Err(OpError::BadTensorStrides { .. })));
    }
}
