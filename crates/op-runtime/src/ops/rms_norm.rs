// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `rms_norm`: `y = w * x / sqrt(mean(x^2) + epsilon)` over the last axis.

use super::{check_dtype, check_last_contiguous, check_rank, check_writable, FLOAT_DTYPES};
use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use tensor_core::{DType, OpError, TensorDesc};

const OP: &str = OpKind::RmsNorm.as_str();

/// Validated layout of one RMS normalisation.
///
/// `x` and `y` are viewed as rows of `dim` contiguous elements indexed by
/// the leading axes (`[n]` or `[n, heads]`).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RmsNormInfo {
    pub dtype: DType,
    /// Either `dtype` or `F32`.
    pub w_dtype: DType,
    pub row_shape: Vec<usize>,
    pub y_row_strides: Vec<isize>,
    pub x_row_strides: Vec<isize>,
    pub dim: usize,
    pub epsilon: f32,
    pub y_base: usize,
    pub x_base: usize,
}

impl RmsNormInfo {
    /// Number of normalised rows.
    pub fn rows(&self) -> usize {
        self.row_shape.iter().product()
    }
}

/// Validates the operands.
///
/// # Errors
/// - [`OpError::BadTensorDtype`] if `x` is not a float, `y` differs from `x`,
///   or `w` is neither `x`'s dtype nor `F32`.
/// - [`OpError::BadTensorShape`] if `x` is not rank 2 or 3, `y` differs from
///   `x`, or `w` is not `[dim]`.
/// - [`OpError::BadTensorStrides`] if a last axis is not unit-stride or `y`
///   repeats an axis.
/// - [`OpError::BadParam`] if `epsilon` is negative or not finite.
pub fn info(
    y: &TensorDesc,
    x: &TensorDesc,
    w: &TensorDesc,
    epsilon: f32,
) -> Result<RmsNormInfo, OpError> {
    let dtype = x.dtype();
    check_dtype(OP, dtype, &FLOAT_DTYPES)?;
    check_dtype(OP, y.dtype(), &[dtype])?;
    check_dtype(OP, w.dtype(), &[dtype, DType::F32])?;

    check_rank(OP, "x", x, &[2, 3])?;
    if y.shape() != x.shape() {
        return Err(OpError::bad_shape(
            OP,
            format!("y {:?} differs from x {:?}", y.shape(), x.shape()),
        ));
    }
    let nd = x.ndim();
    let dim = x.dim(nd - 1);
    if w.shape() != [dim] {
        return Err(OpError::bad_shape(
            OP,
            format!("w {:?} must be [{dim}]", w.shape()),
        ));
    }

    check_last_contiguous(OP, "x", x)?;
    check_last_contiguous(OP, "y", y)?;
    check_last_contiguous(OP, "w", w)?;
    check_writable(OP, "y", y)?;

    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(OpError::bad_param(OP, format!("epsilon {epsilon} must be finite and >= 0")));
    }

    Ok(RmsNormInfo {
        dtype,
        w_dtype: w.dtype(),
        row_shape: x.shape()[..nd - 1].to_vec(),
        y_row_strides: y.strides()[..nd - 1].to_vec(),
        x_row_strides: x.strides()[..nd - 1].to_vec(),
        dim,
        epsilon,
        y_base: y.base_offset(),
        x_base: x.base_offset(),
    })
}

/// Creates an RMSNorm descriptor. Execute with outputs `[y]`, inputs `[x, w]`.
pub fn create(
    handle: &Handle,
    y: &TensorDesc,
    x: &TensorDesc,
    w: &TensorDesc,
    epsilon: f32,
) -> Result<OpDescriptor, OpError> {
    let info = info(y, x, w, epsilon)?;
    OpDescriptor::create(handle, OpInfo::RmsNorm(info), &[y], &[x, w])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f16(shape: Vec<usize>) -> TensorDesc {
        TensorDesc::contiguous(DType::F16, shape)
    }

    #[test]
    fn test_rank3_rows() {
        let x = f16(vec![2, 4, 8]);
        let w = TensorDesc::contiguous(DType::F32, vec![8]);
        let info = info(&x, &x, &w, 1e-5).unwrap();
        assert_eq!(info.rows(), 8);
        assert_eq!(info.row_shape, vec![2, 4]);
        assert_eq!(info.x_row_strides, vec![32, 8]);
        assert_eq!(info.w_dtype, DType::F32);
    }

    #[test]
    fn test_dtype_rules() {
        let x = f16(vec![2, 8]);
        let w64 = TensorDesc::contiguous(DType::F64, vec![8]);
        assert!(matches!(info(&x, &x, &w64, 1e-5), Err(OpError::BadTensorDtype { .. })));
        let y32 = TensorDesc::contiguous(DType::F32, vec![2, 8]);
        assert!(matches!(info(&y32, &x, &f16(vec![8]), 1e-5), Err(OpError::BadTensorDtype { .. })));
        let xi = TensorDesc::contiguous(DType::I8, vec![2, 8]);
        assert!(info(&xi, &xi, &xi, 1e-5).is_err());
    }

    #[test]
    fn test_shape_and_stride_rules() {
        let x = f16(vec![2, 8]);
        assert!(matches!(info(&x, &x, &f16(vec![4]), 1e-5), Err(OpError::BadTensorShape { .. })));
        let flat = f16(vec![16]);
        assert!(matches!(
            info(&flat, &flat, &f16(vec![16]), 1e-5),
            Err(OpError::BadTensorShape { .. })
        ));
        let cols = TensorDesc::new(DType::F16, vec![2, 8], vec![1, 2]).unwrap();
        assert!(matches!(
            info(&x, &cols, &f16(vec![8]), 1e-5),
            Err(OpError::BadTensorStrides { .. })
        ));
        assert!(matches!(info(&x, &x, &f16(vec![8]), -1.0), Err(OpError::BadParam { .. })));
    }

    #[test]
    fn test_padded_rows_accepted() {
        let x = TensorDesc::new(DType::F32, vec![3, 4], vec![16, 1]).unwrap();
        let y = TensorDesc::contiguous(DType::F32, vec![3, 4]);
        let w = TensorDesc::contiguous(DType::F32, vec![4]);
        let info = info(&y, &x, &w, 0.0).unwrap();
        assert_eq!(info.x_row_strides, vec![16]);
        assert_eq!(info.y_row_strides, vec![4]);
    }
}
