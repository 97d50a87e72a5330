// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Owned host tensors with arbitrary strided layouts.

use crate::{index_to_offset, read_elem, write_elem, Element, OpError, TensorDesc};

/// A host buffer paired with the [`TensorDesc`] that lays it out.
///
/// The buffer covers exactly [`TensorDesc::span_bytes`] and starts at the
/// lowest reachable element, so layouts with negative or padded strides are
/// representable without raw pointers. Operators receive
/// [`as_bytes`](Tensor::as_bytes) / [`as_bytes_mut`](Tensor::as_bytes_mut).
///
/// Share a tensor between a harness and an operator through `Arc<Tensor>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    desc: TensorDesc,
    data: Vec<u8>,
}

impl Tensor {
    /// Creates a zero-filled tensor for `desc`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, Tensor, TensorDesc};
    /// let t = Tensor::zeros(TensorDesc::contiguous(DType::F32, vec![2, 3]));
    /// assert_eq!(t.size_bytes(), 24);
    /// ```
    pub fn zeros(desc: TensorDesc) -> Self {
        let data = vec![0u8; desc.span_bytes()];
        Self { desc, data }
    }

    /// Wraps raw bytes laid out according to `desc`.
    ///
    /// # Errors
    /// Returns [`OpError::BadParam`] if `data.len() != desc.span_bytes()`.
    pub fn from_bytes(desc: TensorDesc, data: Vec<u8>) -> Result<Self, OpError> {
        let expected = desc.span_bytes();
        if data.len() != expected {
            return Err(OpError::bad_param(
                "tensor",
                format!("expected {expected} bytes, got {}", data.len()),
            ));
        }
        Ok(Self { desc, data })
    }

    /// Creates a tensor whose logical (row-major) elements are `values`,
    /// scattered into the layout described by `desc`.
    ///
    /// # Errors
    /// Returns [`OpError::BadTensorDtype`] if `T` does not match the descriptor
    /// and [`OpError::BadTensorShape`] if the value count differs from `numel`.
    pub fn from_values<T: Element>(desc: TensorDesc, values: &[T]) -> Result<Self, OpError> {
        check_dtype::<T>(&desc)?;
        if values.len() != desc.numel() {
            return Err(OpError::bad_shape(
                "tensor",
                format!("{} values for {} elements", values.len(), desc.numel()),
            ));
        }
        let mut t = Self::zeros(desc);
        for (i, &v) in values.iter().enumerate() {
            let off = t.element_offset(i);
            write_elem(&mut t.data, off, v);
        }
        Ok(t)
    }

    /// Returns the layout descriptor.
    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    /// Returns the raw bytes, starting at the lowest reachable element.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw bytes mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Buffer offset (in elements) of the `linear`-th logical element.
    pub fn element_offset(&self, linear: usize) -> usize {
        let rel = index_to_offset(linear, self.desc.shape(), self.desc.strides());
        (self.desc.base_offset() as isize + rel) as usize
    }

    /// Reads the logical elements in row-major order.
    ///
    /// # Errors
    /// Returns [`OpError::BadTensorDtype`] if `T` does not match the descriptor.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, OpError> {
        check_dtype::<T>(&self.desc)?;
        Ok((0..self.desc.numel())
            .map(|i| read_elem(&self.data, self.element_offset(i)))
            .collect())
    }
}

fn check_dtype<T: Element>(desc: &TensorDesc) -> Result<(), OpError> {
    if T::DTYPE != desc.dtype() {
        return Err(OpError::bad_dtype("tensor", desc.dtype()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(TensorDesc::contiguous(DType::F32, vec![2, 3]));
        assert_eq!(t.size_bytes(), 24);
        assert!(t.to_vec::<f32>().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_values_transposed() {
        let desc = TensorDesc::new(DType::I32, vec![2, 3], vec![1, 2]).unwrap();
        let t = Tensor::from_values(desc, &[0i32, 1, 2, 3, 4, 5]).unwrap();
        // Column-major storage.
        let raw: Vec<i32> = (0..6).map(|i| read_elem(t.as_bytes(), i)).collect();
        assert_eq!(raw, vec![0, 3, 1, 4, 2, 5]);
        assert_eq!(t.to_vec::<i32>().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_negative_stride_layout() {
        let desc = TensorDesc::new(DType::U8, vec![3], vec![-1]).unwrap();
        let t = Tensor::from_values(desc, &[10u8, 20, 30]).unwrap();
        assert_eq!(t.as_bytes(), &[30, 20, 10]);
        assert_eq!(t.to_vec::<u8>().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn test_dtype_mismatch() {
        let desc = TensorDesc::contiguous(DType::F16, vec![2]);
        assert!(Tensor::from_values(desc, &[1.0f32, 2.0]).is_err());
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let desc = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        assert!(Tensor::from_bytes(desc, vec![0u8; 10]).is_err());
    }
}
