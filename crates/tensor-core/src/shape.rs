// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// The logical extents of a tensor, slowest-varying axis first.
///
/// Shapes are immutable once created and provide convenience methods for
/// computing row-major strides, element counts, and broadcasting compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.numel(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// A scalar holds one element; any zero extent yields zero.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Computes row-major (C-order) strides in elements.
    pub fn contiguous_strides(&self) -> Vec<isize> {
        contiguous_strides(&self.dims)
    }

    /// Returns `true` if a tensor of this shape can be broadcast to `target`.
    ///
    /// Dimensions are aligned from the right; each of ours must equal the
    /// target's or be 1, and we may not have more axes than the target.
    pub fn broadcasts_to(&self, target: &Shape) -> bool {
        if self.rank() > target.rank() {
            return false;
        }
        self.dims
            .iter()
            .rev()
            .zip(target.dims.iter().rev())
            .all(|(&ours, &theirs)| ours == theirs || ours == 1)
    }
}

/// Row-major strides (in elements) for `dims`.
pub fn contiguous_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; dims.len()];
    let mut acc: isize = 1;
    for (stride, &dim) in strides.iter_mut().zip(dims).rev() {
        *stride = acc;
        acc *= dim as isize;
    }
    strides
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(vec![]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.numel(), 1);
        assert!(s.contiguous_strides().is_empty());
    }

    #[test]
    fn test_zero_extent() {
        let s = Shape::new(vec![4, 0, 3]);
        assert_eq!(s.numel(), 0);
        assert_eq!(s.contiguous_strides(), vec![0, 3, 1]);
    }

    #[test]
    fn test_3d_strides() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.contiguous_strides(), vec![12, 4, 1]);
    }

    #[test]
    fn test_broadcasts_to() {
        let out = Shape::new(vec![4, 3]);
        assert!(Shape::new(vec![1, 3]).broadcasts_to(&out));
        assert!(Shape::new(vec![3]).broadcasts_to(&out));
        assert!(Shape::new(vec![4, 1]).broadcasts_to(&out));
        assert!(!Shape::new(vec![4, 2]).broadcasts_to(&out));
        assert!(!Shape::new(vec![1, 4, 3]).broadcasts_to(&out));
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(vec![4, 0, 3]).to_string(), "[4, 0, 3]");
        assert_eq!(Shape::new(vec![]).to_string(), "[]");
    }
}
