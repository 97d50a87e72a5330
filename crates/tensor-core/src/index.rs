// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linear-index to physical-offset mapping.
//!
//! Every strided elementwise kernel calls one of these once per output
//! element, so both are plain integer loops with no allocation.
//!
//! Offsets are in elements, relative to the tensor's base element.

/// Maps `linear`, an index into the row-major enumeration of `shape`, to
/// `Σ coord[a] * strides[a]`.
///
/// `shape` and `strides` must have equal length. An index outside the shape
/// wraps on the outermost axis; a zero extent maps everything to 0.
///
/// # Examples
/// ```
/// use tensor_core::index_to_offset;
/// let offsets: Vec<isize> = (0..6).map(|i| index_to_offset(i, &[2, 3], &[3, 1])).collect();
/// assert_eq!(offsets, vec![0, 1, 2, 3, 4, 5]);
/// ```
#[inline]
pub fn index_to_offset(linear: usize, shape: &[usize], strides: &[isize]) -> isize {
    let mut rem = linear;
    let mut offset = 0isize;
    for (&dim, &stride) in shape.iter().zip(strides).rev() {
        let coord = rem.checked_rem(dim).unwrap_or(0);
        rem = rem.checked_div(dim).unwrap_or(0);
        offset += coord as isize * stride;
    }
    offset
}

/// Maps an output linear index to an input offset under broadcasting.
///
/// Coordinates are decomposed against the output's `full_shape`, then weighted
/// by `reduced_strides`: the input's strides aligned to the output's rank, with
/// zero on every axis the input repeats. Build those with [`reduced_strides`].
///
/// # Examples
/// ```
/// use tensor_core::index_to_reduced_offset;
/// // Output [2, 3], input [1, 3] with strides [0, 1]: row is ignored.
/// assert_eq!(index_to_reduced_offset(4, &[2, 3], &[0, 1]), 1);
/// ```
#[inline]
pub fn index_to_reduced_offset(
    linear: usize,
    full_shape: &[usize],
    reduced_strides: &[isize],
) -> isize {
    index_to_offset(linear, full_shape, reduced_strides)
}

/// Aligns an input layout to an output rank for [`index_to_reduced_offset`].
///
/// Axes are matched from the right. Leading output axes the input lacks, and
/// input axes of extent 1, get stride 0 so they never advance the offset.
pub fn reduced_strides(
    input_shape: &[usize],
    input_strides: &[isize],
    out_ndim: usize,
) -> Vec<isize> {
    let mut out = vec![0isize; out_ndim];
    for ((slot, &dim), &stride) in out
        .iter_mut()
        .rev()
        .zip(input_shape.iter().rev())
        .zip(input_strides.iter().rev())
    {
        *slot = if dim == 1 { 0 } else { stride };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_identity() {
        let offsets: Vec<isize> = (0..6).map(|i| index_to_offset(i, &[2, 3], &[3, 1])).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_transposed_layout() {
        // Column-major [2, 3]: strides [1, 2].
        let offsets: Vec<isize> = (0..6).map(|i| index_to_offset(i, &[2, 3], &[1, 2])).collect();
        assert_eq!(offsets, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_negative_stride() {
        let offsets: Vec<isize> = (0..3).map(|i| index_to_offset(i, &[3], &[-2])).collect();
        assert_eq!(offsets, vec![0, -2, -4]);
    }

    #[test]
    fn test_scalar_maps_to_zero() {
        assert_eq!(index_to_offset(0, &[], &[]), 0);
    }

    #[test]
    fn test_reduced_offset_row_broadcast() {
        assert_eq!(index_to_reduced_offset(4, &[2, 3], &[0, 1]), 1);
    }

    #[test]
    fn test_reduced_strides_alignment() {
        // [3] against a rank-3 output.
        assert_eq!(reduced_strides(&[3], &[1], 3), vec![0, 0, 1]);
        // Extent-1 axes are zeroed whatever their declared stride.
        assert_eq!(reduced_strides(&[1, 3], &[3, 1], 2), vec![0, 1]);
        // Column vector [4, 1] against [4, 5].
        let rs = reduced_strides(&[4, 1], &[1, 1], 2);
        assert_eq!(rs, vec![1, 0]);
        let offsets: Vec<isize> = (0..10)
            .map(|i| index_to_reduced_offset(i, &[4, 5], &rs))
            .collect();
        assert_eq!(offsets, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
    }
}
