// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rearrange plans: copy one strided layout into another.
//!
//! The planner drops extent-1 axes, then fuses neighbouring axes from the
//! innermost outward while both layouts are contiguous across the pair. If
//! the innermost fused axis is unit-stride on both sides it becomes the
//! burst copied with one `copy_from_slice`; every other axis is looped.

use tensor_core::OpError;

const OP: &str = "rearrange";

/// One explicitly iterated axis. Strides are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LoopAxis {
    pub extent: usize,
    pub dst_stride: isize,
    pub src_stride: isize,
}

/// A copy schedule between two layouts of the same logical shape.
///
/// Built once per rearrange descriptor and replayed by every launch with
/// fresh buffers. Buffers are addressed from their lowest reachable byte, as
/// [`tensor_core::Tensor`] lays them out.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RearrangePlan {
    shape: Vec<usize>,
    element_size: usize,
    /// Bytes copied per burst.
    unit: usize,
    /// Outermost first.
    loop_axes: Vec<LoopAxis>,
    fast_path: bool,
    dst_base: usize,
    src_base: usize,
    dst_span: usize,
    src_span: usize,
}

impl RearrangePlan {
    /// Plans a copy of `shape` from `src_strides` into `dst_strides`.
    ///
    /// Strides are in elements of `element_size` bytes.
    ///
    /// Returns `None` if the stride lists do not match the rank of `shape`,
    /// if `element_size` is zero, or if the destination repeats an axis of
    /// extent > 1 (two source elements would land on one byte range).
    pub fn build(
        shape: &[usize],
        dst_strides: &[isize],
        src_strides: &[isize],
        element_size: usize,
    ) -> Option<Self> {
        if dst_strides.len() != shape.len()
            || src_strides.len() != shape.len()
            || element_size == 0
        {
            return None;
        }
        let numel: usize = shape.iter().product();
        if numel > 0 && shape.iter().zip(dst_strides).any(|(&d, &s)| d > 1 && s == 0) {
            return None;
        }

        let (dst_base, dst_span) = byte_span(shape, dst_strides, element_size);
        let (src_base, src_span) = byte_span(shape, src_strides, element_size);

        if numel == 0 {
            return Some(Self {
                shape: shape.to_vec(),
                element_size,
                unit: 0,
                loop_axes: Vec::new(),
                fast_path: true,
                dst_base,
                src_base,
                dst_span,
                src_span,
            });
        }

        // Innermost first while fusing.
        let mut fused: Vec<LoopAxis> = Vec::with_capacity(shape.len());
        let mut merging = true;
        let axes = shape.iter().zip(dst_strides).zip(src_strides).rev();
        for ((&extent, &dst_stride), &src_stride) in axes {
            if extent == 1 {
                continue;
            }
            if let Some(inner) = fused.last_mut() {
                let inner_extent = inner.extent as isize;
                if merging
                    && dst_stride == inner.dst_stride * inner_extent
                    && src_stride == inner.src_stride * inner_extent
                {
                    inner.extent *= extent;
                    continue;
                }
                merging = false;
            }
            fused.push(LoopAxis {
                extent,
                dst_stride,
                src_stride,
            });
        }

        let mut unit = element_size;
        if let Some(inner) = fused.first() {
            if inner.dst_stride == 1 && inner.src_stride == 1 {
                unit *= inner.extent;
                fused.remove(0);
            }
        }

        let elem = element_size as isize;
        let loop_axes: Vec<LoopAxis> = fused
            .into_iter()
            .rev()
            .map(|a| LoopAxis {
                extent: a.extent,
                dst_stride: a.dst_stride * elem,
                src_stride: a.src_stride * elem,
            })
            .collect();

        Some(Self {
            shape: shape.to_vec(),
            element_size,
            unit,
            fast_path: loop_axes.is_empty(),
            loop_axes,
            dst_base,
            src_base,
            dst_span,
            src_span,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Bytes moved by each contiguous burst.
    pub fn unit(&self) -> usize {
        self.unit
    }

    /// Axes iterated explicitly, outermost first, with byte strides.
    pub fn loop_axes(&self) -> &[LoopAxis] {
        &self.loop_axes
    }

    /// `true` when the whole copy is one `numel * element_size` byte burst.
    pub fn is_fast_path(&self) -> bool {
        self.fast_path
    }

    /// Bytes the destination buffer must cover.
    pub fn dst_span(&self) -> usize {
        self.dst_span
    }

    /// Bytes the source buffer must cover.
    pub fn src_span(&self) -> usize {
        self.src_span
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of bursts a launch performs.
    pub fn burst_count(&self) -> usize {
        if self.unit == 0 {
            return 0;
        }
        self.loop_axes.iter().map(|a| a.extent).product()
    }

    /// Copies `src` into `dst` following the plan.
    ///
    /// # Errors
    /// Returns [`OpError::BadParam`] if either slice is shorter than its span.
    pub fn launch(&self, dst: &mut [u8], src: &[u8]) -> Result<(), OpError> {
        if dst.len() < self.dst_span || src.len() < self.src_span {
            return Err(OpError::bad_param(
                OP,
                format!(
                    "buffers of {}/{} bytes cannot hold spans of {}/{} bytes (dst/src)",
                    dst.len(),
                    src.len(),
                    self.dst_span,
                    self.src_span
                ),
            ));
        }
        if self.unit == 0 {
            return Ok(());
        }
        self.copy_axis(0, dst, src, self.dst_base as isize, self.src_base as isize);
        Ok(())
    }

    fn copy_axis(&self, depth: usize, dst: &mut [u8], src: &[u8], dst_off: isize, src_off: isize) {
        match self.loop_axes.get(depth) {
            None => {
                let (d, s) = (dst_off as usize, src_off as usize);
                dst[d..d + self.unit].copy_from_slice(&src[s..s + self.unit]);
            }
            Some(axis) => {
                for k in 0..axis.extent as isize {
                    self.copy_axis(
                        depth + 1,
                        dst,
                        src,
                        dst_off + k * axis.dst_stride,
                        src_off + k * axis.src_stride,
                    );
                }
            }
        }
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let extents: Vec<usize> = self.loop_axes.iter().map(|a| a.extent).collect();
        format!(
            "Rearrange {:?} ({} B/elem): {}, {} bursts of {} B, loop extents {:?}, \
             spans dst {} B / src {} B",
            self.shape,
            self.element_size,
            if self.fast_path { "fast path" } else { "strided" },
            self.burst_count(),
            self.unit,
            extents,
            self.dst_span,
            self.src_span,
        )
    }
}

/// Returns `(base, span)` in bytes: the offset of element 0 from the lowest
/// reachable byte, and the number of bytes from there to the highest one.
fn byte_span(shape: &[usize], strides: &[isize], element_size: usize) -> (usize, usize) {
    if shape.iter().any(|&d| d == 0) {
        return (0, 0);
    }
    let (mut lo, mut hi) = (0isize, 0isize);
    for (&dim, &stride) in shape.iter().zip(strides) {
        let reach = (dim as isize - 1) * stride;
        if reach < 0 {
            lo += reach;
        } else {
            hi += reach;
        }
    }
    let base = (-lo) as usize * element_size;
    let span = (hi - lo + 1) as usize * element_size;
    (base, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::index_to_offset;

    /// Writes byte pattern `i` (per element) into a source layout and checks
    /// each element arrives at its destination offset.
    fn check_copy(
        shape: &[usize],
        dst_strides: &[isize],
        src_strides: &[isize],
        elem: usize,
    ) -> RearrangePlan {
        let plan = RearrangePlan::build(shape, dst_strides, src_strides, elem).unwrap();
        let (src_base, _) = byte_span(shape, src_strides, elem);
        let (dst_base, _) = byte_span(shape, dst_strides, elem);
        let mut src = vec![0u8; plan.src_span()];
        let numel: usize = shape.iter().product();
        for i in 0..numel {
            let off = src_base as isize + index_to_offset(i, shape, src_strides) * elem as isize;
            for b in 0..elem {
                src[off as usize + b] = (i * elem + b) as u8;
            }
        }
        let mut dst = vec![0u8; plan.dst_span()];
        plan.launch(&mut dst, &src).unwrap();
        for i in 0..numel {
            let off = dst_base as isize + index_to_offset(i, shape, dst_strides) * elem as isize;
            for b in 0..elem {
                assert_eq!(dst[off as usize + b], (i * elem + b) as u8, "element {i} byte {b}");
            }
        }
        plan
    }

    #[test]
    fn test_fast_path_contiguous() {
        let plan = check_copy(&[4, 5], &[5, 1], &[5, 1], 4);
        assert!(plan.is_fast_path());
        assert!(plan.loop_axes().is_empty());
        assert_eq!(plan.unit(), 20 * 4);
        assert_eq!(plan.burst_count(), 1);
    }

    #[test]
    fn test_merge_stops_at_padded_outer_axis() {
        let plan = check_copy(&[2, 3, 4], &[12, 4, 1], &[24, 4, 1], 4);
        assert!(!plan.is_fast_path());
        assert_eq!(
            plan.loop_axes(),
            &[LoopAxis {
                extent: 2,
                dst_stride: 48,
                src_stride: 96,
            }]
        );
        assert_eq!(plan.unit(), 12 * 4);
        assert_eq!(plan.burst_count(), 2);
        assert_eq!(plan.src_span(), 36 * 4);
    }

    #[test]
    fn test_merge_does_not_resume_after_mismatch() {
        // Axes 0 and 1 are contiguous in both, but 1 and 2 are not in src.
        let plan = check_copy(&[2, 3, 4], &[12, 4, 1], &[24, 8, 1], 2);
        assert_eq!(plan.loop_axes().len(), 2);
        assert_eq!(plan.unit(), 4 * 2);
    }

    #[test]
    fn test_transpose_copies_single_elements() {
        let plan = check_copy(&[2, 3], &[3, 1], &[1, 2], 4);
        assert_eq!(plan.unit(), 4);
        assert_eq!(plan.loop_axes().len(), 2);
        assert_eq!(plan.burst_count(), 6);
    }

    #[test]
    fn test_extent_one_axes_ignored() {
        let plan = check_copy(&[3, 1, 4], &[4, 4, 1], &[4, 99, 1], 1);
        assert!(plan.is_fast_path());
        assert_eq!(plan.unit(), 12);
    }

    #[test]
    fn test_negative_source_stride() {
        let plan = RearrangePlan::build(&[3], &[1], &[-1], 1).unwrap();
        let mut dst = [0u8; 3];
        plan.launch(&mut dst, &[30, 20, 10]).unwrap();
        assert_eq!(dst, [10, 20, 30]);
        check_copy(&[2, 3], &[3, 1], &[-3, 1], 2);
    }

    #[test]
    fn test_scalar_is_single_element_copy() {
        let plan = check_copy(&[], &[], &[], 8);
        assert!(plan.is_fast_path());
        assert_eq!(plan.unit(), 8);
    }

    #[test]
    fn test_zero_extent_copies_nothing() {
        let plan = RearrangePlan::build(&[0, 5], &[5, 1], &[1, 0], 4).unwrap();
        assert_eq!(plan.dst_span(), 0);
        assert_eq!(plan.burst_count(), 0);
        plan.launch(&mut [], &[]).unwrap();
    }

    #[test]
    fn test_row_major_empty_layout_plans() {
        // Row-major strides of [2, 0] are [0, 1].
        let plan = RearrangePlan::build(&[2, 0], &[0, 1], &[0, 1], 4).unwrap();
        assert_eq!(plan.numel(), 0);
        assert_eq!(plan.dst_span(), 0);
        assert_eq!(plan.burst_count(), 0);
        plan.launch(&mut [], &[]).unwrap();
    }

    #[test]
    fn test_build_failures() {
        assert!(RearrangePlan::build(&[2, 3], &[3, 1], &[1], 4).is_none());
        assert!(RearrangePlan::build(&[2, 3], &[3, 1], &[3, 1], 0).is_none());
        // Destination repeats axis 0.
        assert!(RearrangePlan::build(&[2, 3], &[0, 1], &[3, 1], 4).is_none());
        // A source may repeat.
        assert!(RearrangePlan::build(&[2, 3], &[3, 1], &[0, 1], 4).is_some());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let plan = RearrangePlan::build(&[4], &[1], &[1], 4).unwrap();
        let mut dst = vec![0u8; 8];
        let err = plan.launch(&mut dst, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, OpError::BadParam { .. }));
    }

    #[test]
    fn test_summary() {
        let plan = RearrangePlan::build(&[4, 5], &[5, 1], &[5, 1], 2).unwrap();
        let s = plan.summary();
        assert!(s.contains("fast path"));
        assert!(s.contains("40 B"));
    }
}
