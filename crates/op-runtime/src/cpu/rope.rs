// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rotary position embedding, in place.

use super::buffer_count;
use super::float::{acc_size, FloatElem};
use crate::ops::RopeInfo;
use crate::{OpKernel, OpKind};
use tensor_core::{read_elem, write_elem, DType, OpError};

const OP: &str = OpKind::Rope.as_str();

#[derive(Debug)]
pub(crate) struct RopeKernel {
    info: RopeInfo,
}

/// Reads one position id of an unsigned `dtype`.
fn read_pos(dtype: DType, bytes: &[u8], offset: usize) -> Result<u64, OpError> {
    Ok(match dtype {
        DType::U8 => u64::from(read_elem::<u8>(bytes, offset)),
        DType::U16 => u64::from(read_elem::<u16>(bytes, offset)),
        DType::U32 => u64::from(read_elem::<u32>(bytes, offset)),
        DType::U64 => read_elem::<u64>(bytes, offset),
        other => return Err(OpError::bad_dtype(OP, other)),
    })
}

impl RopeKernel {
    pub(crate) fn new(info: &RopeInfo) -> Result<Self, OpError> {
        acc_size(OP, info.dtype)?;
        if !info.pos_dtype.is_unsigned_int() {
            return Err(OpError::bad_dtype(OP, info.pos_dtype));
        }
        Ok(Self { info: info.clone() })
    }

    fn position(&self, pos: &[u8], token: usize) -> Result<u64, OpError> {
        let info = &self.info;
        let offset = info.pos_base as isize + token as isize * info.pos_stride;
        read_pos(info.pos_dtype, pos, offset as usize)
    }

    /// Every position must index both tables before any token is rotated.
    fn check_positions(&self, pos: &[u8]) -> Result<(), OpError> {
        let info = &self.info;
        for token in 0..info.nt {
            let p = self.position(pos, token)?;
            if p >= info.nsin as u64 || p >= info.ncos as u64 {
                return Err(OpError::bad_shape(
                    OP,
                    format!(
                        "position {p} of token {token} is outside the sin/cos tables \
                         ({} / {} rows)",
                        info.nsin, info.ncos
                    ),
                ));
            }
        }
        Ok(())
    }

    fn run<T: FloatElem>(
        &self,
        t: &mut [u8],
        pos: &[u8],
        sin: &[u8],
        cos: &[u8],
    ) -> Result<(), OpError> {
        self.check_positions(pos)?;
        let info = &self.info;
        for token in 0..info.nt {
            let p = self.position(pos, token)? as isize;
            let sin_row = info.sin_base as isize + p * info.sin_strides[0];
            let cos_row = info.cos_base as isize + p * info.cos_strides[0];
            let t_row = info.t_base as isize + token as isize * info.t_strides[0];

            for head in 0..info.nh {
                let t_head = t_row + head as isize * info.t_strides[1];
                for k in 0..info.dh as isize / 2 {
                    let si = (sin_row + k * info.sin_strides[1]) as usize;
                    let ci = (cos_row + k * info.cos_strides[1]) as usize;
                    let s = T::acc_from_f32(read_elem::<f32>(sin, si));
                    let c = T::acc_from_f32(read_elem::<f32>(cos, ci));
                    let ia = (t_head + 2 * k) as usize;
                    let a = read_elem::<T>(t, ia).to_acc();
                    let b = read_elem::<T>(t, ia + 1).to_acc();
                    write_elem(t, ia, T::from_acc(a * c - b * s));
                    write_elem(t, ia + 1, T::from_acc(a * s + b * c));
                }
            }
        }
        Ok(())
    }
}

impl OpKernel for RopeKernel {
    fn workspace_size(&self) -> usize {
        0
    }

    fn launch(
        &self,
        _workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError> {
        let ([t], [pos, sin, cos]) = (outputs, inputs) else {
            return Err(buffer_count(OP));
        };
        dispatch_float!(self.info.dtype, OP, T => self.run::<T>(t, pos, sin, cos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_pos_widths() {
        let bytes = 0x0102_0304_0506_0708u64.to_le_bytes();
        assert_eq!(read_pos(DType::U8, &bytes, 1).unwrap(), 0x07);
        assert_eq!(read_pos(DType::U16, &bytes, 0).unwrap(), 0x0708);
        assert_eq!(read_pos(DType::U32, &bytes, 1).unwrap(), 0x0102_0304);
        assert_eq!(read_pos(DType::U64, &bytes, 0).unwrap(), 0x0102_0304_0506_0708);
        assert!(read_pos(DType::I32, &bytes, 0).is_err());
    }
}
