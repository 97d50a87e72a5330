// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed element access over raw byte buffers.
//!
//! Operator buffers arrive as `&[u8]` with no alignment guarantee, so
//! reads and writes go through `bytemuck`'s unaligned helpers.

use crate::DType;
use half::{bf16, f16};

/// A Rust scalar type that stores one [`DType`].
pub trait Element: bytemuck::Pod + PartialEq + std::fmt::Debug {
    /// The descriptor dtype this type represents.
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_element!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f16 => F16,
    bf16 => BF16,
    f32 => F32,
    f64 => F64,
);

/// Reads the element at `offset` (in elements) from `bytes`.
///
/// # Panics
/// Panics if the element lies outside `bytes`.
#[inline]
pub fn read_elem<T: Element>(bytes: &[u8], offset: usize) -> T {
    let size = std::mem::size_of::<T>();
    let start = offset * size;
    bytemuck::pod_read_unaligned(&bytes[start..start + size])
}

/// Writes `value` at `offset` (in elements) into `bytes`.
///
/// # Panics
/// Panics if the element lies outside `bytes`.
#[inline]
pub fn write_elem<T: Element>(bytes: &mut [u8], offset: usize, value: T) {
    let size = std::mem::size_of::<T>();
    let start = offset * size;
    bytes[start..start + size].copy_from_slice(bytemuck::bytes_of(&value));
}
