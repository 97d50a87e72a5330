// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Device-agnostic tensor layout primitives shared by every operator.
//!
//! This crate provides:
//! - [`DType`]: the closed set of supported element types.
//! - [`TensorDesc`]: an immutable dtype + shape + signed-stride descriptor
//!   answering layout predicates (contiguity, broadcast axes, spans).
//! - [`index_to_offset`] / [`index_to_reduced_offset`]: the linear-index
//!   mapping every strided kernel runs once per element.
//! - [`OpError`] / [`Status`]: the status taxonomy returned by every
//!   operator entry point.
//! - [`Tensor`]: an owned host buffer in an arbitrary strided layout, used by
//!   the CPU backend's callers and tests.
//!
//! Nothing here allocates on the per-element path, performs I/O or logs.

mod desc;
mod dtype;
mod element;
mod error;
mod index;
mod shape;
mod tensor;

pub use desc::TensorDesc;
pub use dtype::DType;
pub use element::{read_elem, write_elem, Element};
pub use error::{OpError, Status};
pub use index::{index_to_offset, index_to_reduced_offset, reduced_strides};
pub use shape::{contiguous_strides, Shape};
pub use tensor::Tensor;

pub use half::{bf16, f16};
