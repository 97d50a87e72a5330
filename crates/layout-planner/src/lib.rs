// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # layout-planner
//!
//! Turns tensor descriptors into immutable plans that kernels replay on
//! every execute.
//!
//! # Plans
//!
//! | Plan | Built from | Used by | Decides |
//! |---|---|---|---|
//! | [`ElementwiseInfo`] | output + N input descriptors | add, swiglu | per-tensor index strategy |
//! | [`RearrangePlan`] | one shape, two stride sets | rearrange | merged axes and burst length |
//!
//! Both plans copy every shape and stride they need, so they outlive the
//! descriptors that produced them and can be shared read-only between
//! concurrent executes.
//!
//! # Example
//! ```
//! use layout_planner::RearrangePlan;
//!
//! // [2, 3, 4] with the source's outer axis padded to 24 elements.
//! let plan = RearrangePlan::build(&[2, 3, 4], &[12, 4, 1], &[24, 4, 1], 4).unwrap();
//! assert_eq!(plan.loop_axes().len(), 1);
//! assert_eq!(plan.unit(), 12 * 4);
//! println!("{}", plan.summary());
//! ```

mod elementwise;
mod rearrange;

pub use elementwise::{ElementwiseInfo, IndexStrategy};
pub use rearrange::{LoopAxis, RearrangePlan};
