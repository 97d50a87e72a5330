// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the operator runtime.

/// Errors raised outside a single operator call.
///
/// Operator entry points return [`tensor_core::OpError`] directly; this type
/// adds the configuration failures that occur while assembling a registry.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// An operator call failed.
    #[error("operator error: {0}")]
    OpError(#[from] tensor_core::OpError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{OpError, Status};

    #[test]
    fn test_from_op_error() {
        let err: RuntimeError = OpError::InsufficientWorkspace {
            required: 64,
            provided: 0,
        }
        .into();
        match &err {
            RuntimeError::OpError(inner) => {
                assert_eq!(inner.status(), Status::InsufficientWorkspace)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().starts_with("operator error"));
    }
}
