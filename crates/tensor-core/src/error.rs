// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The status taxonomy shared by every operator entry point.
//!
//! Library code returns [`OpError`]; a C-style boundary folds the result into
//! a numeric [`Status`] with [`Status::from_result`].

use crate::DType;

/// Errors that operator planning, dispatch and execution can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    /// A required descriptor or parameter is missing or malformed.
    #[error("bad parameter for {op}: {detail}")]
    BadParam { op: &'static str, detail: String },

    /// Rank or extent mismatch between tensors that must agree.
    #[error("bad tensor shape for {op}: {detail}")]
    BadTensorShape { op: &'static str, detail: String },

    /// A layout constraint is violated.
    #[error("bad tensor strides for {op}: {detail}")]
    BadTensorStrides { op: &'static str, detail: String },

    /// Element type unsupported or mismatched.
    #[error("unsupported dtype {dtype} for {op}")]
    BadTensorDtype { op: &'static str, dtype: DType },

    /// Caller-supplied workspace is smaller than the queried requirement.
    #[error("insufficient workspace: required {required} bytes, got {provided}")]
    InsufficientWorkspace { required: usize, provided: usize },

    /// Dispatch reached a device kind with no registered backend.
    #[error("device type {0} is not supported")]
    DeviceTypeNotSupported(String),

    /// An invariant inside the engine was violated.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl OpError {
    /// Shorthand for [`OpError::BadParam`].
    pub fn bad_param(op: &'static str, detail: impl Into<String>) -> Self {
        OpError::BadParam {
            op,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`OpError::BadTensorShape`].
    pub fn bad_shape(op: &'static str, detail: impl Into<String>) -> Self {
        OpError::BadTensorShape {
            op,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`OpError::BadTensorStrides`].
    pub fn bad_strides(op: &'static str, detail: impl Into<String>) -> Self {
        OpError::BadTensorStrides {
            op,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`OpError::BadTensorDtype`].
    pub fn bad_dtype(op: &'static str, dtype: DType) -> Self {
        OpError::BadTensorDtype { op, dtype }
    }

    /// Returns the numeric status code for this error.
    pub fn status(&self) -> Status {
        match self {
            OpError::BadParam { .. } => Status::BadParam,
            OpError::BadTensorShape { .. } => Status::BadTensorShape,
            OpError::BadTensorStrides { .. } => Status::BadTensorStrides,
            OpError::BadTensorDtype { .. } => Status::BadTensorDtype,
            OpError::InsufficientWorkspace { .. } => Status::InsufficientWorkspace,
            OpError::DeviceTypeNotSupported(_) => Status::DeviceTypeNotSupported,
            OpError::InternalError(_) => Status::InternalError,
        }
    }
}

/// Numeric status codes returned across a C-style boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    InternalError = 1,
    BadParam = 3,
    DeviceTypeNotSupported = 5,
    BadTensorDtype = 10,
    BadTensorShape = 11,
    BadTensorStrides = 12,
    InsufficientWorkspace = 13,
}

impl Status {
    /// Folds an operator result into its status code.
    pub fn from_result<T>(result: &Result<T, OpError>) -> Status {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    /// Returns the raw integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns `true` for [`Status::Success`].
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let e = OpError::bad_strides("rearrange", "destination is broadcast");
        assert_eq!(e.status(), Status::BadTensorStrides);
        assert_eq!(
            OpError::InsufficientWorkspace {
                required: 8,
                provided: 4
            }
            .status()
            .code(),
            13
        );
    }

    #[test]
    fn test_from_result() {
        let ok: Result<(), OpError> = Ok(());
        assert!(Status::from_result(&ok).is_success());
        let err: Result<(), OpError> = Err(OpError::bad_dtype("rope", DType::I8));
        assert_eq!(Status::from_result(&err), Status::BadTensorDtype);
    }

    #[test]
    fn test_display() {
        let e = OpError::bad_dtype("rms_norm", DType::U8);
        assert_eq!(e.to_string(), "unsupported dtype u8 for rms_norm");
    }
}
