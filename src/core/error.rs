// Copyright 2025 Relalg Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for relalg
//!
//! Every failure in this layer is a contract violation: a mistyped
//! comparison, a mismatched schema, an out-of-range column index. There is
//! no recovery path; errors propagate up the operator tree and abort the
//! query. End-of-stream is not an error and is signalled through
//! `Operator::advance` returning `false`.

use thiserror::Error;

/// Result type alias for relalg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for query execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Register errors
    // =========================================================================
    /// Registers of different variants cannot be compared
    #[error("cannot compare registers of different types")]
    IncomparableTypes,

    /// String payload exceeds the fixed CHAR16 width
    #[error("string too long for CHAR16, max {max} bytes, got {got}")]
    StringTooLong { max: usize, got: usize },

    // =========================================================================
    // Schema errors
    // =========================================================================
    /// Column index outside the input schema
    #[error("column index {index} out of bounds for arity {arity}")]
    ColumnIndexOutOfBounds { index: usize, arity: usize },

    /// Binary operator inputs disagree on column count
    #[error("inputs don't match, left has {left} columns, right has {right}")]
    ColumnCountMismatch { left: usize, right: usize },

    /// Binary operator inputs disagree on a column's variant
    #[error("column {index} variant mismatch between inputs")]
    ColumnTypeMismatch { index: usize },

    // =========================================================================
    // Aggregation errors
    // =========================================================================
    /// SUM is only defined over INT64 columns
    #[error("SUM requires an INT64 input column, column {index} is CHAR16")]
    SumColumnNotInt64 { index: usize },

    // =========================================================================
    // Other errors
    // =========================================================================
    /// IO error (wrapped), raised by the Print sink
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new StringTooLong error
    pub fn string_too_long(max: usize, got: usize) -> Self {
        Error::StringTooLong { max, got }
    }

    /// Create a new ColumnIndexOutOfBounds error
    pub fn column_out_of_bounds(index: usize, arity: usize) -> Self {
        Error::ColumnIndexOutOfBounds { index, arity }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a schema-shape error
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::ColumnIndexOutOfBounds { .. }
                | Error::ColumnCountMismatch { .. }
                | Error::ColumnTypeMismatch { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
