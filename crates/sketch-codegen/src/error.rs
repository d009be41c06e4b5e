// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the code generator

use thiserror::Error;

/// Result type for code generation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a compile
#[derive(Debug, Error)]
pub enum Error {
    /// Name already registered in the current scope frame
    #[error("Illegal attempt to redefine '{0}' in the same scope")]
    Redefinition(String),

    /// Name not registered in any enclosing scope frame
    #[error("Unresolved reference to '{0}'")]
    UnresolvedReference(String),

    /// Return type requested outside of any function definition
    #[error("Not currently defining a function, no return type available")]
    Context,

    /// AST node kind with no handler
    #[error("No code generator for node kind '{0}'")]
    Dispatch(String),

    /// Label used as the wrong kind of thing
    #[error("'{name}' is not a {expected}")]
    KindMismatch {
        /// The offending label
        name: String,
        /// What the use site needed ("function" or "variable")
        expected: &'static str,
    },

    /// Attempt to pop the program root frame
    #[error("Scope stack underflow: the root frame cannot be popped")]
    ScopeUnderflow,

    /// Patch of an address that was never emitted
    #[error("Cannot patch address {address}: only {len} words emitted")]
    PatchOutOfRange {
        /// Requested address
        address: usize,
        /// Buffer length at the time of the patch
        len: usize,
    },

    /// Node arguments of the wrong shape
    #[error("Malformed AST: {0}")]
    InvalidAst(String),

    /// Input is not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed-AST error
    pub fn invalid_ast(msg: impl Into<String>) -> Self {
        Self::InvalidAst(msg.into())
    }

    /// Create a kind mismatch where a function was required
    pub fn not_a_function(name: impl Into<String>) -> Self {
        Self::KindMismatch {
            name: name.into(),
            expected: "function",
        }
    }

    /// Create a kind mismatch where a variable was required
    pub fn not_a_variable(name: impl Into<String>) -> Self {
        Self::KindMismatch {
            name: name.into(),
            expected: "variable",
        }
    }
}
