// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Return types of the function definitions being generated.
//!
//! Independent of the scope stack: a function's return type stays visible
//! through its nested blocks but is replaced, not inherited, by a nested
//! function definition.

use crate::ast::TypeTag;
use crate::{Error, Result};

/// LIFO stack with one entry per function definition in progress.
#[derive(Debug, Default)]
pub struct FunctionContextStack {
    return_types: Vec<TypeTag>,
}

impl FunctionContextStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entering a function body.
    pub fn enter(&mut self, return_type: TypeTag) {
        self.return_types.push(return_type);
    }

    /// Leaving the innermost function body.
    pub fn exit(&mut self) -> Option<TypeTag> {
        self.return_types.pop()
    }

    /// Return type of the innermost function being generated.
    pub fn current(&self) -> Result<&TypeTag> {
        self.return_types.last().ok_or(Error::Context)
    }

    /// Number of nested function definitions in progress.
    pub fn depth(&self) -> usize {
        self.return_types.len()
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.return_types.clear();
    }
}
