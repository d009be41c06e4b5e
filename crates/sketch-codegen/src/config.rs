// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Code generator options.

use serde::{Deserialize, Serialize};

/// Options for a [`Compiler`](crate::Compiler) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Allow calls to functions that are registered after the call site
    pub forward_calls: bool,

    /// Append `Halt` after generation
    pub emit_halt: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            forward_calls: true,
            emit_halt: false,
        }
    }
}
