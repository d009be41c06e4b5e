// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # sketch-codegen
//!
//! Code generator for the Sketch drawing language.
//!
//! ## Overview
//!
//! Takes the tree produced by the Sketch parser and lowers it into a flat
//! code store for the MVM stack machine:
//! - Closed AST with JSON decoding of the parser output
//! - Bytecode buffer with reserve/patch support for forward jumps
//! - Nested scope frames with per-frame label tables and slot allocation
//! - Entry-point resolution for the `init` and `render` functions
//!
//! ## Quick Start
//!
//! ```rust
//! use sketch_codegen::{Ast, Compiler};
//!
//! let ast = Ast::from_json(
//!     r#"[{"type": "function", "arguments": ["init", [], "void", ""]}]"#,
//! )?;
//! let program = Compiler::new().compile(&ast)?;
//! assert_eq!(program.init_address, Some(0));
//! assert_eq!(program.render_address, None);
//! # Ok::<(), sketch_codegen::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use ast::{Ast, Node, TypeTag};
pub use compiler::{CodeWord, CompiledProgram, Compiler, OpCode, disassemble};
pub use config::CompilerConfig;
pub use error::{Error, Result};

/// Decodes a JSON AST and compiles it with the given options.
pub fn compile_json(source: &str, config: CompilerConfig) -> Result<CompiledProgram> {
    let ast = Ast::from_json(source)?;
    Compiler::with_config(config).compile(&ast)
}
