// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode compiler for Sketch.
//!
//! Transforms the AST into bytecode for the MVM.
//!
//! # Module Structure
//!
//! - `bytecode`: opcodes, code words and the code store
//! - `codegen`: code generation from AST
//!   - `codegen::scope`: scope frames and label resolution
//!   - `codegen::function`: return types of functions in progress
//! - `disasm`: program listings

pub mod bytecode;
pub mod codegen;
pub mod disasm;

pub use bytecode::{Address, CodeBuffer, CodeWord, CompiledProgram, OpCode};
pub use codegen::{Compiler, Usage};
pub use disasm::disassemble;
