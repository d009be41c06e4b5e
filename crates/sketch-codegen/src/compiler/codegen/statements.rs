// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statement compilation.
//!
//! | Statement | Key Operations | Notes |
//! |-----------|----------------|-------|
//! | block | `PUSHSC` ... `POPSC` | New scope frame |
//! | function | body, `RET` | Frame comes from `CALL` |
//! | `int x;` | none | Reserves a slot |
//! | `int x = e;` | `STORE 0 slot` | |
//! | `if`/`ifElse` | `JMPF`, `JMP` | Forward jumps patched |
//! | `while` | `JMPF`, `JMP` (back) | |
//! | `do`/`while` | `JMPT` (back) | |
//! | `for` | `PUSHSC`, jumps, `POPSC` | Init is loop-scoped |
//! | `return` | `RET` / `RETV` | Needs an enclosing function |
//!
//! ### Function Layout
//!
//! ```text
//! function int add(int a, int b) { return a + b; }
//!
//! add:              ; label address = PC at registration
//!   LOAD 0 0
//!   LOAD 0 1
//!   ADD
//!   RETV
//!   RET             ; implicit return, always emitted
//! ```
//!
//! The body is emitted in place. Entry happens only through `CALL` or the
//! VM's `init`/`render` entry points. A function defined inside another
//! function's body, or any function when the program ends in `HALT`, is
//! preceded by a `JMP` over it.
//!
//! ### While Loop
//!
//! ```text
//! start:
//!   [condition]
//!   JMPF end
//!   [body]
//!   JMP start
//! end:
//! ```

use crate::Result;
use crate::ast::{Ast, Param, TypeTag};
use crate::compiler::bytecode::{CodeWord, OpCode};

use super::{Compiler, FunctionSignature, LabelKind, Usage};

impl Compiler {
    pub(super) fn compile_program(&mut self, body: &Ast) -> Result<()> {
        self.dispatch(body, Usage::Discard)
    }

    pub(super) fn compile_block(&mut self, body: &Ast) -> Result<()> {
        self.push_scope(false);
        self.dispatch(body, Usage::Discard)?;
        self.pop_scope(false)
    }

    pub(super) fn compile_function(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: &TypeTag,
        body: &Ast,
    ) -> Result<()> {
        // Code that runs straight through (an enclosing body, or the whole
        // store when it ends in HALT) must not fall into this one
        let skip_body = if self.functions.depth() > 0 || self.config.emit_halt {
            Some(self.emit_jump(OpCode::Jump))
        } else {
            None
        };

        let signature = FunctionSignature {
            params: params.to_vec(),
            return_type: return_type.clone(),
        };
        self.register_label(name, LabelKind::Function, Some(signature))?;

        self.enter_function(return_type.clone());
        self.push_scope(true);

        // Arguments arrive in slots 0..n of the callee frame
        for param in params {
            self.register_label(&param.name, LabelKind::Variable(param.ty.clone()), None)?;
        }

        self.dispatch(body, Usage::Discard)?;
        self.emit(OpCode::Return);

        self.pop_scope(true)?;
        self.exit_function();

        if let Some(hole) = skip_body {
            self.patch_jump(hole)?;
        }
        Ok(())
    }

    pub(super) fn compile_return(&mut self, value: &Ast) -> Result<()> {
        let returns_value = !self.current_function_type()?.is_void();

        if value.is_empty() {
            self.emit(OpCode::Return);
            return Ok(());
        }

        self.dispatch(value, Usage::Value)?;
        if returns_value {
            self.emit(OpCode::ReturnValue);
        } else {
            self.emit(OpCode::Pop);
            self.emit(OpCode::Return);
        }
        Ok(())
    }

    pub(super) fn compile_variable_decl(&mut self, ty: &TypeTag, name: &str) -> Result<()> {
        self.register_label(name, LabelKind::Variable(ty.clone()), None)?;
        Ok(())
    }

    pub(super) fn compile_variable_decl_assign(
        &mut self,
        ty: &TypeTag,
        name: &str,
        value: &Ast,
    ) -> Result<()> {
        // The initializer sees the enclosing binding, not the new one
        self.dispatch(value, Usage::Value)?;
        let slot = self.register_label(name, LabelKind::Variable(ty.clone()), None)?;

        self.emit(OpCode::Store);
        self.emit(CodeWord::Int(0));
        self.emit(CodeWord::Int(slot as i64));
        Ok(())
    }

    pub(super) fn compile_if(&mut self, cond: &Ast, body: &Ast) -> Result<()> {
        self.dispatch(cond, Usage::Value)?;
        let jump_to_end = self.emit_jump(OpCode::JumpIfFalse);

        self.dispatch(body, Usage::Discard)?;

        self.patch_jump(jump_to_end)
    }

    pub(super) fn compile_if_else(
        &mut self,
        cond: &Ast,
        body: &Ast,
        else_body: &Ast,
    ) -> Result<()> {
        self.dispatch(cond, Usage::Value)?;
        let jump_to_else = self.emit_jump(OpCode::JumpIfFalse);

        self.dispatch(body, Usage::Discard)?;
        let jump_to_end = self.emit_jump(OpCode::Jump);

        self.patch_jump(jump_to_else)?;
        self.dispatch(else_body, Usage::Discard)?;

        self.patch_jump(jump_to_end)
    }

    pub(super) fn compile_while(&mut self, cond: &Ast, body: &Ast) -> Result<()> {
        let loop_start = self.current_address();

        self.dispatch(cond, Usage::Value)?;
        let jump_to_end = self.emit_jump(OpCode::JumpIfFalse);

        self.dispatch(body, Usage::Discard)?;

        self.emit(OpCode::Jump);
        self.emit(CodeWord::Addr(loop_start));

        self.patch_jump(jump_to_end)
    }

    pub(super) fn compile_do_while(&mut self, cond: &Ast, body: &Ast) -> Result<()> {
        let loop_start = self.current_address();

        self.dispatch(body, Usage::Discard)?;
        self.dispatch(cond, Usage::Value)?;

        self.emit(OpCode::JumpIfTrue);
        self.emit(CodeWord::Addr(loop_start));
        Ok(())
    }

    pub(super) fn compile_for(
        &mut self,
        init: &Ast,
        cond: &Ast,
        update: &Ast,
        body: &Ast,
    ) -> Result<()> {
        self.push_scope(false);
        self.dispatch(init, Usage::Discard)?;

        let loop_start = self.current_address();

        let jump_to_end = if cond.is_empty() {
            None
        } else {
            self.dispatch(cond, Usage::Value)?;
            Some(self.emit_jump(OpCode::JumpIfFalse))
        };

        self.dispatch(body, Usage::Discard)?;
        self.dispatch(update, Usage::Discard)?;

        self.emit(OpCode::Jump);
        self.emit(CodeWord::Addr(loop_start));

        if let Some(hole) = jump_to_end {
            self.patch_jump(hole)?;
        }

        self.pop_scope(false)
    }
}
