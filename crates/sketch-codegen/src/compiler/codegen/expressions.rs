// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expression compilation.
//!
//! Expressions leave exactly one value on the stack; in [`Usage::Discard`]
//! position it is popped straight away. Variables are addressed by
//! `(relative depth, slot)`:
//!
//! ```text
//! x = x + 1;        ; x declared one scope out, slot 2
//!
//!   LOAD 1 2
//!   PUSH 1
//!   ADD
//!   STORE 1 2
//! ```
//!
//! ## Logical Operators (Short-Circuit)
//!
//! ```text
//! a && b
//!
//!   [a]
//!   DUP
//!   JMPF end       ; JMPT for ||
//!   POP
//!   [b]
//! end:
//! ```
//!
//! ## Calls
//!
//! `CALL target argc`. Every call yields one value; `RET` yields a unit
//! value. A callee that is not registered yet gets a placeholder target,
//! patched when a frame on the way out to the root defines it.

use tracing::debug;

use crate::ast::{Ast, BinaryOp, Literal, LogicalOp, UnaryOp};
use crate::compiler::bytecode::{CodeWord, OpCode};
use crate::{Error, Result};

use super::{Compiler, PendingCall, Usage};

impl Compiler {
    pub(super) fn compile_identifier(&mut self, name: &str, usage: Usage) -> Result<()> {
        self.load_variable(name)?;
        self.finish(usage);
        Ok(())
    }

    pub(super) fn compile_literal(&mut self, lit: &Literal, usage: Usage) -> Result<()> {
        let word = match lit {
            Literal::Int(n) => CodeWord::Int(*n),
            Literal::Float(x) => CodeWord::Float(*x),
            Literal::Bool(b) => CodeWord::Bool(*b),
            Literal::Str(s) => CodeWord::Str(s.clone()),
        };
        self.emit(OpCode::Push);
        self.emit(word);
        self.finish(usage);
        Ok(())
    }

    pub(super) fn compile_assign(&mut self, name: &str, value: &Ast, usage: Usage) -> Result<()> {
        self.dispatch(value, Usage::Value)?;
        self.store_variable(name, usage)
    }

    pub(super) fn compile_compound_assign(
        &mut self,
        op: BinaryOp,
        name: &str,
        value: &Ast,
        usage: Usage,
    ) -> Result<()> {
        self.load_variable(name)?;
        self.dispatch(value, Usage::Value)?;
        self.emit(op.opcode());
        self.store_variable(name, usage)
    }

    /// `x++` / `x--`
    pub(super) fn compile_step(&mut self, name: &str, op: OpCode, usage: Usage) -> Result<()> {
        self.load_variable(name)?;
        self.emit(OpCode::Push);
        self.emit(CodeWord::Int(1));
        self.emit(op);
        self.store_variable(name, usage)
    }

    pub(super) fn compile_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Ast,
        rhs: &Ast,
        usage: Usage,
    ) -> Result<()> {
        self.dispatch(lhs, Usage::Value)?;
        self.dispatch(rhs, Usage::Value)?;
        self.emit(op.opcode());
        self.finish(usage);
        Ok(())
    }

    pub(super) fn compile_logical(
        &mut self,
        op: LogicalOp,
        lhs: &Ast,
        rhs: &Ast,
        usage: Usage,
    ) -> Result<()> {
        self.dispatch(lhs, Usage::Value)?;
        self.emit(OpCode::Dup);

        let short_circuit = match op {
            LogicalOp::And => OpCode::JumpIfFalse,
            LogicalOp::Or => OpCode::JumpIfTrue,
        };
        let jump_to_end = self.emit_jump(short_circuit);

        self.emit(OpCode::Pop);
        self.dispatch(rhs, Usage::Value)?;

        self.patch_jump(jump_to_end)?;
        self.finish(usage);
        Ok(())
    }

    pub(super) fn compile_unary(
        &mut self,
        op: UnaryOp,
        operand: &Ast,
        usage: Usage,
    ) -> Result<()> {
        self.dispatch(operand, Usage::Value)?;
        self.emit(op.opcode());
        self.finish(usage);
        Ok(())
    }

    pub(super) fn compile_call(&mut self, name: &str, args: &[Ast], usage: Usage) -> Result<()> {
        for arg in args {
            self.dispatch(arg, Usage::Value)?;
        }

        let target = match self.find_label(name) {
            Some(resolved) if resolved.label.kind.is_function() => Some(resolved.label.address),
            Some(_) => return Err(Error::not_a_function(name)),
            None => None,
        };

        self.emit(OpCode::Call);
        match target {
            Some(address) => {
                self.emit(CodeWord::Addr(address));
            }
            None if self.config.forward_calls => {
                let patch_at = self.code.emit_placeholder();
                debug!(name, patch_at, "forward call");
                self.scopes.defer_call(PendingCall {
                    name: name.to_string(),
                    patch_at,
                });
            }
            None => return Err(Error::UnresolvedReference(name.to_string())),
        }
        self.emit(CodeWord::Int(args.len() as i64));

        self.finish(usage);
        Ok(())
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    fn load_variable(&mut self, name: &str) -> Result<()> {
        let (depth, slot) = self.variable_address(name)?;
        self.emit(OpCode::Load);
        self.emit(CodeWord::Int(depth));
        self.emit(CodeWord::Int(slot));
        Ok(())
    }

    /// Stores the top of stack into `name`, keeping a copy for [`Usage::Value`].
    fn store_variable(&mut self, name: &str, usage: Usage) -> Result<()> {
        let (depth, slot) = self.variable_address(name)?;
        if usage == Usage::Value {
            self.emit(OpCode::Dup);
        }
        self.emit(OpCode::Store);
        self.emit(CodeWord::Int(depth));
        self.emit(CodeWord::Int(slot));
        Ok(())
    }

    fn variable_address(&self, name: &str) -> Result<(i64, i64)> {
        let resolved = self.lookup_label(name)?;
        if resolved.label.kind.is_function() {
            return Err(Error::not_a_variable(name));
        }
        Ok((resolved.relative_depth as i64, resolved.label.address as i64))
    }

    fn finish(&mut self, usage: Usage) {
        if usage == Usage::Discard {
            self.emit(OpCode::Pop);
        }
    }
}
