// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Code generation from AST to bytecode.
//!
//! This module contains the [`Compiler`], one code generation session. It
//! owns the code store, the scope stack and the function context stack, and
//! exposes them to the node handlers in `statements` and `expressions`.

mod expressions;
mod function;
mod scope;
mod statements;


pub use function::FunctionContextStack;
pub use scope::{
    FunctionSignature, Label, LabelKind, PendingCall, Resolved, ScopeFrame, ScopeStack,
};

use tracing::{debug, trace};

use crate::ast::{Ast, Node, TypeTag};
use crate::compiler::bytecode::{Address, CodeBuffer, CodeWord, CompiledProgram, OpCode};
use crate::config::CompilerConfig;
use crate::{Error, Result};

/// How the surrounding code uses the value of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// Leave the value on the stack
    Value,
    /// Evaluate for side effects only; the value is popped
    Discard,
}

/// Compiles Sketch ASTs to MVM bytecode.
///
/// A session may be reused: [`Compiler::compile`] resets all state first,
/// including after a failed compile.
#[derive(Debug)]
pub struct Compiler {
    code: CodeBuffer,
    scopes: ScopeStack,
    functions: FunctionContextStack,
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a new compiler with default options.
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    /// Creates a new compiler with the given options.
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            code: CodeBuffer::new(),
            scopes: ScopeStack::new(),
            functions: FunctionContextStack::new(),
            config,
        }
    }

    /// The options this session was created with.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    // ========================================================================
    // Main Compilation Entry Point
    // ========================================================================

    /// Compiles a program (the body of the parser's `program` node).
    pub fn compile(&mut self, program: &Ast) -> Result<CompiledProgram> {
        self.reset();

        self.compile_program(program)?;
        self.resolve_root_calls()?;

        if self.config.emit_halt {
            self.emit(OpCode::Halt);
        }

        let init_address = self.entry_point("init");
        let render_address = self.entry_point("render");

        debug!(
            words = self.code.len(),
            ?init_address,
            ?render_address,
            "compiled program"
        );

        Ok(CompiledProgram {
            code: std::mem::take(&mut self.code).into_words(),
            init_address,
            render_address,
        })
    }

    /// Discards all session state: empty code store, a single empty root
    /// frame, no function in progress.
    pub fn reset(&mut self) {
        self.code.clear();
        self.scopes.reset();
        self.functions.clear();
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Generates code for a node, a sequence of nodes (in order) or nothing.
    pub fn dispatch(&mut self, ast: &Ast, usage: Usage) -> Result<()> {
        match ast {
            Ast::Empty => Ok(()),
            Ast::Sequence(items) => {
                for item in items {
                    self.dispatch(item, usage)?;
                }
                Ok(())
            }
            Ast::Node(node) => self.dispatch_node(node, usage),
        }
    }

    fn dispatch_node(&mut self, node: &Node, usage: Usage) -> Result<()> {
        debug!(kind = node.kind(), depth = self.scopes.depth(), "generate");

        match node {
            Node::Program(body) => self.compile_program(body),
            Node::Block(body) => self.compile_block(body),
            Node::Function {
                name,
                params,
                return_type,
                body,
            } => self.compile_function(name, params, return_type, body),
            Node::Return(value) => self.compile_return(value),
            Node::VariableDecl { ty, name } => self.compile_variable_decl(ty, name),
            Node::VariableDeclAssign { ty, name, value } => {
                self.compile_variable_decl_assign(ty, name, value)
            }
            Node::Assign { name, value } => self.compile_assign(name, value, usage),
            Node::CompoundAssign { op, name, value } => {
                self.compile_compound_assign(*op, name, value, usage)
            }
            Node::Increment(name) => self.compile_step(name, OpCode::Add, usage),
            Node::Decrement(name) => self.compile_step(name, OpCode::Sub, usage),
            Node::If { cond, body } => self.compile_if(cond, body),
            Node::IfElse {
                cond,
                body,
                else_body,
            } => self.compile_if_else(cond, body, else_body),
            Node::While { cond, body } => self.compile_while(cond, body),
            Node::DoWhile { cond, body } => self.compile_do_while(cond, body),
            Node::For {
                init,
                cond,
                update,
                body,
            } => self.compile_for(init, cond, update, body),
            Node::Call { name, args } => self.compile_call(name, args, usage),
            Node::Binary { op, lhs, rhs } => self.compile_binary(*op, lhs, rhs, usage),
            Node::Logical { op, lhs, rhs } => self.compile_logical(*op, lhs, rhs, usage),
            Node::Unary { op, operand } => self.compile_unary(*op, operand, usage),
            Node::Identifier(name) => self.compile_identifier(name, usage),
            Node::Literal(lit) => self.compile_literal(lit, usage),
        }
    }

    // ========================================================================
    // Code Store
    // ========================================================================

    /// Appends a word and returns its address.
    pub fn emit(&mut self, word: impl Into<CodeWord>) -> Address {
        self.code.emit(word)
    }

    /// Overwrites a previously emitted word.
    pub fn patch(&mut self, address: Address, word: impl Into<CodeWord>) -> Result<()> {
        self.code.patch(address, word)
    }

    /// The address the next emit will use.
    pub fn current_address(&self) -> Address {
        self.code.current_address()
    }

    /// The code emitted so far.
    pub fn code(&self) -> &CodeBuffer {
        &self.code
    }

    /// Emits `op` followed by a target placeholder; returns the placeholder.
    fn emit_jump(&mut self, op: OpCode) -> Address {
        self.emit(op);
        self.code.emit_placeholder()
    }

    /// Points a placeholder from [`Compiler::emit_jump`] at the current address.
    fn patch_jump(&mut self, hole: Address) -> Result<()> {
        let target = self.current_address();
        self.code.patch_address(hole, target)
    }

    // ========================================================================
    // Scopes and Labels
    // ========================================================================

    /// Opens a scope frame. Emits `EnterScope` unless the runtime frame is
    /// provided some other way (function bodies get theirs from `Call`).
    pub fn push_scope(&mut self, suppress_runtime_op: bool) {
        self.scopes.push();
        trace!(depth = self.scopes.depth(), suppress_runtime_op, "push scope");
        if !suppress_runtime_op {
            self.emit(OpCode::EnterScope);
        }
    }

    /// Closes the innermost scope frame, settling the forward calls made
    /// from it. Emits `ExitScope` unless suppressed.
    pub fn pop_scope(&mut self, suppress_runtime_op: bool) -> Result<()> {
        let mut frame = self.scopes.pop()?;
        for call in frame.take_pending() {
            if let Some(call) = settle_call(&mut self.code, &frame, call)? {
                self.scopes.defer_call(call);
            }
        }

        trace!(depth = self.scopes.depth(), suppress_runtime_op, "pop scope");
        if !suppress_runtime_op {
            self.emit(OpCode::ExitScope);
        }
        Ok(())
    }

    /// Current lexical depth (0 = program root).
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Registers a label in the innermost frame and returns its address.
    pub fn register_label(
        &mut self,
        name: &str,
        kind: LabelKind,
        extra: Option<FunctionSignature>,
    ) -> Result<Address> {
        let pc = self.code.current_address();
        let address = self.scopes.register(name, kind, extra, pc)?;
        trace!(name, address, depth = self.scopes.depth(), "register label");
        Ok(address)
    }

    /// Resolves a label; absence is [`Error::UnresolvedReference`].
    pub fn lookup_label(&self, name: &str) -> Result<Resolved<'_>> {
        self.scopes.lookup(name)
    }

    /// Resolves a label where absence is an expected outcome.
    pub fn find_label(&self, name: &str) -> Option<Resolved<'_>> {
        self.scopes.find(name)
    }

    fn resolve_root_calls(&mut self) -> Result<()> {
        let pending = self.scopes.root_mut().take_pending();
        for call in pending {
            if let Some(call) = settle_call(&mut self.code, self.scopes.current(), call)? {
                return Err(Error::UnresolvedReference(call.name));
            }
        }
        Ok(())
    }

    fn entry_point(&self, name: &str) -> Option<Address> {
        match self.scopes.find(name) {
            Some(resolved) if resolved.label.kind.is_function() => {
                debug!(name, address = resolved.label.address, "entry point");
                Some(resolved.label.address)
            }
            Some(_) => {
                debug!(name, "entry point name is not a function");
                None
            }
            None => None,
        }
    }

    // ========================================================================
    // Function Context
    // ========================================================================

    /// Marks the start of a function definition returning `return_type`.
    pub fn enter_function(&mut self, return_type: TypeTag) {
        self.functions.enter(return_type);
    }

    /// Marks the end of the innermost function definition.
    pub fn exit_function(&mut self) {
        self.functions.exit();
    }

    /// Return type of the function currently being generated.
    pub fn current_function_type(&self) -> Result<&TypeTag> {
        self.functions.current()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Patches `call` if `frame` defines its callee; hands it back otherwise.
fn settle_call(
    code: &mut CodeBuffer,
    frame: &ScopeFrame,
    call: PendingCall,
) -> Result<Option<PendingCall>> {
    match frame.get(&call.name) {
        Some(label) if label.kind.is_function() => {
            debug!(
                name = %call.name,
                at = call.patch_at,
                target = label.address,
                "patch forward call"
            );
            code.patch_address(call.patch_at, label.address)?;
            Ok(None)
        }
        Some(_) => Err(Error::not_a_function(call.name)),
        None => Ok(Some(call)),
    }
}
